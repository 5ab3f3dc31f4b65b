//! Host Compute Service and Host Network Service model.
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Access to the Windows Host Compute and Host Network services.
pub trait HcsClient: Send + Sync {
    /// Statistics of the container with the given id.
    fn container_stats(&self, container_id: &str) -> Result<ContainerStats>;

    /// All HNS endpoints on the host.
    fn endpoint_list(&self) -> Result<Vec<HnsEndpoint>>;

    /// Counters of the HNS endpoint with the given id.
    fn endpoint_stats(&self, endpoint_id: &str) -> Result<HnsEndpointStats>;
}

/// Statistics of a single container.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerStats {
    pub timestamp: DateTime<Utc>,
}

/// A virtual network endpoint, shared by the containers of one pod.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HnsEndpoint {
    pub id: String,
    pub name: String,
    pub shared_containers: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HnsEndpointStats {
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub dropped_packets_incoming: u64,
    pub dropped_packets_outgoing: u64,
    pub endpoint_id: String,
}

