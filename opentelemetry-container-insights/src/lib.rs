//! Container insights statistics for Windows Kubernetes nodes.
//!
//! [`HcsStatsProvider`] reads per-endpoint network counters from the Host
//! Network Service, attributes them to pods through the kubelet, and emits
//! one tagged `PodNet` [`CiMetric`] per pod and endpoint.
//!
//! Platform access is abstracted behind [`HcsClient`], [`KubeletProvider`] and
//! [`HostInfo`], so the provider can be driven by any implementation of those
//! traits.
mod error;
mod extractor;
mod hcs;
mod kubelet;
pub mod metric;
mod provider;

pub use error::{Result, StatsError};
pub use extractor::{MetricExtractor, NetMetricExtractor, NetworkStats, RawMetric};
pub use hcs::{ContainerStats, HcsClient, HnsEndpoint, HnsEndpointStats};
pub use kubelet::{
    ContainerStatus, KubeletProvider, NodeStats, ObjectMeta, Pod, PodReference, PodStats,
    PodStatus, Summary,
};
pub use metric::CiMetric;
pub use provider::{ContainerInfo, EndpointInfo, HcsStatsProvider, HostInfo, PodInfo};
