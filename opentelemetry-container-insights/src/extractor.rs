//! Conversion of raw statistics into container insights metrics.
use crate::hcs::HnsEndpointStats;
use crate::metric::{fields, tags, CiMetric, TYPE_NODE, TYPE_NODE_NET, TYPE_POD, TYPE_POD_NET};
use chrono::{DateTime, Utc};

/// Statistics of one container or pod, in a source independent shape.
#[derive(Clone, Debug, PartialEq)]
pub struct RawMetric {
    pub id: String,
    pub name: String,
    pub time: DateTime<Utc>,
    pub network: Vec<NetworkStats>,
}

/// Counters of one network interface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkStats {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_dropped: u64,
    pub tx_dropped: u64,
}

impl RawMetric {
    /// Builds the raw metric of an HNS endpoint. The endpoint is the only
    /// network interface of the result.
    pub fn from_endpoint_stats(
        stats: &HnsEndpointStats,
        interface: &str,
        time: DateTime<Utc>,
    ) -> Self {
        RawMetric {
            id: stats.endpoint_id.clone(),
            name: interface.to_owned(),
            time,
            network: vec![NetworkStats {
                name: interface.to_owned(),
                rx_bytes: stats.bytes_received,
                tx_bytes: stats.bytes_sent,
                rx_dropped: stats.dropped_packets_incoming,
                tx_dropped: stats.dropped_packets_outgoing,
            }],
        }
    }
}

/// Turns raw statistics into metrics of one kind.
pub trait MetricExtractor: Send + Sync {
    /// Returns `true` if `raw` carries the statistics this extractor reads.
    fn has_value(&self, raw: &RawMetric) -> bool;

    /// Extracts the metrics of `raw` for an entity of `container_type`
    /// (`Pod` or `Node`).
    fn extract(&self, raw: &RawMetric, container_type: &str) -> Vec<CiMetric>;
}

/// Emits one network metric per interface with the raw byte and
/// dropped-packet counters.
#[derive(Debug, Default)]
pub struct NetMetricExtractor;

impl MetricExtractor for NetMetricExtractor {
    fn has_value(&self, raw: &RawMetric) -> bool {
        !raw.network.is_empty()
    }

    fn extract(&self, raw: &RawMetric, container_type: &str) -> Vec<CiMetric> {
        let metric_type = match container_type {
            TYPE_POD => TYPE_POD_NET,
            TYPE_NODE => TYPE_NODE_NET,
            _ => return Vec::new(),
        };

        raw.network
            .iter()
            .map(|interface| {
                let mut metric = CiMetric::new(metric_type);
                metric.add_field(fields::NET_RX_BYTES, interface.rx_bytes);
                metric.add_field(fields::NET_TX_BYTES, interface.tx_bytes);
                metric.add_field(fields::NET_RX_DROPPED, interface.rx_dropped);
                metric.add_field(fields::NET_TX_DROPPED, interface.tx_dropped);
                metric.add_tag(tags::NET_INTERFACE, interface.name.as_str());
                metric
            })
            .collect()
    }
}
