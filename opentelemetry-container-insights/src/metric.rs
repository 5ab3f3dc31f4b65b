//! Container insights metric model.
use std::collections::HashMap;

/// Metric type of pod level metrics.
pub const TYPE_POD: &str = "Pod";
/// Metric type of pod network metrics.
pub const TYPE_POD_NET: &str = "PodNet";
/// Metric type of node level metrics.
pub const TYPE_NODE: &str = "Node";
/// Metric type of node network metrics.
pub const TYPE_NODE_NET: &str = "NodeNet";

/// Tag keys.
pub mod tags {
    pub const POD_ID: &str = "PodId";
    pub const POD_NAME: &str = "PodName";
    pub const NAMESPACE: &str = "Namespace";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const SOURCES: &str = "Sources";
    pub const NET_INTERFACE: &str = "interface";
    pub const CLUSTER_NAME: &str = "ClusterName";
    pub const METRIC_TYPE: &str = "Type";
}

/// Field names of network metrics.
pub mod fields {
    pub const NET_RX_BYTES: &str = "rx_bytes";
    pub const NET_TX_BYTES: &str = "tx_bytes";
    pub const NET_RX_DROPPED: &str = "rx_dropped";
    pub const NET_TX_DROPPED: &str = "tx_dropped";
}

/// A set of measurements sharing one metric type and one set of tags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CiMetric {
    fields: HashMap<String, u64>,
    tags: HashMap<String, String>,
}

impl CiMetric {
    /// Creates an empty metric of `metric_type`.
    pub fn new(metric_type: &str) -> Self {
        let mut metric = CiMetric::default();
        metric.add_tag(tags::METRIC_TYPE, metric_type);
        metric
    }

    /// The value of the `Type` tag.
    pub fn metric_type(&self) -> &str {
        self.tag(tags::METRIC_TYPE).unwrap_or_default()
    }

    pub fn add_field(&mut self, name: impl Into<String>, value: u64) {
        self.fields.insert(name.into(), value);
    }

    pub fn field(&self, name: &str) -> Option<u64> {
        self.fields.get(name).copied()
    }

    pub fn fields(&self) -> &HashMap<String, u64> {
        &self.fields
    }

    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }
}
