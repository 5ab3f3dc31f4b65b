//! Pod network statistics from the Windows Host Network Service.
//!
//! HNS reports counters per endpoint, and every endpoint lists the containers
//! sharing it. Pods are matched to endpoints through the ids of their
//! containers, as reported by the kubelet.
use crate::error::Result;
use crate::extractor::{MetricExtractor, RawMetric};
use crate::hcs::HcsClient;
use crate::kubelet::KubeletProvider;
use crate::metric::{tags, CiMetric, TYPE_POD};
use opentelemetry::{otel_debug, otel_warn};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

const CONTAINER_ID_SCHEMES: [&str; 2] = ["containerd://", "docker://"];
const HCS_SOURCES: &str = r#"["hcs"]"#;

/// Cluster information of the host.
pub trait HostInfo: Send + Sync {
    fn cluster_name(&self) -> String;
}

/// The HNS endpoint a container is attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointInfo {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Container id without the runtime scheme.
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<ContainerInfo>,
}

/// Collects `PodNet` metrics for the pods running on this node.
pub struct HcsStatsProvider {
    host_info: Box<dyn HostInfo>,
    extractors: Vec<Box<dyn MetricExtractor>>,
    kubelet: Box<dyn KubeletProvider>,
    hcs: Box<dyn HcsClient>,
    container_to_endpoint: HashMap<String, EndpointInfo>,
}

impl HcsStatsProvider {
    pub fn new(
        host_info: impl HostInfo + 'static,
        extractors: Vec<Box<dyn MetricExtractor>>,
        kubelet: impl KubeletProvider + 'static,
        hcs: impl HcsClient + 'static,
    ) -> Self {
        HcsStatsProvider {
            host_info: Box::new(host_info),
            extractors,
            kubelet: Box::new(kubelet),
            hcs: Box::new(hcs),
            container_to_endpoint: HashMap::new(),
        }
    }

    /// Refreshes the endpoint map and returns the network metrics of the pods
    /// listed in the kubelet stats summary.
    pub fn metrics(&mut self) -> Result<Vec<CiMetric>> {
        self.container_to_endpoint = self.container_to_endpoint_map()?;

        let summary = self.kubelet.summary()?;
        let running: HashSet<&str> = summary
            .pods
            .iter()
            .map(|pod| pod.pod_ref.uid.as_str())
            .collect();

        let metrics: Vec<CiMetric> = self
            .pod_metrics()?
            .into_iter()
            .filter(|metric| {
                metric
                    .tag(tags::POD_ID)
                    .is_some_and(|pod_id| running.contains(pod_id))
            })
            .collect();

        otel_debug!(
            name: "HcsStats.Collected",
            node = summary.node.node_name.as_str(),
            metrics = metrics.len()
        );
        Ok(metrics)
    }

    /// Maps every container sharing an HNS endpoint to that endpoint.
    pub fn container_to_endpoint_map(&self) -> Result<HashMap<String, EndpointInfo>> {
        let mut map = HashMap::new();
        for endpoint in self.hcs.endpoint_list()? {
            for container_id in &endpoint.shared_containers {
                map.insert(
                    container_id.clone(),
                    EndpointInfo {
                        id: endpoint.id.clone(),
                        name: endpoint.name.clone(),
                    },
                );
            }
        }
        Ok(map)
    }

    /// Maps pod uids to the pod and its containers. Containers the runtime
    /// has not created yet are left out.
    pub fn pod_to_container_map(&self) -> Result<BTreeMap<String, PodInfo>> {
        let mut map = BTreeMap::new();
        for pod in self.kubelet.pods()? {
            let containers = pod
                .status
                .container_statuses
                .iter()
                .map(|status| ContainerInfo {
                    id: strip_scheme(&status.container_id).to_owned(),
                    name: status.name.clone(),
                })
                .filter(|container| !container.id.is_empty())
                .collect();

            map.insert(
                pod.metadata.uid,
                PodInfo {
                    name: pod.metadata.name,
                    namespace: pod.metadata.namespace,
                    containers,
                },
            );
        }
        Ok(map)
    }

    /// Network metrics of every pod attached to a known endpoint, one set per
    /// pod and endpoint. Uses the endpoint map of the last refresh.
    pub fn pod_metrics(&self) -> Result<Vec<CiMetric>> {
        let cluster_name = self.host_info.cluster_name();
        let mut metrics = Vec::new();

        for (pod_id, pod) in self.pod_to_container_map()? {
            let mut collected = HashSet::new();
            for container in &pod.containers {
                let Some(endpoint) = self.container_to_endpoint.get(&container.id) else {
                    continue;
                };
                if !collected.insert(endpoint.id.as_str()) {
                    continue;
                }

                let container_stats = match self.hcs.container_stats(&container.id) {
                    Ok(stats) => stats,
                    Err(err) => {
                        otel_warn!(
                            name: "HcsStats.ContainerStatsFailed",
                            container_id = container.id.as_str(),
                            error = format!("{}", err)
                        );
                        continue;
                    }
                };
                let endpoint_stats = match self.hcs.endpoint_stats(&endpoint.id) {
                    Ok(stats) => stats,
                    Err(err) => {
                        otel_warn!(
                            name: "HcsStats.EndpointStatsFailed",
                            endpoint_id = endpoint.id.as_str(),
                            error = format!("{}", err)
                        );
                        continue;
                    }
                };

                let raw = RawMetric::from_endpoint_stats(
                    &endpoint_stats,
                    &endpoint.name,
                    container_stats.timestamp,
                );
                let timestamp = raw.time.timestamp_millis().to_string();

                for extractor in self.extractors.iter().filter(|e| e.has_value(&raw)) {
                    for mut metric in extractor.extract(&raw, TYPE_POD) {
                        metric.add_tag(tags::POD_ID, pod_id.as_str());
                        metric.add_tag(tags::POD_NAME, pod.name.as_str());
                        metric.add_tag(tags::NAMESPACE, pod.namespace.as_str());
                        metric.add_tag(tags::TIMESTAMP, timestamp.as_str());
                        metric.add_tag(tags::SOURCES, HCS_SOURCES);
                        metric.add_tag(tags::NET_INTERFACE, endpoint.name.as_str());
                        metric.add_tag(tags::CLUSTER_NAME, cluster_name.as_str());
                        metrics.push(metric);
                    }
                }
            }
        }

        Ok(metrics)
    }
}

impl fmt::Debug for HcsStatsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HcsStatsProvider")
            .field("extractors", &self.extractors.len())
            .field("endpoints", &self.container_to_endpoint.len())
            .finish()
    }
}

fn strip_scheme(container_id: &str) -> &str {
    CONTAINER_ID_SCHEMES
        .iter()
        .find_map(|scheme| container_id.strip_prefix(scheme))
        .unwrap_or(container_id)
}
