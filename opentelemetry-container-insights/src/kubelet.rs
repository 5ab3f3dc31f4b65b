//! The parts of the kubelet API used to attribute endpoint statistics to pods.
use crate::error::Result;
use serde::Deserialize;

/// Access to the local kubelet.
pub trait KubeletProvider: Send + Sync {
    /// The stats summary (`/stats/summary`).
    fn summary(&self) -> Result<Summary>;

    /// The pods scheduled on this node (`/pods`).
    fn pods(&self) -> Result<Vec<Pod>>;
}

/// Kubelet stats summary.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub node: NodeStats,
    #[serde(default)]
    pub pods: Vec<PodStats>,
}

impl Summary {
    /// Decodes a summary from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeStats {
    pub node_name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodStats {
    pub pod_ref: PodReference,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PodReference {
    pub name: String,
    pub namespace: String,
    pub uid: String,
}

/// A pod as listed by the kubelet.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Pod {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ObjectMeta {
    pub uid: String,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStatus {
    pub name: String,
    /// Runtime qualified id, e.g. `containerd://<id>`. Empty until the
    /// container has been created.
    #[serde(rename = "containerID", default)]
    pub container_id: String,
}
