//! YAML configuration for resource detection.
//!
//! ```yaml
//! detectors: [env, host, os]
//! timeout_ms: 2000
//! override: false
//! host:
//!   machine_id_paths: ["/etc/machine-id"]
//! custom:
//!   my_detector:
//!     endpoint: "http://169.254.169.254"
//! ```
use crate::detector::{DetectorConfig, DetectorType, ResourceDetectorConfig};
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Resource detection settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResourceDetectionConfig {
    /// Detectors to run, in precedence order.
    #[serde(default)]
    pub detectors: Vec<DetectorType>,

    /// Timeout for the whole detection run, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether detected attributes replace attributes already present on the
    /// resources they are applied to.
    #[serde(default = "default_override", rename = "override")]
    pub override_existing: bool,

    /// Settings for the `host` detector.
    #[serde(default)]
    pub host: Option<HostDetectorConfig>,

    /// Settings for the `k8s` detector.
    #[serde(default)]
    pub k8s: Option<K8sDetectorConfig>,

    /// Untyped settings for other detectors, keyed by detector type.
    #[serde(default)]
    pub custom: HashMap<String, serde_yaml::Value>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_override() -> bool {
    true
}

impl Default for ResourceDetectionConfig {
    fn default() -> Self {
        ResourceDetectionConfig {
            detectors: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            override_existing: true,
            host: None,
            k8s: None,
            custom: HashMap::new(),
        }
    }
}

impl ResourceDetectionConfig {
    /// Parses the configuration from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    /// Reads and parses the configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml_str = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml_str)
    }

    /// Timeout for the whole detection run.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ResourceDetectorConfig for ResourceDetectionConfig {
    fn config_for(&self, detector_type: &DetectorType) -> DetectorConfig {
        match detector_type.as_str() {
            "host" => self.host.clone().map(DetectorConfig::Host),
            "k8s" => self.k8s.clone().map(DetectorConfig::K8s),
            other => self.custom.get(other).cloned().map(DetectorConfig::Custom),
        }
        .unwrap_or_default()
    }
}

/// Settings for the `host` detector.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HostDetectorConfig {
    /// Files tried in order for the host id. The first readable, non-empty
    /// one wins.
    #[serde(default = "default_machine_id_paths")]
    pub machine_id_paths: Vec<PathBuf>,
}

fn default_machine_id_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/etc/machine-id"),
        PathBuf::from("/var/lib/dbus/machine-id"),
    ]
}

impl Default for HostDetectorConfig {
    fn default() -> Self {
        HostDetectorConfig {
            machine_id_paths: default_machine_id_paths(),
        }
    }
}

/// Settings for the `k8s` detector: names of the environment variables
/// (usually set through the downward API) that carry pod metadata.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct K8sDetectorConfig {
    /// Variable holding the pod name.
    pub pod_name_env: String,
    /// Variable holding the namespace name.
    pub namespace_env: String,
    /// Variable holding the node name.
    pub node_name_env: String,
}

impl Default for K8sDetectorConfig {
    fn default() -> Self {
        K8sDetectorConfig {
            pod_name_env: "K8S_POD_NAME".to_string(),
            namespace_env: "K8S_NAMESPACE_NAME".to_string(),
            node_name_env: "K8S_NODE_NAME".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_config() {
        let yaml_str = r#"
          detectors: [env, host, my_detector]
          timeout_ms: 1500
          override: false
          host:
            machine_id_paths: ["/tmp/machine-id"]
          custom:
            my_detector:
              endpoint: "http://localhost:1234"
        "#;
        let config = ResourceDetectionConfig::from_yaml(yaml_str).unwrap();

        assert_eq!(
            config.detectors,
            vec![
                DetectorType::from_static("env"),
                DetectorType::from_static("host"),
                DetectorType::from_static("my_detector"),
            ]
        );
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert!(!config.override_existing);

        assert_eq!(
            config.config_for(&"host".into()),
            DetectorConfig::Host(HostDetectorConfig {
                machine_id_paths: vec![PathBuf::from("/tmp/machine-id")],
            })
        );
        match config.config_for(&"my_detector".into()) {
            DetectorConfig::Custom(value) => {
                assert_eq!(&value["endpoint"], "http://localhost:1234");
            }
            other => panic!("Expected custom config, got {:?}", other),
        }
        assert_eq!(config.config_for(&"env".into()), DetectorConfig::Default);
        assert_eq!(config.config_for(&"k8s".into()), DetectorConfig::Default);
    }

    #[test]
    fn test_defaults() {
        let config = ResourceDetectionConfig::from_yaml("detectors: [os]").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.override_existing);

        let config = ResourceDetectionConfig::from_yaml("k8s: {pod_name_env: POD}").unwrap();
        assert_eq!(
            config.config_for(&"k8s".into()),
            DetectorConfig::K8s(K8sDetectorConfig {
                pod_name_env: "POD".to_string(),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_deserialize_invalid_config() {
        let result = ResourceDetectionConfig::from_yaml("detectors: [env]\ntimeout: 5s");
        match result {
            Err(ConfigError::Parse(e)) => assert!(e.to_string().contains("unknown field `timeout`")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = ResourceDetectionConfig::from_yaml_file("/nonexistent/detection.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
