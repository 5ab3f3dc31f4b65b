use crate::config::K8sDetectorConfig;
use crate::context::DetectContext;
use crate::detector::{CreateSettings, Detector, DetectorConfig};
use crate::error::DetectError;
use crate::resource::Resource;
use async_trait::async_trait;
use opentelemetry_semantic_conventions as semconv;
use std::env;

/// A resource detector for Kubernetes environment variables.
///
/// Pod metadata is usually exposed to the container through the downward API.
/// Only variables that are set and non-empty are reported.
#[derive(Debug, Default)]
pub struct K8sResourceDetector {
    config: K8sDetectorConfig,
}

impl K8sResourceDetector {
    /// Creates a detector reading the variables named in `config`.
    pub fn new(config: K8sDetectorConfig) -> Self {
        K8sResourceDetector { config }
    }

    pub(crate) fn create(
        _settings: &CreateSettings,
        config: DetectorConfig,
    ) -> Result<Box<dyn Detector>, DetectError> {
        let config = match config {
            DetectorConfig::K8s(config) => config,
            _ => K8sDetectorConfig::default(),
        };
        Ok(Box::new(K8sResourceDetector::new(config)))
    }
}

#[async_trait]
impl Detector for K8sResourceDetector {
    async fn detect(&self, ctx: &DetectContext) -> Result<Resource, DetectError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        let attributes = [
            (semconv::resource::K8S_POD_NAME, &self.config.pod_name_env),
            (semconv::resource::K8S_NAMESPACE_NAME, &self.config.namespace_env),
            (semconv::resource::K8S_NODE_NAME, &self.config.node_name_env),
        ];

        Ok(Resource::from_attributes(attributes.into_iter().filter_map(
            |(key, var)| {
                env::var(var)
                    .ok()
                    .filter(|value| !value.is_empty())
                    .map(|value| (key, value))
            },
        )))
    }
}
