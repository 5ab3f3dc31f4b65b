//! Applies a detected resource to the resources of passing telemetry.
use crate::config::ResourceDetectionConfig;
use crate::context::DetectContext;
use crate::detector::CreateSettings;
use crate::error::{DetectionError, FactoryError};
use crate::factory::ResourceProviderFactory;
use crate::provider::ResourceProvider;
use crate::resource::{merge_resource, Resource};
use opentelemetry::otel_info;

/// Detects a resource once at startup and merges it into every resource it
/// processes afterwards.
#[derive(Debug)]
pub struct ResourceDetectionProcessor {
    provider: ResourceProvider,
    override_existing: bool,
    detected: Option<Resource>,
}

impl ResourceDetectionProcessor {
    /// Creates a processor over `provider`. With `override_existing`, detected
    /// attributes replace those already present on processed resources.
    pub fn new(provider: ResourceProvider, override_existing: bool) -> Self {
        ResourceDetectionProcessor {
            provider,
            override_existing,
            detected: None,
        }
    }

    /// Builds the provider described by `config` with `factory`.
    pub fn from_config(
        factory: &ResourceProviderFactory,
        settings: &CreateSettings,
        config: &ResourceDetectionConfig,
    ) -> Result<Self, FactoryError> {
        let provider = factory.create_resource_provider(
            settings,
            config.timeout(),
            config,
            &config.detectors,
        )?;
        Ok(Self::new(provider, config.override_existing))
    }

    /// Runs detection. A failure leaves the processor unusable and should
    /// abort startup.
    pub async fn start(&mut self, ctx: &DetectContext) -> Result<(), DetectionError> {
        let resource = self.provider.get(ctx).await?;
        otel_info!(
            name: "ResourceDetectionProcessor.Started",
            attributes = resource.len(),
            override_existing = self.override_existing
        );
        self.detected = Some(resource);
        Ok(())
    }

    /// Merges the detected resource into `resource`. Does nothing before a
    /// successful [`start`](Self::start).
    pub fn process(&self, resource: &mut Resource) {
        if let Some(detected) = &self.detected {
            merge_resource(resource, detected, self.override_existing);
        }
    }

    /// The detected resource, once started.
    pub fn detected(&self) -> Option<&Resource> {
        self.detected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{Detector, DetectorConfig};
    use crate::error::DetectError;
    use crate::resource::Value;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    struct CloudDetector;

    #[async_trait]
    impl Detector for CloudDetector {
        async fn detect(&self, _ctx: &DetectContext) -> Result<Resource, DetectError> {
            Ok(Resource::from_attributes([
                ("cloud.provider", "gcp"),
                ("cloud.region", "europe-west1"),
            ]))
        }
    }

    struct BrokenDetector;

    #[async_trait]
    impl Detector for BrokenDetector {
        async fn detect(&self, _ctx: &DetectContext) -> Result<Resource, DetectError> {
            Err(DetectError::msg("no metadata server"))
        }
    }

    fn factory() -> ResourceProviderFactory {
        ResourceProviderFactory::new(HashMap::new())
            .with_detector("cloud", |_: &CreateSettings, _: DetectorConfig| {
                Ok(Box::new(CloudDetector) as Box<dyn Detector>)
            })
            .with_detector("broken", |_: &CreateSettings, _: DetectorConfig| {
                Ok(Box::new(BrokenDetector) as Box<dyn Detector>)
            })
    }

    fn telemetry_resource() -> Resource {
        Resource::from_attributes([("cloud.provider", "aws"), ("service.name", "checkout")])
    }

    #[tokio::test]
    async fn test_process_with_override() {
        let config = ResourceDetectionConfig::from_yaml("detectors: [cloud]").unwrap();
        let mut processor =
            ResourceDetectionProcessor::from_config(&factory(), &CreateSettings::default(), &config)
                .unwrap();
        processor.start(&DetectContext::background()).await.unwrap();

        let mut resource = telemetry_resource();
        processor.process(&mut resource);

        assert_eq!(resource.len(), 3);
        assert_eq!(resource.get("cloud.provider"), Some(&Value::from("gcp")));
        assert_eq!(resource.get("service.name"), Some(&Value::from("checkout")));
        assert_eq!(processor.detected().map(Resource::len), Some(2));
    }

    #[tokio::test]
    async fn test_process_without_override() {
        let config =
            ResourceDetectionConfig::from_yaml("detectors: [cloud]\noverride: false").unwrap();
        let mut processor =
            ResourceDetectionProcessor::from_config(&factory(), &CreateSettings::default(), &config)
                .unwrap();
        processor.start(&DetectContext::background()).await.unwrap();

        let mut resource = telemetry_resource();
        processor.process(&mut resource);

        assert_eq!(resource.get("cloud.provider"), Some(&Value::from("aws")));
        assert_eq!(
            resource.get("cloud.region"),
            Some(&Value::from("europe-west1"))
        );
    }

    #[tokio::test]
    async fn test_start_failure_is_returned() {
        let provider = factory()
            .create_resource_provider(
                &CreateSettings::default(),
                Duration::from_secs(1),
                &|_: &crate::detector::DetectorType| DetectorConfig::Default,
                &["cloud".into(), "broken".into()],
            )
            .unwrap();
        let mut processor = ResourceDetectionProcessor::new(provider, true);

        let err = processor
            .start(&DetectContext::background())
            .await
            .unwrap_err();
        assert_eq!(err.detector_index(), 1);
        assert!(processor.detected().is_none());

        let mut resource = telemetry_resource();
        processor.process(&mut resource);
        assert_eq!(resource, telemetry_resource());
    }

    #[test]
    fn test_from_config_unknown_detector() {
        let config = ResourceDetectionConfig::from_yaml("detectors: [cloud, nope]").unwrap();
        let err =
            ResourceDetectionProcessor::from_config(&factory(), &CreateSettings::default(), &config)
                .unwrap_err();
        assert_eq!(err.to_string(), "invalid detector key: nope");
    }
}
