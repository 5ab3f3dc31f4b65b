//! Bridge to the OpenTelemetry SDK resource detectors.
use crate::context::DetectContext;
use crate::detector::{CreateSettings, Detector, DetectorConfig};
use crate::error::DetectError;
use crate::resource::Resource;
use async_trait::async_trait;
use opentelemetry_sdk::resource::{EnvResourceDetector, ResourceDetector};

/// Runs an SDK [`ResourceDetector`] as a [`Detector`].
///
/// SDK detectors are synchronous and cheap, so the detector is called inline.
/// Its attributes are converted with `Resource::from`.
#[derive(Debug)]
pub struct SdkDetector<D> {
    inner: D,
}

impl<D> SdkDetector<D>
where
    D: ResourceDetector,
{
    /// Wraps `inner`.
    pub fn new(inner: D) -> Self {
        SdkDetector { inner }
    }
}

#[async_trait]
impl<D> Detector for SdkDetector<D>
where
    D: ResourceDetector + Send + Sync,
{
    async fn detect(&self, ctx: &DetectContext) -> Result<Resource, DetectError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        Ok(Resource::from(&self.inner.detect()))
    }
}

/// Reads `OTEL_RESOURCE_ATTRIBUTES` through the SDK [`EnvResourceDetector`].
pub type EnvDetector = SdkDetector<EnvResourceDetector>;

impl EnvDetector {
    pub(crate) fn create(
        _settings: &CreateSettings,
        _config: DetectorConfig,
    ) -> Result<Box<dyn Detector>, DetectError> {
        Ok(Box::new(SdkDetector::new(EnvResourceDetector::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextError;
    use crate::resource::Value;
    use opentelemetry::KeyValue;

    struct StaticSdkDetector;

    impl ResourceDetector for StaticSdkDetector {
        fn detect(&self) -> opentelemetry_sdk::Resource {
            opentelemetry_sdk::Resource::builder_empty()
                .with_attributes([
                    KeyValue::new("service.instance.id", "a1"),
                    KeyValue::new("replicas", 3_i64),
                    KeyValue::new(
                        "tags",
                        opentelemetry::Value::Array(vec![opentelemetry::StringValue::from("x")].into()),
                    ),
                ])
                .build()
        }
    }

    #[tokio::test]
    async fn test_sdk_detector_converts_values() {
        let resource = SdkDetector::new(StaticSdkDetector)
            .detect(&DetectContext::background())
            .await
            .unwrap();

        assert_eq!(resource.len(), 3);
        assert_eq!(resource.get("service.instance.id"), Some(&Value::from("a1")));
        assert_eq!(resource.get("replicas"), Some(&Value::I64(3)));
        assert_eq!(
            resource.get("tags"),
            Some(&Value::Array(vec![Value::from("x")]))
        );
    }

    #[tokio::test]
    async fn test_sdk_detector_honours_cancelled_context() {
        let (ctx, handle) = DetectContext::with_cancel();
        handle.cancel();

        let err = SdkDetector::new(StaticSdkDetector)
            .detect(&ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, DetectError::Context(ContextError::Cancelled)));
    }

    #[test]
    fn test_env_detector() {
        temp_env::with_var(
            "OTEL_RESOURCE_ATTRIBUTES",
            Some("key=value, k = v , a= x, a=z,base64=SGVsbG8sIFdvcmxkIQ=="),
            || {
                let detector = EnvDetector::create(&CreateSettings::default(), DetectorConfig::Default)
                    .unwrap();
                let resource = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .unwrap()
                    .block_on(detector.detect(&DetectContext::background()))
                    .unwrap();

                assert_eq!(resource.get("key"), Some(&Value::from("value")));
                assert_eq!(resource.get("k"), Some(&Value::from("v")));
                assert_eq!(resource.get("a"), Some(&Value::from("z")));
                assert_eq!(
                    resource.get("base64"),
                    Some(&Value::from("SGVsbG8sIFdvcmxkIQ=="))
                );
            },
        );
    }

    #[test]
    fn test_env_detector_without_variable() {
        temp_env::with_var_unset("OTEL_RESOURCE_ATTRIBUTES", || {
            let detector =
                EnvDetector::create(&CreateSettings::default(), DetectorConfig::Default).unwrap();
            let resource = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap()
                .block_on(detector.detect(&DetectContext::background()))
                .unwrap();
            assert!(resource.is_empty());
        });
    }
}
