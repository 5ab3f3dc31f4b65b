//! Registry of detector constructors.
use crate::detector::{CreateSettings, Detector, DetectorConfig, DetectorType, ResourceDetectorConfig};
use crate::error::{DetectError, FactoryError};
use crate::provider::ResourceProvider;
use opentelemetry::otel_debug;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// Builds a detector from the creation settings and its configuration.
pub type DetectorFactory = Box<
    dyn Fn(&CreateSettings, DetectorConfig) -> Result<Box<dyn Detector>, DetectError>
        + Send
        + Sync,
>;

/// Creates [`ResourceProvider`]s from detector type names.
///
/// The registry is fixed after construction and can be shared freely across
/// threads.
pub struct ResourceProviderFactory {
    detectors: HashMap<DetectorType, DetectorFactory>,
}

impl ResourceProviderFactory {
    /// Creates a factory knowing the given detector constructors.
    pub fn new(detectors: HashMap<DetectorType, DetectorFactory>) -> Self {
        ResourceProviderFactory { detectors }
    }

    /// Registers `factory` under `detector_type`, replacing any previous one.
    pub fn with_detector<F>(mut self, detector_type: impl Into<DetectorType>, factory: F) -> Self
    where
        F: Fn(&CreateSettings, DetectorConfig) -> Result<Box<dyn Detector>, DetectError>
            + Send
            + Sync
            + 'static,
    {
        self.detectors
            .insert(detector_type.into(), Box::new(factory));
        self
    }

    /// Returns `true` if a constructor is registered for `detector_type`.
    pub fn contains(&self, detector_type: &DetectorType) -> bool {
        self.detectors.contains_key(detector_type)
    }

    /// Builds a provider running `detector_types` in the given order.
    ///
    /// Unknown types are rejected before any detector is constructed. A
    /// constructor error stops construction of the remaining detectors.
    pub fn create_resource_provider<C>(
        &self,
        settings: &CreateSettings,
        timeout: Duration,
        detector_configs: &C,
        detector_types: &[DetectorType],
    ) -> Result<ResourceProvider, FactoryError>
    where
        C: ResourceDetectorConfig + ?Sized,
    {
        let detectors = self.get_detectors(settings, detector_configs, detector_types)?;
        Ok(ResourceProvider::new(timeout, detectors).with_name(settings.name.clone()))
    }

    fn get_detectors<C>(
        &self,
        settings: &CreateSettings,
        detector_configs: &C,
        detector_types: &[DetectorType],
    ) -> Result<Vec<Box<dyn Detector>>, FactoryError>
    where
        C: ResourceDetectorConfig + ?Sized,
    {
        // Unknown types fail before any detector is constructed.
        let factories = detector_types
            .iter()
            .map(|detector_type| {
                self.detectors
                    .get(detector_type)
                    .map(|factory| (detector_type, factory))
                    .ok_or_else(|| FactoryError::UnknownDetector(detector_type.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut detectors = Vec::with_capacity(factories.len());
        for (detector_type, factory) in factories {
            let detector = factory(settings, detector_configs.config_for(detector_type))
                .map_err(|source| FactoryError::CreateDetector {
                    detector: detector_type.clone(),
                    source,
                })?;

            otel_debug!(
                name: "ResourceDetection.DetectorCreated",
                component = settings.name.as_ref(),
                detector = detector_type.as_str()
            );
            detectors.push(detector);
        }

        Ok(detectors)
    }
}

impl fmt::Debug for ResourceProviderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.detectors.keys().collect();
        types.sort();
        f.debug_struct("ResourceProviderFactory")
            .field("detectors", &types)
            .finish()
    }
}

/// The factory knowing every detector shipped with this crate: `env`, `os`,
/// `host`, `process`, `k8s` and `lambda`.
pub fn default_factory() -> &'static ResourceProviderFactory {
    static DEFAULT: OnceLock<ResourceProviderFactory> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        ResourceProviderFactory::new(HashMap::new())
            .with_detector("env", crate::sdk::EnvDetector::create)
            .with_detector("os", crate::os::OsDetector::create)
            .with_detector("host", crate::host::HostResourceDetector::create)
            .with_detector("process", crate::process::ProcessResourceDetector::create)
            .with_detector("k8s", crate::k8s::K8sResourceDetector::create)
            .with_detector("lambda", crate::lambda::LambdaResourceDetector::create)
    })
}
