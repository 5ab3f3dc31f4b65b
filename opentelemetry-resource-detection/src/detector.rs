//! The detector capability and the values that flow into detector
//! constructors.
use crate::config::{HostDetectorConfig, K8sDetectorConfig};
use crate::context::DetectContext;
use crate::error::DetectError;
use crate::resource::Resource;
use async_trait::async_trait;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;

/// Detects resource information from one source.
///
/// Implementations may perform network calls, filesystem reads or environment
/// introspection. They must stop promptly with an error once `ctx` is done;
/// [`DetectContext::run`] is the usual way to get there.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Returns the attributes found by this detector. An empty resource means
    /// the source is not present; an error aborts the whole detection run.
    async fn detect(&self, ctx: &DetectContext) -> Result<Resource, DetectError>;
}

/// Name of a detector implementation, used as the registry key.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DetectorType(Cow<'static, str>);

impl DetectorType {
    /// Creates a detector type from a static name.
    pub const fn from_static(name: &'static str) -> Self {
        DetectorType(Cow::Borrowed(name))
    }

    /// Creates a detector type.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        DetectorType(name.into())
    }

    /// Returns the detector type name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DetectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for DetectorType {
    fn from(name: &'static str) -> Self {
        DetectorType::from_static(name)
    }
}

impl From<String> for DetectorType {
    fn from(name: String) -> Self {
        DetectorType(Cow::Owned(name))
    }
}

/// Configuration handed to a detector constructor.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DetectorConfig {
    /// No configuration was provided; the detector uses its defaults.
    #[default]
    Default,
    /// Settings for the `host` detector.
    Host(HostDetectorConfig),
    /// Settings for the `k8s` detector.
    K8s(K8sDetectorConfig),
    /// Untyped settings for detectors registered outside this crate.
    Custom(serde_yaml::Value),
}

/// Source of per-detector configuration.
pub trait ResourceDetectorConfig {
    /// Returns the configuration for `detector_type`, or
    /// [`DetectorConfig::Default`] if there is none.
    fn config_for(&self, detector_type: &DetectorType) -> DetectorConfig;
}

impl<F> ResourceDetectorConfig for F
where
    F: Fn(&DetectorType) -> DetectorConfig,
{
    fn config_for(&self, detector_type: &DetectorType) -> DetectorConfig {
        self(detector_type)
    }
}

/// Settings passed unchanged to every detector constructor.
#[derive(Clone, Debug)]
pub struct CreateSettings {
    /// Name of the component the detectors are created for. Used as a field
    /// on diagnostic log events.
    pub name: Cow<'static, str>,
}

impl CreateSettings {
    /// Creates settings for the named component.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        CreateSettings { name: name.into() }
    }
}

impl Default for CreateSettings {
    fn default() -> Self {
        CreateSettings::new("resourcedetection")
    }
}
