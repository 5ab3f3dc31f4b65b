//! HOST resource detector
//!
//! Detect the unique host ID and the host architecture.
use crate::config::HostDetectorConfig;
use crate::context::DetectContext;
use crate::detector::{CreateSettings, Detector, DetectorConfig};
use crate::error::DetectError;
use crate::resource::Resource;
use async_trait::async_trait;
use std::env::consts::ARCH;
use std::path::PathBuf;

/// Detect the unique host ID.
///
/// This detector looks up the host id using the sources defined
/// in the OpenTelemetry semantic conventions [`host.id from non-containerized systems`].
/// The candidate files are tried in order; the first one that can be read and is not
/// blank provides `host.id`. When none does, only `host.arch` is reported.
///
/// [`host.id from non-containerized systems`]: https://opentelemetry.io/docs/specs/semconv/resource/host/#collecting-hostid-from-non-containerized-systems
#[derive(Debug)]
pub struct HostResourceDetector {
    machine_id_paths: Vec<PathBuf>,
}

impl HostResourceDetector {
    /// Creates a detector reading the host id from `machine_id_paths`.
    pub fn new(config: HostDetectorConfig) -> Self {
        HostResourceDetector {
            machine_id_paths: config.machine_id_paths,
        }
    }

    pub(crate) fn create(
        _settings: &CreateSettings,
        config: DetectorConfig,
    ) -> Result<Box<dyn Detector>, DetectError> {
        let config = match config {
            DetectorConfig::Host(config) => config,
            _ => HostDetectorConfig::default(),
        };
        Ok(Box::new(HostResourceDetector::new(config)))
    }

    async fn host_id(&self) -> Option<String> {
        for path in &self.machine_id_paths {
            if let Ok(contents) = tokio::fs::read_to_string(path).await {
                let id = contents.trim();
                if !id.is_empty() {
                    return Some(id.to_owned());
                }
            }
        }
        None
    }
}

impl Default for HostResourceDetector {
    fn default() -> Self {
        Self::new(HostDetectorConfig::default())
    }
}

#[async_trait]
impl Detector for HostResourceDetector {
    async fn detect(&self, ctx: &DetectContext) -> Result<Resource, DetectError> {
        let mut resource = Resource::from_attributes([(
            opentelemetry_semantic_conventions::resource::HOST_ARCH,
            host_arch(),
        )]);
        if let Some(host_id) = ctx.run(self.host_id()).await? {
            resource.insert(opentelemetry_semantic_conventions::resource::HOST_ID, host_id);
        }
        Ok(resource)
    }
}

// Maps Rust's architecture names onto the well-known `host.arch` values.
fn host_arch() -> &'static str {
    match ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "x86",
        "arm" => "arm32",
        "powerpc" => "ppc32",
        "powerpc64" => "ppc64",
        "s390x" => "s390x",
        other => other,
    }
}
