//! OS resource detector
//!
//! Detect the runtime operating system type.
use crate::context::DetectContext;
use crate::detector::{CreateSettings, Detector, DetectorConfig};
use crate::error::DetectError;
use crate::resource::Resource;
use async_trait::async_trait;
use std::env::consts::OS;

/// Detect runtime operating system information.
///
/// This detector uses Rust's [`OS constant`] to detect the operating system type and
/// maps the result to the supported value defined in [`OpenTelemetry spec`].
///
/// [`OS constant`]: https://doc.rust-lang.org/std/env/consts/constant.OS.html
/// [`OpenTelemetry spec`]: https://github.com/open-telemetry/opentelemetry-specification/blob/main/specification/resource/semantic_conventions/os.md
#[derive(Debug, Default)]
pub struct OsDetector;

impl OsDetector {
    pub(crate) fn create(
        _settings: &CreateSettings,
        _config: DetectorConfig,
    ) -> Result<Box<dyn Detector>, DetectError> {
        Ok(Box::new(OsDetector))
    }
}

#[async_trait]
impl Detector for OsDetector {
    async fn detect(&self, ctx: &DetectContext) -> Result<Resource, DetectError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        Ok(Resource::from_attributes([(
            opentelemetry_semantic_conventions::resource::OS_TYPE,
            OS,
        )]))
    }
}
