//! Process resource detector
//!
//! Detect process related information like pid, executable name.

use crate::context::DetectContext;
use crate::detector::{CreateSettings, Detector, DetectorConfig};
use crate::error::DetectError;
use crate::resource::{Resource, Value};
use async_trait::async_trait;
use opentelemetry_semantic_conventions::attribute::{
    PROCESS_COMMAND_ARGS, PROCESS_PID, PROCESS_RUNTIME_DESCRIPTION, PROCESS_RUNTIME_NAME,
    PROCESS_RUNTIME_VERSION,
};
use std::env::args_os;
use std::process::id;

/// Detect process information.
///
/// This resource detector returns the following information:
///
/// - process command line arguments(`process.command_args`), the full command arguments of this
///   application.
/// - OS assigned process id(`process.pid`).
/// - process runtime version(`process.runtime.version`).
/// - process runtime name(`process.runtime.name`).
/// - process runtime description(`process.runtime.description`).
#[derive(Debug, Default)]
pub struct ProcessResourceDetector;

impl ProcessResourceDetector {
    pub(crate) fn create(
        _settings: &CreateSettings,
        _config: DetectorConfig,
    ) -> Result<Box<dyn Detector>, DetectError> {
        Ok(Box::new(ProcessResourceDetector))
    }
}

#[async_trait]
impl Detector for ProcessResourceDetector {
    async fn detect(&self, ctx: &DetectContext) -> Result<Resource, DetectError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        let cmd_args = args_os()
            .map(|arg| Value::String(arg.to_string_lossy().into_owned()))
            .collect::<Vec<_>>();

        let mut resource = Resource::from_attributes([
            (PROCESS_COMMAND_ARGS, Value::Array(cmd_args)),
            (PROCESS_PID, Value::I64(id() as i64)),
            (PROCESS_RUNTIME_NAME, Value::from("rustc")),
        ]);
        // Set from build.rs
        if let Some(rustc_version) = option_env!("RUSTC_VERSION") {
            resource.insert(PROCESS_RUNTIME_VERSION, rustc_version);
        }
        // Set from build.rs
        if let Some(rustc_version_desc) = option_env!("RUSTC_VERSION_DESCRIPTION") {
            resource.insert(PROCESS_RUNTIME_DESCRIPTION, rustc_version_desc);
        }
        Ok(resource)
    }
}
