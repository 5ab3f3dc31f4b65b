//! The run-once detection pipeline.
use crate::context::DetectContext;
use crate::detector::Detector;
use crate::error::{DetectError, DetectionError};
use crate::resource::{flatten, merge_resource, Resource};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use opentelemetry::{otel_debug, otel_info, otel_warn};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Outcome of a detection run: exactly one of a resource or an error.
pub type ResourceResult = Result<Resource, DetectionError>;

type Detection = Shared<BoxFuture<'static, ResourceResult>>;

/// Merges the output of an ordered list of detectors into one resource.
///
/// Detection happens once, on the first call to [`ResourceProvider::get`].
/// Callers arriving while it runs wait for it, callers arriving later get the
/// cached outcome. A failure is cached like a success and never retried; build
/// a new provider to detect again.
pub struct ResourceProvider {
    name: Cow<'static, str>,
    timeout: Duration,
    detectors: Arc<[Box<dyn Detector>]>,
    detection: OnceLock<Detection>,
}

impl ResourceProvider {
    /// Creates a provider over `detectors`. Earlier detectors take precedence
    /// when two of them report the same attribute.
    pub fn new(timeout: Duration, detectors: Vec<Box<dyn Detector>>) -> Self {
        ResourceProvider {
            name: Cow::Borrowed("resource_provider"),
            timeout,
            detectors: detectors.into(),
            detection: OnceLock::new(),
        }
    }

    /// Sets the name reported on log events.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Timeout applied to the whole detection run.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of configured detectors.
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Returns `true` if the provider has no detectors.
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Returns the detected resource, running detection if no caller has
    /// started it yet.
    ///
    /// The run is bounded by the first caller's `ctx` and the provider
    /// timeout, whichever ends first. Later callers' contexts do not affect
    /// the run; they wait for its outcome.
    pub async fn get(&self, ctx: &DetectContext) -> ResourceResult {
        let detection = self
            .detection
            .get_or_init(|| {
                let ctx = ctx.with_timeout(self.timeout);
                let detectors = Arc::clone(&self.detectors);
                let name = self.name.clone();
                async move { detect_resource(&name, &detectors, &ctx).await }
                    .boxed()
                    .shared()
            })
            .clone();

        detection.await
    }

    /// Returns the cached outcome without starting or waiting for detection.
    pub fn peek(&self) -> Option<ResourceResult> {
        self.detection.get().and_then(|d| d.peek().cloned())
    }
}

impl fmt::Debug for ResourceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceProvider")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("detectors", &self.detectors.len())
            .finish()
    }
}

async fn detect_resource(
    name: &str,
    detectors: &[Box<dyn Detector>],
    ctx: &DetectContext,
) -> ResourceResult {
    otel_info!(
        name: "ResourceDetection.Started",
        provider = name,
        detectors = detectors.len()
    );

    let mut resource = Resource::empty();
    for (index, detector) in detectors.iter().enumerate() {
        // Also bound the call here, for detectors that ignore the context.
        let detected = ctx
            .run(detector.detect(ctx))
            .await
            .map_err(DetectError::from)
            .and_then(|r| r);

        match detected {
            Ok(detected) => {
                otel_debug!(
                    name: "ResourceDetection.DetectorCompleted",
                    provider = name,
                    index = index,
                    attributes = detected.len()
                );
                merge_resource(&mut resource, &detected, false);
            }
            Err(source) => {
                otel_warn!(
                    name: "ResourceDetection.Failed",
                    provider = name,
                    index = index,
                    error = format!("{}", source)
                );
                return Err(DetectionError::Detector { index, source });
            }
        }
    }

    otel_info!(
        name: "ResourceDetection.Completed",
        provider = name,
        resource = serde_json::Value::Object(flatten(&resource)).to_string()
    );

    Ok(resource)
}
