//! Ordered, run-once resource detection.
//!
//! A [`ResourceProvider`] runs a list of [`Detector`]s in order and merges
//! their output into one [`Resource`]. The first detector to report an
//! attribute wins. Detection runs at most once per provider: concurrent
//! callers share the run, later callers get the cached outcome, and a
//! failure is cached like a success.
//!
//! Providers are usually built by name through a [`ResourceProviderFactory`],
//! either [`default_factory`] or one carrying custom detectors:
//!
//! ```no_run
//! use opentelemetry_resource_detection::{
//!     default_factory, CreateSettings, DetectContext, ResourceDetectionConfig,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ResourceDetectionConfig::from_yaml("detectors: [env, host, os]")?;
//! let provider = default_factory().create_resource_provider(
//!     &CreateSettings::default(),
//!     config.timeout(),
//!     &config,
//!     &config.detectors,
//! )?;
//! let resource = provider.get(&DetectContext::background()).await?;
//! println!("{:?}", opentelemetry_resource_detection::flatten(&resource));
//! # Ok(())
//! # }
//! ```
//!
//! # Resource detectors
//!
//! - [`EnvDetector`] - read `OTEL_RESOURCE_ATTRIBUTES`.
//! - [`OsDetector`] - detect OS from runtime.
//! - [`HostResourceDetector`] - detect unique host ID and architecture.
//! - [`ProcessResourceDetector`] - detect process information.
//! - [`K8sResourceDetector`] - detect pod metadata from the downward API.
//! - [`LambdaResourceDetector`] - detect AWS Lambda function information.
mod config;
mod context;
mod detector;
mod error;
mod factory;
mod host;
mod k8s;
mod lambda;
mod os;
mod process;
mod processor;
mod provider;
mod resource;
mod sdk;

pub use config::{HostDetectorConfig, K8sDetectorConfig, ResourceDetectionConfig};
pub use context::{CancelHandle, ContextError, DetectContext};
pub use detector::{CreateSettings, Detector, DetectorConfig, DetectorType, ResourceDetectorConfig};
pub use error::{ConfigError, DetectError, DetectionError, FactoryError};
pub use factory::{default_factory, DetectorFactory, ResourceProviderFactory};
pub use host::HostResourceDetector;
pub use k8s::K8sResourceDetector;
pub use lambda::LambdaResourceDetector;
pub use os::OsDetector;
pub use process::ProcessResourceDetector;
pub use processor::ResourceDetectionProcessor;
pub use provider::{ResourceProvider, ResourceResult};
pub use resource::{flatten, flatten_value, is_empty_resource, merge_resource, Iter, Resource, Value};
pub use sdk::{EnvDetector, SdkDetector};
