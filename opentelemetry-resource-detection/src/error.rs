use crate::context::ContextError;
use crate::detector::DetectorType;
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;

/// Error returned by a single [`Detector`](crate::Detector), or by a detector
/// constructor.
///
/// Cloning is cheap: the underlying cause is shared, so a cached failure can
/// be handed to any number of callers.
#[derive(Clone, Debug, Error)]
pub enum DetectError {
    /// The detection context was cancelled or timed out.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// The detector failed with a plain message.
    #[error("{0}")]
    Message(Cow<'static, str>),
    /// The detector failed with an underlying error.
    #[error(transparent)]
    Other(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl DetectError {
    /// Wraps any error as a detector failure.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DetectError::Other(Arc::new(err))
    }

    /// A detector failure carrying only a message.
    pub fn msg(message: impl Into<Cow<'static, str>>) -> Self {
        DetectError::Message(message.into())
    }
}

impl From<std::io::Error> for DetectError {
    fn from(err: std::io::Error) -> Self {
        DetectError::other(err)
    }
}

/// The cached failure of a [`ResourceProvider`](crate::ResourceProvider) run.
#[derive(Clone, Debug, Error)]
pub enum DetectionError {
    /// The detector at `index` (in provider order) failed; no partial
    /// resource is kept.
    #[error("resource detection failed at detector #{index}: {source}")]
    Detector {
        /// Position of the failing detector.
        index: usize,
        /// The detector's error.
        #[source]
        source: DetectError,
    },
}

impl DetectionError {
    /// Position of the detector that failed.
    pub fn detector_index(&self) -> usize {
        match self {
            DetectionError::Detector { index, .. } => *index,
        }
    }

    /// Returns `true` if the run failed because its deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            DetectionError::Detector {
                source: DetectError::Context(ContextError::DeadlineExceeded),
                ..
            }
        )
    }

    /// Returns `true` if the run failed because its context was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            DetectionError::Detector {
                source: DetectError::Context(ContextError::Cancelled),
                ..
            }
        )
    }
}

/// Errors building a [`ResourceProvider`](crate::ResourceProvider) from a
/// [`ResourceProviderFactory`](crate::ResourceProviderFactory).
#[derive(Debug, Error)]
pub enum FactoryError {
    /// No constructor is registered for the requested type.
    #[error("invalid detector key: {0}")]
    UnknownDetector(DetectorType),
    /// The constructor for `detector` failed.
    #[error("failed creating detector type \"{detector}\": {source}")]
    CreateDetector {
        /// Requested detector type.
        detector: DetectorType,
        /// Constructor error.
        #[source]
        source: DetectError,
    },
}

/// Errors loading a [`ResourceDetectionConfig`](crate::ResourceDetectionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error("Failed to parse YAML configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The configuration file could not be read.
    #[error("Failed to read YAML configuration file: {0}")]
    Io(#[from] std::io::Error),
}
