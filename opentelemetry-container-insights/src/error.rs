use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors collecting HCS statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The kubelet could not be queried.
    #[error("kubelet request failed: {0}")]
    Kubelet(#[source] BoxError),

    /// A Host Compute or Host Network Service call failed.
    #[error("HCS request failed: {0}")]
    Hcs(#[source] BoxError),

    /// A kubelet payload could not be decoded.
    #[error("failed to decode kubelet payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StatsError {
    /// Wraps a kubelet client error.
    pub fn kubelet(err: impl Into<BoxError>) -> Self {
        StatsError::Kubelet(err.into())
    }

    /// Wraps an HCS client error.
    pub fn hcs(err: impl Into<BoxError>) -> Self {
        StatsError::Hcs(err.into())
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
