//! Cancellation and deadline propagation for detection runs.
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a [`DetectContext`] is done.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The context, or one of its parents, was cancelled.
    #[error("context canceled")]
    Cancelled,
    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// A cancellable, optionally deadline-bound operation handed to detectors.
///
/// Contexts form a tree: a child derived with [`DetectContext::with_timeout`]
/// inherits the parent's cancellation and never outlives the parent's
/// deadline.
#[derive(Clone, Debug, Default)]
pub struct DetectContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Cancels the [`DetectContext`] it was created with, and every context
/// derived from it.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancels the associated context. Calling it more than once is harmless.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl DetectContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that is cancelled when [`CancelHandle::cancel`] is called.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        (
            DetectContext {
                deadline: None,
                cancel: Some(receiver),
            },
            CancelHandle { sender },
        )
    }

    /// Derives a child context that expires after `timeout`, or at the
    /// parent's deadline if that comes first.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(far_future);
        DetectContext {
            deadline: Some(match self.deadline {
                Some(parent) if parent < deadline => parent,
                _ => deadline,
            }),
            cancel: self.cancel.clone(),
        }
    }

    /// The instant at which this context expires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Completes once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled(self.cancel.clone()) => ContextError::Cancelled,
            _ = deadline => ContextError::DeadlineExceeded,
        }
    }

    /// Runs `future` until it completes or the context is done, whichever
    /// happens first. A context that is already done never polls `future`.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output, ContextError> {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            err = self.done() => Err(err),
            output = future => Ok(output),
        }
    }
}

async fn cancelled(cancel: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = cancel else {
        return std::future::pending().await;
    };
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        // A dropped handle can no longer cancel.
        if rx.changed().await.is_err() {
            return std::future::pending().await;
        }
    }
}

fn far_future() -> Instant {
    // Roughly 30 years, same as tokio's own "never" sleep.
    Instant::now() + Duration::from_secs(86400 * 365 * 30)
}
