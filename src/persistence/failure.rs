use chrono::{DateTime, Utc};

use crate::utils::error::{PipelineError, StorageError};

/// A failure captured inside the storage worker and reported elsewhere.
///
/// The worker cannot raise into its supervisor's context directly, so the
/// original cause, a description of what the worker was doing, and the capture
/// time are packaged up and sent over the exception channel instead. Created
/// exactly once at the failure site; consumed at most once, by
/// [`into_error`](DelayedFailure::into_error) when the supervisor polls.
#[derive(Debug)]
pub struct DelayedFailure {
    cause: StorageError,
    context: String,
    captured_at: DateTime<Utc>,
}

impl DelayedFailure {
    /// Captures a failure at its origin. `context` should name the operation
    /// in flight, e.g. which message was being persisted.
    pub fn capture(cause: StorageError, context: impl Into<String>) -> Self {
        Self {
            cause,
            context: context.into(),
            captured_at: Utc::now(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cause(&self) -> &StorageError {
        &self.cause
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Re-raises the failure in the calling context. The original cause stays
    /// reachable through `source()`, so the full chain survives the crossing.
    pub fn into_error(self) -> PipelineError {
        PipelineError::WorkerFailure {
            context: self.context,
            source: self.cause,
        }
    }
}
