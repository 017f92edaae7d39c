//! The `error` module defines the error types used within the `stationflow` pipeline.
//!
//! This module centralizes error handling, providing a consistent way to
//! represent and propagate errors throughout the system.
//!
//! Storage faults are fatal to the worker instance that hit them and travel to
//! the supervising side as a [`DelayedFailure`](crate::persistence::DelayedFailure)
//! before being re-raised as a [`PipelineError`]. Everything else here is a
//! caller-side condition.

use thiserror::Error;

use crate::message::MessageId;

/// Failure inside a storage backend.
///
/// Any of these terminates the worker that encountered it; the backend's
/// state after a failed write is not assumed consistent.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open storage at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sled::Error,
    },

    #[error("storage i/o error: {0}")]
    Io(#[from] sled::Error),

    #[error("failed to encode reading: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("station {station_id} already has a reading at timestamp {timestamp}")]
    DuplicateReading { station_id: String, timestamp: i64 },

    #[error(
        "reading for station {station_id} at timestamp {timestamp} is not newer than the last stored reading"
    )]
    NonMonotonicReading { station_id: String, timestamp: i64 },
}

/// The inbound queue rejected a message.
///
/// Transient from the pipeline's point of view: the queue itself is unbounded,
/// so this only occurs once the worker is gone. The caller may retry against a
/// fresh service.
#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("storage worker is not accepting messages")]
    WorkerUnavailable,
}

/// Outcome of `wait_for_next_data` when no acknowledgment was returned.
///
/// `Timeout` is a retryable "no event yet" condition and must not be mistaken
/// for a worker crash; crashes only surface through `check_for_exceptions`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitError {
    #[error("no acknowledgment arrived within the configured timeout")]
    Timeout,

    #[error("acknowledgment channel is closed")]
    Closed,
}

/// A failure surfaced to the owner of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A storage worker died. `context` describes what the worker was doing
    /// when it failed, captured at the original failure site.
    #[error("storage worker failed while {context}: {source}")]
    WorkerFailure {
        context: String,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Enqueue(#[from] EnqueueError),

    /// Direct (unqueued) persistence failed in the caller's own context.
    #[error("storage rejected message {message_id}: {source}")]
    Storage {
        message_id: MessageId,
        #[source]
        source: StorageError,
    },
}
