use std::sync::Arc;

use crate::message::WeatherMessage;
use crate::proxy::listener::{AckObserver, ListenerId};
use crate::utils::error::PipelineError;

/// The write path into durable storage.
///
/// Implementations accept a message and, once it is durably committed, notify
/// every registered [`AckObserver`] with its identity. Whether persistence
/// happens in the caller's context ([`DirectService`](crate::persistence::DirectService))
/// or through a queued worker ([`PersistenceService`](crate::persistence::PersistenceService))
/// is invisible to the caller; the two are interchangeable.
pub trait PersistencePort: Send + Sync {
    /// Submits a message for persistence. For the queued implementation this
    /// is a non-blocking enqueue; the acknowledgment arrives separately.
    fn add_data(&self, message: WeatherMessage) -> Result<(), PipelineError>;

    /// Registers an observer for persistence acknowledgments.
    fn register_observer(&self, observer: Arc<dyn AckObserver>) -> ListenerId;

    /// Removes an observer; unknown handles are ignored.
    fn unregister_observer(&self, id: ListenerId);
}
