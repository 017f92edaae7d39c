use uuid::Uuid;

use crate::message::{MessageId, WeatherMessage};

/// Handle identifying a registered listener or observer.
///
/// Returned on registration and passed back to remove the registration.
/// Removing a handle that was never registered (or was already removed) is a
/// no-op.
pub type ListenerId = Uuid;

/// Receives every message the proxy constructs from an arrival.
///
/// `accept` is invoked synchronously from the delivering caller's context and
/// must not block: one slow listener would otherwise stall delivery to the
/// rest of the fan-out set. Implementations that do real work hand the message
/// off to their own queue immediately.
pub trait DataListener: Send + Sync {
    fn accept(&self, message: WeatherMessage);
}

/// Notified once a message has been durably persisted.
///
/// Invoked with the identity of the persisted message; nothing else about the
/// message is retained at that point.
pub trait AckObserver: Send + Sync {
    fn acknowledge_persistence(&self, message_id: MessageId);
}
