use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::message::{Acknowledgment, MessageId, SensorPayload, WeatherMessage};
use crate::proxy::listener::{AckObserver, DataListener, ListenerId};
use crate::utils::error::WaitError;

/// The ingestion-facing side of the pipeline.
///
/// Raw arrivals come in through [`on_data_received`](StationProxy::on_data_received),
/// are turned into [`WeatherMessage`]s and fanned out to every registered
/// [`DataListener`]. Confirmation of durable storage flows back in through
/// [`acknowledge_persistence`](StationProxy::acknowledge_persistence) and is
/// handed to the proxy's own caller via
/// [`wait_for_next_data`](StationProxy::wait_for_next_data), so the component
/// that received the raw data can confirm persistence before replying to its
/// peer.
///
/// Listeners are kept in a uuid-keyed map; fan-out iterates over a snapshot of
/// the map, so registering or removing listeners while a delivery is in
/// progress never panics and never affects delivery to unrelated listeners.
pub struct StationProxy {
    listeners: Mutex<HashMap<ListenerId, Arc<dyn DataListener>>>,
    event_tx: UnboundedSender<Acknowledgment>,
    event_rx: tokio::sync::Mutex<UnboundedReceiver<Acknowledgment>>,
    wait_timeout: Option<Duration>,
}

impl StationProxy {
    /// Creates a proxy whose `wait_for_next_data` blocks indefinitely.
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Creates a proxy whose `wait_for_next_data` gives up after `timeout`,
    /// reporting [`WaitError::Timeout`]. `None` blocks indefinitely.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            listeners: Mutex::new(HashMap::new()),
            event_tx,
            event_rx: tokio::sync::Mutex::new(event_rx),
            wait_timeout: timeout,
        }
    }

    /// Adds a listener to the fan-out set and returns its handle.
    pub fn register_listener(&self, listener: Arc<dyn DataListener>) -> ListenerId {
        let id = Uuid::new_v4();
        self.listeners
            .lock()
            .expect("listener map lock poisoned")
            .insert(id, listener);
        id
    }

    /// Removes a listener. Unknown or already-removed handles are ignored.
    pub fn remove_listener(&self, id: ListenerId) {
        self.listeners
            .lock()
            .expect("listener map lock poisoned")
            .remove(&id);
    }

    /// Constructs a [`WeatherMessage`] from a raw arrival and delivers it to
    /// every currently-registered listener.
    ///
    /// Delivery order across listeners is unspecified. The listener set is
    /// snapshotted before iterating, and each listener's `accept` is required
    /// to be non-blocking, so the call returns without waiting on storage.
    pub fn on_data_received(
        &self,
        message_id: MessageId,
        station_id: impl Into<String>,
        payload: SensorPayload,
    ) {
        let message = WeatherMessage::new(message_id, station_id, payload);

        let snapshot: Vec<Arc<dyn DataListener>> = {
            let listeners = self.listeners.lock().expect("listener map lock poisoned");
            listeners.values().cloned().collect()
        };

        debug!(
            message_id,
            station_id = message.station_id(),
            listeners = snapshot.len(),
            "delivering message"
        );

        for listener in snapshot {
            listener.accept(message.clone());
        }
    }

    /// Blocks until the next acknowledgment is available and returns it.
    ///
    /// With a configured timeout, expiry yields [`WaitError::Timeout`]; this
    /// means "no event yet" and is safe to retry. [`WaitError::Closed`] means
    /// the proxy's event channel itself is gone and no further acknowledgments
    /// can ever arrive through this proxy.
    pub async fn wait_for_next_data(&self) -> Result<Acknowledgment, WaitError> {
        let mut rx = self.event_rx.lock().await;
        match self.wait_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(Some(ack)) => Ok(ack),
                Ok(None) => Err(WaitError::Closed),
                Err(_) => Err(WaitError::Timeout),
            },
            None => rx.recv().await.ok_or(WaitError::Closed),
        }
    }
}

impl Default for StationProxy {
    fn default() -> Self {
        Self::new()
    }
}

impl AckObserver for StationProxy {
    /// Called by the persistence side once a message is durably stored; makes
    /// the acknowledgment observable through `wait_for_next_data`.
    fn acknowledge_persistence(&self, message_id: MessageId) {
        if self.event_tx.send(Acknowledgment { message_id }).is_err() {
            warn!(message_id, "acknowledgment dropped: event channel closed");
        }
    }
}

impl std::fmt::Debug for StationProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self
            .listeners
            .lock()
            .map(|l| l.len())
            .unwrap_or_default();
        f.debug_struct("StationProxy")
            .field("listeners", &listeners)
            .field("wait_timeout", &self.wait_timeout)
            .finish()
    }
}
