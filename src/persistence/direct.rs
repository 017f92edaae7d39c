use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::error;
use uuid::Uuid;

use crate::message::WeatherMessage;
use crate::persistence::backend::StorageBackend;
use crate::persistence::port::PersistencePort;
use crate::proxy::listener::{AckObserver, DataListener, ListenerId};
use crate::utils::error::PipelineError;

/// Unqueued [`PersistencePort`]: persists in the caller's own context.
///
/// No worker, no queue; `add_data` writes synchronously and notifies the
/// observers before returning, and a storage error comes straight back in the
/// `Result`. From a proxy's point of view this behaves exactly like the queued
/// service, which makes it the variant of choice for tests and for embedding
/// where the isolation of a separate worker is not wanted.
pub struct DirectService<B> {
    backend: Mutex<B>,
    observers: Mutex<HashMap<ListenerId, Arc<dyn AckObserver>>>,
}

impl<B: StorageBackend> DirectService<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Mutex::new(backend),
            observers: Mutex::new(HashMap::new()),
        }
    }
}

impl<B: StorageBackend> PersistencePort for DirectService<B> {
    fn add_data(&self, message: WeatherMessage) -> Result<(), PipelineError> {
        {
            let mut backend = self.backend.lock().expect("backend lock poisoned");
            backend
                .store_reading(message.station_id(), message.payload())
                .map_err(|source| PipelineError::Storage {
                    message_id: message.message_id(),
                    source,
                })?;
        }

        let snapshot: Vec<Arc<dyn AckObserver>> = {
            let observers = self.observers.lock().expect("observer map lock poisoned");
            observers.values().cloned().collect()
        };
        for observer in snapshot {
            observer.acknowledge_persistence(message.message_id());
        }
        Ok(())
    }

    fn register_observer(&self, observer: Arc<dyn AckObserver>) -> ListenerId {
        let id = Uuid::new_v4();
        self.observers
            .lock()
            .expect("observer map lock poisoned")
            .insert(id, observer);
        id
    }

    fn unregister_observer(&self, id: ListenerId) {
        self.observers
            .lock()
            .expect("observer map lock poisoned")
            .remove(&id);
    }
}

impl<B: StorageBackend> DataListener for DirectService<B> {
    fn accept(&self, message: WeatherMessage) {
        let message_id = message.message_id();
        if let Err(err) = self.add_data(message) {
            error!(message_id, "direct persistence failed: {err}");
        }
    }
}

impl<B> std::fmt::Debug for DirectService<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let observers = self
            .observers
            .lock()
            .map(|o| o.len())
            .unwrap_or_default();
        f.debug_struct("DirectService")
            .field("observers", &observers)
            .finish()
    }
}
