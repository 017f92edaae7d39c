use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::message::SensorPayload;
use crate::utils::error::StorageError;

/// A destination for station readings.
///
/// The backend handle is moved into the storage worker when the queued service
/// starts and is never touched from the caller's side afterwards, which is why
/// `store_reading` may take `&mut self` without further synchronization.
///
/// A write that returns an error leaves the backend in an unspecified state;
/// callers must not retry against the same instance.
pub trait StorageBackend: Send {
    /// Persists one reading for the given station.
    fn store_reading(
        &mut self,
        station_id: &str,
        payload: &SensorPayload,
    ) -> Result<(), StorageError>;
}

/// In-memory [`StorageBackend`], the storage equivalent of a loopback device.
///
/// Readings are grouped per station and must arrive with strictly increasing
/// timestamps; a stale or repeated timestamp is rejected as
/// [`StorageError::NonMonotonicReading`]. Handles are cheap clones of a shared
/// store, so a test can keep one clone for inspection while the worker owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    readings: Arc<Mutex<HashMap<String, Vec<SensorPayload>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all stored readings for a station, oldest first.
    pub fn readings(&self, station_id: &str) -> Vec<SensorPayload> {
        self.readings
            .lock()
            .expect("memory store lock poisoned")
            .get(station_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn station_count(&self) -> usize {
        self.readings
            .lock()
            .expect("memory store lock poisoned")
            .len()
    }
}

impl StorageBackend for MemoryStore {
    fn store_reading(
        &mut self,
        station_id: &str,
        payload: &SensorPayload,
    ) -> Result<(), StorageError> {
        let mut readings = self.readings.lock().expect("memory store lock poisoned");
        let entries = readings.entry(station_id.to_string()).or_default();

        if let Some(last) = entries.last()
            && payload.timestamp <= last.timestamp
        {
            return Err(StorageError::NonMonotonicReading {
                station_id: station_id.to_string(),
                timestamp: payload.timestamp.timestamp(),
            });
        }

        entries.push(payload.clone());
        Ok(())
    }
}
