use sled::Db;
use tracing::debug;

use crate::message::SensorPayload;
use crate::persistence::backend::StorageBackend;
use crate::utils::error::StorageError;

/// Durable [`StorageBackend`] on top of `sled`.
///
/// Each station gets its own tree; readings are keyed by their big-endian
/// timestamp so iteration yields them in time order, and stored as JSON.
/// A second reading with the same timestamp for the same station violates the
/// store's one-reading-per-instant constraint and is rejected rather than
/// silently overwritten.
///
/// With `flush_on_store` enabled (the default) every insert is flushed to disk
/// before `store_reading` returns, so an acknowledgment emitted after it
/// really means the reading survived a crash.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
    flush_on_store: bool,
}

impl SledStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|source| StorageError::Open {
            path: path.to_string(),
            source,
        })?;
        Ok(Self {
            db,
            flush_on_store: true,
        })
    }

    /// Disables (or re-enables) the per-write flush. Without it, writes are
    /// only as durable as sled's periodic background flush.
    pub fn flush_on_store(mut self, flush: bool) -> Self {
        self.flush_on_store = flush;
        self
    }

    /// Loads all readings stored for a station, oldest first.
    pub fn readings(&self, station_id: &str) -> Result<Vec<SensorPayload>, StorageError> {
        let tree = self.db.open_tree(station_id)?;
        let mut readings = Vec::new();
        for entry in tree.iter() {
            let (_, value) = entry?;
            readings.push(serde_json::from_slice(&value)?);
        }
        Ok(readings)
    }
}

impl StorageBackend for SledStore {
    fn store_reading(
        &mut self,
        station_id: &str,
        payload: &SensorPayload,
    ) -> Result<(), StorageError> {
        let tree = self.db.open_tree(station_id)?;
        let key = payload.timestamp.timestamp().to_be_bytes();

        if tree.contains_key(key)? {
            return Err(StorageError::DuplicateReading {
                station_id: station_id.to_string(),
                timestamp: payload.timestamp.timestamp(),
            });
        }

        let serialized = serde_json::to_vec(payload)?;
        tree.insert(key, serialized)?;
        if self.flush_on_store {
            tree.flush()?;
        }

        debug!(
            station_id,
            timestamp = payload.timestamp.timestamp(),
            "reading stored"
        );
        Ok(())
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("db", &"sled::Db")
            .field("flush_on_store", &self.flush_on_store)
            .finish()
    }
}
