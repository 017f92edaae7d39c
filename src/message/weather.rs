use serde::{Deserialize, Serialize};

use crate::message::payload::SensorPayload;

/// Identifier correlating an ingested message with its acknowledgment.
///
/// Assigned by the caller of `on_data_received`. It only has to be unique
/// among messages that are in flight at the same time; it is not a global
/// identity and may repeat across restarts.
pub type MessageId = u64;

/// A single unit of ingestion work: one complete reading from one station.
///
/// Constructed by the proxy when raw data arrives and handed unchanged to
/// every registered listener. The message is immutable once built; the
/// `message_id` is the correlation key used when durable storage is later
/// confirmed through an [`Acknowledgment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherMessage {
    message_id: MessageId,
    station_id: String,
    payload: SensorPayload,
}

impl WeatherMessage {
    pub fn new(message_id: MessageId, station_id: impl Into<String>, payload: SensorPayload) -> Self {
        Self {
            message_id,
            station_id: station_id.into(),
            payload,
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn payload(&self) -> &SensorPayload {
        &self.payload
    }
}

/// Confirmation that the message with this id was durably persisted.
///
/// Carries nothing beyond the identity; the original message is not retained
/// once the storage worker has attempted to persist it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub message_id: MessageId,
}
