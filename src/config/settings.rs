use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for both durable storage and the ingestion side.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub storage: StorageSettings,
    pub ingest: IngestSettings,
}

/// Configuration settings for durable storage.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Filesystem path of the sled database.
    pub path: String,
    /// Flush after every write so an acknowledgment implies a durable commit.
    /// Disabling trades durability for write latency.
    pub flush_on_store: bool,
}

/// Configuration settings for the ingestion side.
#[derive(Debug, Deserialize, Clone)]
pub struct IngestSettings {
    /// How long `wait_for_next_data` blocks before reporting a timeout.
    /// `0` waits indefinitely.
    pub ack_timeout_secs: u64,
    /// Log level for the tracing subscriber.
    pub log_level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub storage: Option<PartialStorageSettings>,
    pub ingest: Option<PartialIngestSettings>,
}

/// Partial storage settings.
///
/// Used when loading storage configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialStorageSettings {
    pub path: Option<String>,
    pub flush_on_store: Option<bool>,
}

/// Partial ingestion settings.
///
/// Used for ingestion configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialIngestSettings {
    pub ack_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageSettings {
                path: "weather_db".to_string(),
                flush_on_store: true,
            },
            ingest: IngestSettings {
                ack_timeout_secs: 30,
                log_level: "info".to_string(),
            },
        }
    }
}
