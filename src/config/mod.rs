mod settings;

use std::time::Duration;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{IngestSettings, Settings, StorageSettings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the storage and ingestion configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        storage: StorageSettings {
            path: partial
                .storage
                .as_ref()
                .and_then(|s| s.path.clone())
                .unwrap_or(default.storage.path),
            flush_on_store: partial
                .storage
                .as_ref()
                .and_then(|s| s.flush_on_store)
                .unwrap_or(default.storage.flush_on_store),
        },
        ingest: IngestSettings {
            ack_timeout_secs: partial
                .ingest
                .as_ref()
                .and_then(|i| i.ack_timeout_secs)
                .unwrap_or(default.ingest.ack_timeout_secs),
            log_level: partial
                .ingest
                .as_ref()
                .and_then(|i| i.log_level.clone())
                .unwrap_or(default.ingest.log_level),
        },
    })
}

impl IngestSettings {
    /// The acknowledgment wait timeout, with `0` meaning "wait indefinitely".
    pub fn ack_timeout(&self) -> Option<Duration> {
        match self.ack_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests;
