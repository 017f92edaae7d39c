use std::time::Duration;

use serial_test::serial;

use super::{Settings, load_config};

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.storage.path, "weather_db");
    assert!(settings.storage.flush_on_store);
    assert_eq!(settings.ingest.ack_timeout_secs, 30);
    assert_eq!(settings.ingest.log_level, "info");
}

#[test]
fn test_ack_timeout_zero_means_unbounded() {
    let mut settings = Settings::default();
    settings.ingest.ack_timeout_secs = 0;
    assert_eq!(settings.ingest.ack_timeout(), None);

    settings.ingest.ack_timeout_secs = 5;
    assert_eq!(settings.ingest.ack_timeout(), Some(Duration::from_secs(5)));
}

#[test]
#[serial]
fn test_load_config_uses_defaults_without_sources() {
    temp_env::with_var_unset("STORAGE_PATH", || {
        let settings = load_config().expect("config should load");
        assert_eq!(settings.storage.path, "weather_db");
        assert_eq!(settings.ingest.ack_timeout_secs, 30);
    });
}

#[test]
#[serial]
fn test_environment_overrides_storage_path() {
    temp_env::with_var("STORAGE_PATH", Some("/tmp/stationflow_db"), || {
        let settings = load_config().expect("config should load");
        assert_eq!(settings.storage.path, "/tmp/stationflow_db");
        // Untouched values still come from the defaults.
        assert!(settings.storage.flush_on_store);
    });
}
