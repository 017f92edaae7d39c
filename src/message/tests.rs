use chrono::{TimeZone, Utc};

use super::{SensorPayload, SensorSlot, TempHumidityReading, WeatherMessage};

fn sample_payload() -> SensorPayload {
    let mut payload = SensorPayload::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
    payload.pressure = Some(1013.2);
    payload.rain_counter = Some(712.4);
    payload.with_sensor(
        SensorSlot::In,
        TempHumidityReading::new(Some(21.5), Some(45.0)),
    )
}

#[test]
fn test_message_accessors() {
    let msg = WeatherMessage::new(7, "TES2", sample_payload());
    assert_eq!(msg.message_id(), 7);
    assert_eq!(msg.station_id(), "TES2");
    assert_eq!(msg.payload().pressure, Some(1013.2));
}

#[test]
fn test_absent_reading_is_not_zero() {
    let faulted = TempHumidityReading::new(None, Some(60.0));
    let zero = TempHumidityReading::new(Some(0.0), Some(60.0));
    assert_ne!(faulted, zero);
    assert!(faulted.temperature.is_none());
}

#[test]
fn test_payload_starts_empty() {
    let payload = SensorPayload::new(Utc::now());
    assert!(payload.pressure.is_none());
    assert!(payload.wind.speed.is_none());
    assert!(payload.sensors.is_empty());
}

#[test]
fn test_sensor_slot_lookup() {
    let payload = sample_payload();
    assert!(payload.sensor(SensorSlot::In).is_some());
    assert!(payload.sensor(SensorSlot::Out3).is_none());
}

#[test]
fn test_sensor_slot_serializes_to_slot_name() {
    let json = serde_json::to_string(&SensorSlot::Out1).unwrap();
    assert_eq!(json, "\"OUT1\"");
    assert_eq!(SensorSlot::Out1.to_string(), "OUT1");
}

#[test]
fn test_payload_json_roundtrip_preserves_absent_values() {
    let payload = sample_payload();
    let data = serde_json::to_vec(&payload).unwrap();
    let parsed: SensorPayload = serde_json::from_slice(&data).unwrap();
    assert_eq!(parsed, payload);
    assert!(parsed.uv_index.is_none());
}
