use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed identifier of a temperature/humidity sensor slot on a station.
///
/// Stations expose one indoor slot and up to five outdoor slots. The slot a
/// sub-reading belongs to is part of the reading itself, so a payload can
/// carry any subset of slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SensorSlot {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT1")]
    Out1,
    #[serde(rename = "OUT2")]
    Out2,
    #[serde(rename = "OUT3")]
    Out3,
    #[serde(rename = "OUT4")]
    Out4,
    #[serde(rename = "OUT5")]
    Out5,
}

impl fmt::Display for SensorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SensorSlot::In => "IN",
            SensorSlot::Out1 => "OUT1",
            SensorSlot::Out2 => "OUT2",
            SensorSlot::Out3 => "OUT3",
            SensorSlot::Out4 => "OUT4",
            SensorSlot::Out5 => "OUT5",
        };
        f.write_str(s)
    }
}

/// One temperature/humidity pair from a sensor slot.
///
/// Either half may be `None` when that sensor faulted. `None` means "no
/// reading was returned", which is distinct from a legitimate reading of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TempHumidityReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl TempHumidityReading {
    pub fn new(temperature: Option<f64>, humidity: Option<f64>) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

/// Wind measurements from the station's combined wind sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindReading {
    /// Average wind speed in km/h.
    pub speed: Option<f64>,
    /// Direction in degrees, 0 = north.
    pub direction: Option<f64>,
    /// Strongest gust in km/h over the measurement interval.
    pub gust: Option<f64>,
    /// Temperature measured at the wind sensor, in degrees C.
    pub temperature: Option<f64>,
}

/// A complete timestamped station reading.
///
/// The primary station measurements (pressure, UV, the cumulative rain
/// counter, wind) plus zero or more temperature/humidity sub-readings keyed
/// by [`SensorSlot`]. Every value is optional; an absent value records a
/// sensor fault rather than a zero measurement.
///
/// The rain counter is cumulative, so deltas between consecutive readings of
/// the same station only make sense if readings are stored in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorPayload {
    pub timestamp: DateTime<Utc>,
    pub pressure: Option<f64>,
    pub uv_index: Option<f64>,
    pub rain_counter: Option<f64>,
    pub wind: WindReading,
    pub sensors: BTreeMap<SensorSlot, TempHumidityReading>,
}

impl SensorPayload {
    /// Creates an empty reading at the given time; all measurements absent.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            pressure: None,
            uv_index: None,
            rain_counter: None,
            wind: WindReading::default(),
            sensors: BTreeMap::new(),
        }
    }

    /// Attaches a temperature/humidity sub-reading for a slot.
    /// A second reading for the same slot replaces the first.
    pub fn with_sensor(mut self, slot: SensorSlot, reading: TempHumidityReading) -> Self {
        self.sensors.insert(slot, reading);
        self
    }

    pub fn sensor(&self, slot: SensorSlot) -> Option<&TempHumidityReading> {
        self.sensors.get(&slot)
    }
}
