pub mod payload;
pub mod weather;

pub use payload::{SensorPayload, SensorSlot, TempHumidityReading, WindReading};
pub use weather::{Acknowledgment, MessageId, WeatherMessage};

#[cfg(test)]
mod tests;
