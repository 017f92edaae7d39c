pub mod listener;
pub mod station_proxy;

pub use listener::{AckObserver, DataListener, ListenerId};
pub use station_proxy::StationProxy;
