//! # Stationflow
//!
//! `stationflow` is the ingestion pipeline for weather-station telemetry:
//! arrivals are turned into immutable messages, fanned out to listeners,
//! queued to an isolated storage worker for durable persistence, and
//! acknowledged back to the component that received the raw data. Worker
//! failures are captured where they happen and re-raised on the supervising
//! side with their original context intact.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `message`: The immutable unit of work (station reading + correlation id) and its acknowledgment.
//! - `proxy`: The ingestion-facing side; constructs messages, fans them out, and hands acknowledgments back to the caller.
//! - `persistence`: The storage worker, its supervising service, the direct in-process variant, and the storage backends.
//! - `config`: Handles loading and managing pipeline configuration.
//! - `utils`: Contains shared utilities, such as error types and logging setup.

pub mod config;
pub mod message;
pub mod persistence;
pub mod proxy;
pub mod utils;
