//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `stationflow` pipeline.
//!
//! This module aims to centralize reusable components, such as the error types
//! and the logging setup, to promote code consistency and reduce duplication.

pub mod error;
pub mod logging;
