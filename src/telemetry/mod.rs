//! # Telemetry Module
//!
//! The two cooperating tasks of the SBUS2 telemetry path.
//!
//! This module handles:
//! - Sampling the sensor hub and staging encoded payloads (`collector`, ~10 Hz)
//! - Placing staged payloads into their slot windows on the wire (`transmit`)
//!
//! Both tasks share one [`crate::sbus2::store::TelemetryStore`] and run on
//! the same thread, so the store needs no locking.

pub mod collector;
pub mod transmit;

pub use collector::{SensorSnapshot, TelemetryCollector};
pub use transmit::Sbus2Transmitter;
