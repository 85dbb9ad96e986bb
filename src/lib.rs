//! # SBUS2 Telemetry Library
//!
//! Sends sensor telemetry back to a Futaba transmitter over the SBUS2
//! receiver link.
//!
//! Sensor values are encoded into 2-byte slot payloads, staged in a
//! 32-slot store, and written into the receiver's telemetry windows in
//! sync with the inbound SBUS2 frames.

pub mod config;
pub mod error;
pub mod sbus2;
pub mod sensors;
pub mod serial;
pub mod telemetry;
