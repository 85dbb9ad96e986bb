//! # SBUS2 Telemetry Module
//!
//! Implementation of the SBUS2 telemetry back-channel.
//!
//! This module handles:
//! - Slot timing relative to the inbound frame (dead-time, 650 µs slots)
//! - The 32-slot store of staged payloads with resend spacing
//! - Bit-exact payload encoders for the emulated third-party sensors
//! - Inbound frame timing reference

pub mod protocol;
pub mod slot;
pub mod store;
pub mod encoder;
pub mod gps;
pub mod sensor;
pub mod timing;
