//! # SBUS2 Protocol Constants and Types
//!
//! Core definitions for the SBUS2 telemetry back-channel.
//!
//! After every inbound SBUS2 frame the receiver releases the line for a short
//! period. Following a fixed dead-time, eight telemetry slots of 650 µs each
//! are available to sensors. Four consecutive inbound frames select four
//! pages, giving 32 addressable slots in total.

/// Microsecond timestamp used throughout the telemetry path
pub type TimeUs = u64;

/// Staged two-byte telemetry payload, emitted verbatim after the slot ID
pub type Payload = [u8; 2];

/// SBUS/SBUS2 line speed (8 data bits, even parity, 2 stop bits)
pub const SBUS2_BAUD_RATE: u32 = 100_000;

/// Slots per telemetry page
pub const SBUS2_TELEMETRY_SLOTS: usize = 8;

/// Pages cycled by the inbound frame stream
pub const SBUS2_TELEMETRY_PAGES: usize = 4;

/// Total addressable telemetry slots (4 pages × 8 slots)
pub const SBUS2_SLOT_COUNT: usize = SBUS2_TELEMETRY_PAGES * SBUS2_TELEMETRY_SLOTS;

/// Telemetry frame size on the wire: slot ID + 2 payload bytes
pub const SBUS2_TELEMETRY_FRAME_SIZE: usize = 3;

/// Silence after an inbound frame during which nothing may be sent
pub const SBUS2_DEADTIME_US: u64 = 2_000;

/// Width of a single telemetry slot
pub const SBUS2_SLOT_TIME_US: u64 = 650;

/// Latest offset inside a slot at which a transmission may still start
pub const SBUS2_SLOT_DELAY_MAX_US: u64 = min_u64(350, SBUS2_SLOT_TIME_US / 2);

/// Inbound timing reference older than this is treated as a lost link
pub const SBUS2_FRAME_STALE_US: u64 = 8_000;

/// Minimum spacing between two transmissions of the same slot
pub const SBUS2_MIN_RESEND_US: u64 = 1_000;

/// Slot ID byte for each global slot index
///
/// These are the physical-layer addresses recognised by SBUS2 receivers.
/// Index 0 is part of the table but is never written.
pub const SBUS2_SLOT_IDS: [u8; SBUS2_SLOT_COUNT] = [
    0x03, 0x83, 0x43, 0xC3, 0x23, 0xA3, 0x63, 0xE3,
    0x13, 0x93, 0x53, 0xD3, 0x33, 0xB3, 0x73, 0xF3,
    0x0B, 0x8B, 0x4B, 0xCB, 0x2B, 0xAB, 0x6B, 0xEB,
    0x1B, 0x9B, 0x5B, 0xDB, 0x3B, 0xBB, 0x7B, 0xFB,
];

const fn min_u64(a: u64, b: u64) -> u64 {
    if a < b {
        a
    } else {
        b
    }
}

/// A single outbound telemetry frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryFrame {
    /// Physical slot address from [`SBUS2_SLOT_IDS`]
    pub slot_id: u8,

    /// Two payload bytes in the order the sensor format defines
    pub payload: Payload,
}

impl TelemetryFrame {
    /// Serialize to the 3-byte wire representation
    ///
    /// # Examples
    ///
    /// ```
    /// use sbus2_telemetry::sbus2::protocol::TelemetryFrame;
    ///
    /// let frame = TelemetryFrame { slot_id: 0x83, payload: [0x80, 0xA5] };
    /// assert_eq!(frame.to_bytes(), [0x83, 0x80, 0xA5]);
    /// ```
    pub fn to_bytes(&self) -> [u8; SBUS2_TELEMETRY_FRAME_SIZE] {
        [self.slot_id, self.payload[0], self.payload[1]]
    }
}
