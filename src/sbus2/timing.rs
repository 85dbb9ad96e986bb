//! # Inbound Frame Timing
//!
//! The telemetry window is defined relative to the end of the last inbound
//! SBUS2 frame, and the page is selected by that frame's end byte. The full
//! inbound decoder (channels, failsafe) lives elsewhere; [`FrameClock`] is
//! all the telemetry path needs from it.
//!
//! [`FrameTracker`] is a byte-level implementation for hosts that read the
//! SBUS2 line directly.

use std::time::Duration;

use tracing::trace;

use super::protocol::{TimeUs, SBUS2_TELEMETRY_PAGES};

/// SBUS frame length including start and end byte
pub const SBUS_FRAME_LENGTH: usize = 25;

/// SBUS frame start byte
pub const SBUS_START_BYTE: u8 = 0x0F;

/// SBUS1 end byte (no telemetry page)
pub const SBUS_END_BYTE: u8 = 0x00;

/// Longest time a 25-byte frame takes on the wire (120 us per byte, with margin)
pub const SBUS_FRAME_TIME_US: TimeUs = 3000;

/// Low nibble shared by the four SBUS2 end bytes (0x04, 0x14, 0x24, 0x34)
const SBUS2_END_BYTE_MARKER: u8 = 0x04;

/// Timing reference provided by the inbound frame decoder
pub trait FrameClock {
    /// Time between the end of the last inbound frame and `now`
    fn elapsed_since_last_frame(&self, now: TimeUs) -> Duration;

    /// Telemetry page (0-3) selected by the last inbound frame
    fn current_telemetry_page(&self) -> u8;
}

/// Extract the telemetry page from a frame end byte
///
/// # Returns
///
/// * `Option<u8>` - Page 0-3, or `None` if the byte is not a valid end byte
pub fn page_from_end_byte(end_byte: u8) -> Option<u8> {
    if end_byte == SBUS_END_BYTE {
        return Some(0);
    }

    if end_byte & 0x0F == SBUS2_END_BYTE_MARKER {
        let page = (end_byte >> 4) & 0x03;
        return (usize::from(page) < SBUS2_TELEMETRY_PAGES).then_some(page);
    }

    None
}

/// Frame boundary tracker over the raw SBUS2 byte stream
///
/// Only records when a frame ended and which page it selected.
///
/// Slot traffic from other sensors shares the line and may contain the
/// start byte. A candidate frame is abandoned once it has been open longer
/// than [`SBUS_FRAME_TIME_US`], and a candidate with an invalid end byte is
/// rescanned from its next start byte.
#[derive(Debug, Default)]
pub struct FrameTracker {
    buffer: Vec<u8>,
    frame_start_time: Option<TimeUs>,
    last_frame_time: Option<TimeUs>,
    page: u8,
    frames: u64,
}

impl FrameTracker {
    /// Create a tracker that has not seen a frame yet
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(SBUS_FRAME_LENGTH),
            ..Self::default()
        }
    }

    /// Feed one received byte
    ///
    /// # Returns
    ///
    /// * `bool` - `true` when this byte completed a valid frame
    pub fn push_byte(&mut self, now: TimeUs, byte: u8) -> bool {
        if let Some(start) = self.frame_start_time {
            if now.saturating_sub(start) > SBUS_FRAME_TIME_US {
                trace!(len = self.buffer.len(), "Discarding timed out partial frame");
                self.buffer.clear();
                self.frame_start_time = None;
            }
        }

        if self.buffer.is_empty() {
            if byte != SBUS_START_BYTE {
                return false;
            }
            self.frame_start_time = Some(now);
        }

        self.buffer.push(byte);
        if self.buffer.len() < SBUS_FRAME_LENGTH {
            return false;
        }

        let end_byte = byte;
        match page_from_end_byte(end_byte) {
            Some(page) => {
                self.buffer.clear();
                self.frame_start_time = None;
                self.last_frame_time = Some(now);
                self.page = page;
                self.frames += 1;
                trace!(page, "SBUS2 frame end");
                true
            }
            None => {
                trace!("Dropped frame with invalid end byte {:#04x}", end_byte);
                self.resync(now);
                false
            }
        }
    }

    /// Restart the candidate at the next start byte after the current one
    fn resync(&mut self, now: TimeUs) {
        let next_start = self
            .buffer
            .iter()
            .skip(1)
            .position(|&b| b == SBUS_START_BYTE);

        match next_start {
            Some(offset) => {
                self.buffer.drain(..=offset);
                self.frame_start_time = Some(now);
            }
            None => {
                self.buffer.clear();
                self.frame_start_time = None;
            }
        }
    }

    /// Feed a chunk of received bytes, all stamped with `now`
    pub fn push_bytes(&mut self, now: TimeUs, bytes: &[u8]) {
        for &byte in bytes {
            self.push_byte(now, byte);
        }
    }

    /// Number of valid frames seen
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl FrameClock for FrameTracker {
    fn elapsed_since_last_frame(&self, now: TimeUs) -> Duration {
        match self.last_frame_time {
            Some(last) => Duration::from_micros(now.saturating_sub(last)),
            None => Duration::MAX,
        }
    }

    fn current_telemetry_page(&self) -> u8 {
        self.page
    }
}
