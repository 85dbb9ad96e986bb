//! # SBUS2 Slot Scheduler
//!
//! Maps the time elapsed since the last inbound SBUS2 frame to the local
//! telemetry slot (0-7) that may be driven right now, if any.

use std::time::Duration;

use super::protocol::{
    SBUS2_DEADTIME_US, SBUS2_SLOT_COUNT, SBUS2_SLOT_DELAY_MAX_US, SBUS2_SLOT_TIME_US,
    SBUS2_TELEMETRY_SLOTS,
};

/// Sentinel used by the 8-bit slot arithmetic for "no slot"
const NO_SLOT: u8 = 0xFF;

/// Resolve the local slot for the given time since the last inbound frame
///
/// # Arguments
///
/// * `elapsed` - Time since the end of the last inbound frame
///
/// # Returns
///
/// * `Option<u8>` - Local slot `0..8`, or `None` while inside the dead-time,
///   too late inside a slot window, or outside the slot range
///
/// # Algorithm
///
/// ```text
/// e      = elapsed - DEADTIME
/// slot   = u8((e mod SLOT_TIME) - 1)      (0 wraps to 0xFF)
/// offset = e - slot * SLOT_TIME          (wrapping)
/// offset > SLOT_DELAY_MAX  => none
/// ```
///
/// The arithmetic is kept exactly as receivers in the field were tuned
/// against, including the 8-bit wrap and the wrapping offset subtraction.
pub fn resolve_slot(elapsed: Duration) -> Option<u8> {
    let elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);

    if elapsed_us < SBUS2_DEADTIME_US {
        return None;
    }

    let e = elapsed_us - SBUS2_DEADTIME_US;
    let mut slot = (e % SBUS2_SLOT_TIME_US).wrapping_sub(1) as u8;

    if e.wrapping_sub(u64::from(slot) * SBUS2_SLOT_TIME_US) > SBUS2_SLOT_DELAY_MAX_US {
        slot = NO_SLOT;
    }

    if usize::from(slot) < SBUS2_TELEMETRY_SLOTS {
        Some(slot)
    } else {
        None
    }
}

/// Combine a telemetry page and a local slot into a global slot index
///
/// # Returns
///
/// * `Option<usize>` - Index into the 32-slot store, `None` if out of range
pub fn global_index(page: u8, slot: u8) -> Option<usize> {
    let index = usize::from(page) * SBUS2_TELEMETRY_SLOTS + usize::from(slot);
    (index < SBUS2_SLOT_COUNT).then_some(index)
}
