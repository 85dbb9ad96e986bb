//! # Telemetry Store
//!
//! Holds the staged payload for each of the 32 SBUS2 slots.
//!
//! The collector writes payloads, the transmitter takes frames. A slot keeps
//! its last written value and is re-sent on every eligible window until the
//! next collection cycle overwrites it.

use tracing::trace;

use super::protocol::{
    Payload, TelemetryFrame, TimeUs, SBUS2_MIN_RESEND_US, SBUS2_SLOT_COUNT, SBUS2_SLOT_IDS,
};

/// State of a single addressable telemetry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySlot {
    slot_id: u8,
    payload: Payload,
    used: bool,
    min_next_send_time: TimeUs,
}

impl TelemetrySlot {
    const fn new(slot_id: u8) -> Self {
        Self {
            slot_id,
            payload: [0; 2],
            used: false,
            min_next_send_time: 0,
        }
    }
}

/// All 32 telemetry slots
///
/// Created once when telemetry starts and passed by reference to the
/// collector and the transmitter.
#[derive(Debug, Clone)]
pub struct TelemetryStore {
    slots: [TelemetrySlot; SBUS2_SLOT_COUNT],
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStore {
    /// Create a store with every slot unused
    pub fn new() -> Self {
        let mut slots = [TelemetrySlot::new(0); SBUS2_SLOT_COUNT];
        for (slot, &slot_id) in slots.iter_mut().zip(SBUS2_SLOT_IDS.iter()) {
            *slot = TelemetrySlot::new(slot_id);
        }
        Self { slots }
    }

    /// Drop every staged payload and resend timer
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Stage a payload for a global slot index
    ///
    /// Index 0 is reserved and indices `>= 32` do not exist; writes to
    /// either are ignored.
    pub fn write(&mut self, index: usize, payload: Payload) {
        if index == 0 || index >= SBUS2_SLOT_COUNT {
            return;
        }

        let slot = &mut self.slots[index];
        slot.payload = payload;
        slot.slot_id = SBUS2_SLOT_IDS[index];
        slot.used = true;
    }

    /// Stage consecutive payloads starting at `port`
    ///
    /// Each payload is subject to the same bounds rule as [`write`](Self::write),
    /// so a block that runs past slot 31 is truncated.
    pub fn write_block(&mut self, port: u8, payloads: &[Payload]) {
        for (offset, &payload) in payloads.iter().enumerate() {
            self.write(usize::from(port) + offset, payload);
        }
    }

    /// Take the frame for a slot if it is due
    ///
    /// Returns the frame when the slot holds a payload and its resend timer
    /// has expired. The timer is re-armed for another
    /// [`SBUS2_MIN_RESEND_US`]; the payload itself stays staged.
    pub fn try_take(&mut self, index: usize, now: TimeUs) -> Option<TelemetryFrame> {
        let slot = self.slots.get_mut(index)?;

        if !slot.used || slot.min_next_send_time > now {
            return None;
        }

        slot.min_next_send_time = now.saturating_add(SBUS2_MIN_RESEND_US);
        trace!(index, slot_id = slot.slot_id, "slot due");

        Some(TelemetryFrame {
            slot_id: SBUS2_SLOT_IDS[index],
            payload: slot.payload,
        })
    }

    /// Whether a payload has been staged for the slot
    pub fn is_used(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.used)
    }

    /// Staged payload, if any
    pub fn payload(&self, index: usize) -> Option<Payload> {
        self.slots
            .get(index)
            .filter(|slot| slot.used)
            .map(|slot| slot.payload)
    }

    /// Physical slot ID for an index
    pub fn slot_id(&self, index: usize) -> Option<u8> {
        self.slots.get(index).map(|slot| slot.slot_id)
    }

    /// Number of slots holding a payload
    pub fn used_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.used).count()
    }
}
