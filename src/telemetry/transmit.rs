//! # Telemetry Transmitter
//!
//! Time-critical half of the telemetry path. Called at a high rate, it works
//! out whether the current instant falls inside one of our slot windows and,
//! if the matching slot holds a due payload, writes the 3-byte frame.
//!
//! Every precondition failure is a silent early return. Each tick evaluates
//! the current state from scratch; nothing is queued or retried.

use std::time::Duration;

use tracing::debug;

use crate::config::{ReceiverType, RxConfig, SerialRxProvider};
use crate::error::{Result, Sbus2Error};
use crate::sbus2::protocol::{TelemetryFrame, TimeUs, SBUS2_FRAME_STALE_US};
use crate::sbus2::slot::{global_index, resolve_slot};
use crate::sbus2::store::TelemetryStore;
use crate::sbus2::timing::FrameClock;
use crate::serial::port_trait::SerialPortIO;

/// Frame scheduler and writer
#[derive(Debug, Clone)]
pub struct Sbus2Transmitter {
    enabled: bool,
    frames_sent: u64,
}

impl Sbus2Transmitter {
    /// Create a transmitter for the given receiver setup
    ///
    /// Transmission is only possible with a serial receiver speaking SBUS2.
    pub fn new(rx: &RxConfig) -> Self {
        Self {
            enabled: rx.receiver_type == ReceiverType::Serial
                && rx.serial_provider == SerialRxProvider::Sbus2,
            frames_sent: 0,
        }
    }

    /// Whether the receiver setup allows telemetry at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Total frames written
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Run one transmit tick
    ///
    /// # Arguments
    ///
    /// * `store` - Staged payloads
    /// * `clock` - Inbound frame timing reference
    /// * `port` - Shared half-duplex telemetry port, if one is open
    /// * `now` - Current time
    ///
    /// # Returns
    ///
    /// * `Result<Option<TelemetryFrame>>` - The frame written this tick, if any
    ///
    /// # Errors
    ///
    /// Returns [`Sbus2Error::Serial`] if writing to the port fails. The slot
    /// stays staged and is offered again in a later window.
    pub async fn tick<P>(
        &mut self,
        store: &mut TelemetryStore,
        clock: &impl FrameClock,
        port: Option<&mut P>,
        now: TimeUs,
    ) -> Result<Option<TelemetryFrame>>
    where
        P: SerialPortIO + ?Sized,
    {
        let Some(port) = port else {
            return Ok(None);
        };

        if !self.enabled {
            return Ok(None);
        }

        // No recent timing reference: never transmit blind
        let elapsed = clock.elapsed_since_last_frame(now);
        if elapsed > Duration::from_micros(SBUS2_FRAME_STALE_US) {
            return Ok(None);
        }

        let Some(slot) = resolve_slot(elapsed) else {
            return Ok(None);
        };

        let page = clock.current_telemetry_page();
        let Some(index) = global_index(page, slot) else {
            return Ok(None);
        };

        let Some(frame) = store.try_take(index, now) else {
            return Ok(None);
        };

        port.write_all(&frame.to_bytes())
            .await
            .map_err(|e| Sbus2Error::Serial(format!("Failed to write telemetry frame: {}", e)))?;

        port.flush()
            .await
            .map_err(|e| Sbus2Error::Serial(format!("Failed to flush serial port: {}", e)))?;

        self.frames_sent += 1;
        debug!(
            page,
            slot,
            index,
            "Sent telemetry frame {:02X?}",
            frame.to_bytes()
        );

        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbus2::protocol::SBUS2_DEADTIME_US;
    use crate::serial::port_trait::mocks::MockSerialPort;
    use std::io;

    /// Inbound timing reference pinned to a fixed frame time and page
    struct FixedClock {
        last_frame: TimeUs,
        page: u8,
    }

    impl FrameClock for FixedClock {
        fn elapsed_since_last_frame(&self, now: TimeUs) -> Duration {
            Duration::from_micros(now.saturating_sub(self.last_frame))
        }

        fn current_telemetry_page(&self) -> u8 {
            self.page
        }
    }

    const FRAME_TIME: TimeUs = 100_000;

    /// Time at which local slot `k` resolves
    fn slot_time(k: u64) -> TimeUs {
        FRAME_TIME + SBUS2_DEADTIME_US + 651 * k + 1
    }

    fn sbus2_rx() -> RxConfig {
        RxConfig {
            receiver_type: ReceiverType::Serial,
            serial_provider: SerialRxProvider::Sbus2,
        }
    }

    #[tokio::test]
    async fn test_sends_staged_slot() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();
        let clock = FixedClock { last_frame: FRAME_TIME, page: 0 };

        store.write(1, [0x80, 0xA5]);
        let frame = tx.tick(&mut store, &clock, Some(&mut port), slot_time(1)).await.unwrap();

        assert_eq!(frame, Some(TelemetryFrame { slot_id: 0x83, payload: [0x80, 0xA5] }));
        assert_eq!(port.get_written_data(), vec![vec![0x83, 0x80, 0xA5]]);
        assert_eq!(tx.frames_sent(), 1);
    }

    #[tokio::test]
    async fn test_page_selects_global_slot() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();
        let clock = FixedClock { last_frame: FRAME_TIME, page: 2 };

        store.write(19, [0x01, 0x02]);
        let frame = tx.tick(&mut store, &clock, Some(&mut port), slot_time(3)).await.unwrap();

        assert_eq!(frame.map(|f| f.slot_id), Some(0xCB));
        assert_eq!(port.get_written_data(), vec![vec![0xCB, 0x01, 0x02]]);
    }

    #[tokio::test]
    async fn test_no_port_is_noop() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let clock = FixedClock { last_frame: FRAME_TIME, page: 0 };

        store.write(1, [0x80, 0xA5]);
        let frame = tx
            .tick(&mut store, &clock, None::<&mut MockSerialPort>, slot_time(1))
            .await
            .unwrap();

        assert_eq!(frame, None);
        // Resend timer was not armed
        assert!(store.try_take(1, slot_time(1)).is_some());
    }

    #[tokio::test]
    async fn test_wrong_receiver_setup_is_noop() {
        for rx in [
            RxConfig { receiver_type: ReceiverType::Ppm, serial_provider: SerialRxProvider::Sbus2 },
            RxConfig { receiver_type: ReceiverType::Serial, serial_provider: SerialRxProvider::Sbus },
            RxConfig { receiver_type: ReceiverType::Serial, serial_provider: SerialRxProvider::Crsf },
        ] {
            let mut tx = Sbus2Transmitter::new(&rx);
            assert!(!tx.is_enabled());

            let mut store = TelemetryStore::new();
            let mut port = MockSerialPort::new();
            let clock = FixedClock { last_frame: FRAME_TIME, page: 0 };
            store.write(1, [0x80, 0xA5]);

            let frame = tx.tick(&mut store, &clock, Some(&mut port), slot_time(1)).await.unwrap();
            assert_eq!(frame, None);
            assert!(port.get_written_data().is_empty());
        }
    }

    #[tokio::test]
    async fn test_stale_reference_is_noop() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();
        let clock = FixedClock { last_frame: FRAME_TIME, page: 0 };

        for index in 1..32 {
            store.write(index, [0xAA, 0x55]);
        }

        for now in [FRAME_TIME + SBUS2_FRAME_STALE_US + 1, FRAME_TIME + 1_000_000] {
            let frame = tx.tick(&mut store, &clock, Some(&mut port), now).await.unwrap();
            assert_eq!(frame, None);
        }
        assert!(port.get_written_data().is_empty());
    }

    #[tokio::test]
    async fn test_dead_time_is_silent() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();
        let clock = FixedClock { last_frame: FRAME_TIME, page: 0 };

        for index in 1..8 {
            store.write(index, [0xAA, 0x55]);
        }

        for now in FRAME_TIME..FRAME_TIME + SBUS2_DEADTIME_US {
            tx.tick(&mut store, &clock, Some(&mut port), now).await.unwrap();
        }
        assert!(port.get_written_data().is_empty());
    }

    #[tokio::test]
    async fn test_unused_slot_is_skipped() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();
        let clock = FixedClock { last_frame: FRAME_TIME, page: 0 };

        store.write(2, [0x01, 0x01]);
        let frame = tx.tick(&mut store, &clock, Some(&mut port), slot_time(1)).await.unwrap();

        assert_eq!(frame, None);
        assert!(port.get_written_data().is_empty());
    }

    #[tokio::test]
    async fn test_reserved_slot_zero_never_sent() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();
        let clock = FixedClock { last_frame: FRAME_TIME, page: 0 };

        store.write(0, [0x01, 0x01]);
        let frame = tx.tick(&mut store, &clock, Some(&mut port), slot_time(0)).await.unwrap();

        assert_eq!(frame, None);
    }

    #[tokio::test]
    async fn test_one_frame_per_window() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();
        let clock = FixedClock { last_frame: FRAME_TIME, page: 1 };

        store.write(8, [0x10, 0x20]);
        let now = slot_time(0);
        assert!(tx.tick(&mut store, &clock, Some(&mut port), now).await.unwrap().is_some());
        assert!(tx.tick(&mut store, &clock, Some(&mut port), now).await.unwrap().is_none());

        assert_eq!(port.get_written_data().len(), 1);
    }

    #[tokio::test]
    async fn test_value_is_resent_next_cycle() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();

        store.write(1, [0x80, 0xA5]);

        // Four inbound frames later the same page comes around again
        for cycle in 0..3u64 {
            let last_frame = FRAME_TIME + cycle * 4 * 14_000;
            let clock = FixedClock { last_frame, page: 0 };
            let now = last_frame + SBUS2_DEADTIME_US + 652;
            assert!(tx.tick(&mut store, &clock, Some(&mut port), now).await.unwrap().is_some());
        }

        assert_eq!(port.get_written_data().len(), 3);
        assert!(store.is_used(1));
    }

    #[tokio::test]
    async fn test_write_error_is_reported() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();
        port.set_write_error(io::ErrorKind::BrokenPipe);
        let clock = FixedClock { last_frame: FRAME_TIME, page: 0 };

        store.write(1, [0x80, 0xA5]);
        let result = tx.tick(&mut store, &clock, Some(&mut port), slot_time(1)).await;

        match result {
            Err(Sbus2Error::Serial(msg)) => assert!(msg.contains("Failed to write")),
            other => panic!("Expected Serial error, got: {:?}", other),
        }
        assert_eq!(tx.frames_sent(), 0);
        assert!(store.is_used(1));
    }

    #[tokio::test]
    async fn test_flush_error_is_reported() {
        let mut tx = Sbus2Transmitter::new(&sbus2_rx());
        let mut store = TelemetryStore::new();
        let mut port = MockSerialPort::new();
        port.set_flush_error(io::ErrorKind::TimedOut);
        let clock = FixedClock { last_frame: FRAME_TIME, page: 0 };

        store.write(1, [0x80, 0xA5]);
        let result = tx.tick(&mut store, &clock, Some(&mut port), slot_time(1)).await;

        assert!(matches!(result, Err(Sbus2Error::Serial(_))));
    }
}
