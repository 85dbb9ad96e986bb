//! # SBUS2 Telemetry
//!
//! Host-side SBUS2 telemetry sender.
//!
//! Listens to the inbound SBUS2 frames on a serial line and answers in the
//! telemetry slots with the values from the `[bench]` configuration section.
//! Useful for checking how a transmitter displays each sensor without a
//! flight controller attached.

use anyhow::Result;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use sbus2_telemetry::config::Config;
use sbus2_telemetry::sbus2::protocol::TimeUs;
use sbus2_telemetry::sbus2::store::TelemetryStore;
use sbus2_telemetry::sbus2::timing::FrameTracker;
use sbus2_telemetry::sensors::bench::StaticSensors;
use sbus2_telemetry::serial::Sbus2Serial;
use sbus2_telemetry::telemetry::{Sbus2Transmitter, TelemetryCollector};

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Serial read buffer size (a little over two SBUS frames)
const READ_BUFFER_SIZE: usize = 64;

/// Microseconds since `start`
fn micros_since(start: Instant) -> TimeUs {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(TimeUs::MAX)
}

/// Period of a task running at `rate_hz`
fn refresh_period(rate_hz: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1)))
}

/// Main entry point for the SBUS2 telemetry sender
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument or `config/default.toml`)
///    - Open and split the SBUS2 serial line
///
/// 2. **Main Loop** (single thread, cooperative)
///    - Feed inbound bytes to the frame tracker
///    - Run the transmitter every `transmit_interval_us`
///    - Refresh staged payloads at `refresh_rate_hz`
///    - Log a status line every `status_interval_s`
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration is invalid, no serial device can be
/// opened, or reading the line fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("SBUS2 Telemetry v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;
    info!("Loaded configuration from {}", config_path);

    let serial = Sbus2Serial::open(&config.serial)?;
    info!("SBUS2 line opened at: {}", serial.device_path());
    let (mut reader, mut writer) = serial.split();

    let sensors = StaticSensors::new(config.bench.clone()).into_hub();
    debug!("Sensor hub: {:?}", sensors);

    let collector = TelemetryCollector::new(&config.telemetry);
    let mut transmitter = Sbus2Transmitter::new(&config.rx);
    if !transmitter.is_enabled() {
        warn!(
            "Receiver setup {:?}/{:?} does not carry SBUS2 telemetry, nothing will be sent",
            config.rx.receiver_type, config.rx.serial_provider
        );
    }

    let mut store = TelemetryStore::new();
    let mut tracker = FrameTracker::new();
    let start = Instant::now();

    let mut transmit_interval = interval(Duration::from_micros(config.telemetry.transmit_interval_us));
    transmit_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut refresh_interval = interval(refresh_period(config.telemetry.refresh_rate_hz));
    refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut status_interval = interval(Duration::from_secs(config.telemetry.status_interval_s));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut buf = [0u8; READ_BUFFER_SIZE];

    info!(
        "Telemetry {} (refresh {}Hz, transmit every {}us)",
        if config.telemetry.enabled { "enabled" } else { "disabled" },
        config.telemetry.refresh_rate_hz,
        config.telemetry.transmit_interval_us
    );
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            read = reader.read(&mut buf) => {
                match read {
                    Ok(0) => {
                        warn!("SBUS2 line closed");
                        break;
                    }
                    Ok(n) => tracker.push_bytes(micros_since(start), &buf[..n]),
                    Err(e) => return Err(e.into()),
                }
            }

            _ = transmit_interval.tick() => {
                let now = micros_since(start);
                if let Err(e) = transmitter.tick(&mut store, &tracker, Some(&mut writer), now).await {
                    debug!("Telemetry transmit failed: {}", e);
                }
            }

            _ = refresh_interval.tick(), if config.telemetry.enabled => {
                collector.refresh(&mut store, &sensors);
            }

            _ = status_interval.tick() => {
                info!(
                    "Frames received: {}, telemetry frames sent: {}, slots staged: {}",
                    tracker.frame_count(),
                    transmitter.frames_sent(),
                    store.used_count()
                );
            }

            _ = &mut shutdown => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total telemetry frames sent: {}", transmitter.frames_sent());
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_refresh_period_calculation() {
        assert_eq!(refresh_period(10), Duration::from_millis(100));
        assert_eq!(refresh_period(50), Duration::from_millis(20));
        assert_eq!(refresh_period(0), Duration::from_secs(1));
    }

    #[test]
    fn test_read_buffer_holds_two_frames() {
        use sbus2_telemetry::sbus2::timing::SBUS_FRAME_LENGTH;
        assert!(READ_BUFFER_SIZE >= 2 * SBUS_FRAME_LENGTH);
    }

    #[test]
    fn test_micros_since_is_monotonic() {
        let start = Instant::now();
        let a = micros_since(start);
        let b = micros_since(start);
        assert!(b >= a);
    }
}
