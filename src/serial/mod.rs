//! # Serial Communication Module
//!
//! Opens the SBUS2 line on a host serial port.
//!
//! SBUS2 runs at 100,000 baud, 8 data bits, even parity, two stop bits
//! (8E2) on an inverted half-duplex line. The host needs an external
//! inverter; the receiver's inbound frames and our telemetry frames share
//! the same wire.
//!
//! The opened stream is split: the read half feeds the inbound frame
//! tracker, the write half is wrapped in [`port_trait::TokioSerialPort`]
//! for the transmitter.

pub mod port_trait;

use crate::config::SerialConfig;
use crate::error::{Result, Sbus2Error};
use port_trait::TokioSerialPort;
use std::time::Duration;
use tokio::io::{ReadHalf, WriteHalf};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{debug, info, warn};

/// Device paths tried when the configured port cannot be opened
const FALLBACK_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial adapters with inverter
    "/dev/ttyAMA0", // Raspberry Pi PL011 UART
];

/// Read half of the SBUS2 line
pub type Sbus2Reader = ReadHalf<SerialStream>;

/// Write half of the SBUS2 line, ready for the transmitter
pub type Sbus2Writer = TokioSerialPort<WriteHalf<SerialStream>>;

/// SBUS2 serial line handle
pub struct Sbus2Serial {
    port: SerialStream,
    device_path: String,
}

impl std::fmt::Debug for Sbus2Serial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sbus2Serial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl Sbus2Serial {
    /// Open the configured port, falling back to common device paths
    ///
    /// # Errors
    ///
    /// Returns [`Sbus2Error::SerialPortNotFound`] if no candidate path opens
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sbus2_telemetry::config::Config;
    /// use sbus2_telemetry::serial::Sbus2Serial;
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let config = Config::load("config/default.toml")?;
    ///     let serial = Sbus2Serial::open(&config.serial)?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let mut paths = vec![config.port.as_str()];
        paths.extend(
            FALLBACK_DEVICE_PATHS
                .iter()
                .copied()
                .filter(|p| *p != config.port),
        );

        Self::open_with_paths(&paths, config)
    }

    /// Try each path in order with the line settings from `config`
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyUSB0"])
    /// * `config` - Baud rate and timeout
    pub fn open_with_paths(paths: &[&str], config: &SerialConfig) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, config) {
                Ok(port) => {
                    info!("Opened SBUS2 line at {} ({} baud, 8E2)", path, config.baud_rate);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(Sbus2Error::SerialPortNotFound(paths.join(", ")))
    }

    /// Open one device with SBUS2 line settings
    fn open_port(path: &str, config: &SerialConfig) -> Result<SerialStream> {
        let port = tokio_serial::new(path, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::Even)
            .stop_bits(tokio_serial::StopBits::Two)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open_native_async()
            .map_err(|e| Sbus2Error::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Path of the device that was opened
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Split into the inbound reader and the telemetry writer
    pub fn split(self) -> (Sbus2Reader, Sbus2Writer) {
        let (reader, writer) = tokio::io::split(self.port);
        (reader, TokioSerialPort::new(writer))
    }
}
