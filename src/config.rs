//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{Result, Sbus2Error};
use crate::sbus2::protocol::SBUS2_BAUD_RATE;

/// Number of auxiliary temperature sensors mapped to telemetry slots
pub const MAX_AUX_TEMPERATURE_SENSORS: usize = 8;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    #[serde(default)]
    pub rx: RxConfig,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub bench: BenchConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// How RC input reaches the flight controller
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReceiverType {
    #[default]
    Serial,
    Ppm,
    Msp,
    None,
}

/// Serial RC protocol spoken by the receiver
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SerialRxProvider {
    Sbus,
    #[default]
    Sbus2,
    Crsf,
    Ibus,
}

/// Receiver configuration
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct RxConfig {
    #[serde(default)]
    pub receiver_type: ReceiverType,

    #[serde(default)]
    pub serial_provider: SerialRxProvider,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_refresh_rate_hz")]
    pub refresh_rate_hz: u32,

    #[serde(default = "default_transmit_interval_us")]
    pub transmit_interval_us: u64,

    #[serde(default = "default_esc_max_age_ms")]
    pub esc_max_age_ms: u64,

    #[serde(default = "default_status_interval_s")]
    pub status_interval_s: u64,
}

/// Fixed readings reported when no flight controller is attached
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BenchConfig {
    #[serde(default)]
    pub voltage_v: f32,

    #[serde(default = "default_cell_count")]
    pub cell_count: u8,

    #[serde(default)]
    pub current_a: f32,

    #[serde(default)]
    pub capacity_mah: u32,

    #[serde(default)]
    pub altitude_m: f32,

    #[serde(default)]
    pub vertical_speed_ms: f32,

    #[serde(default)]
    pub gps_enabled: bool,

    #[serde(default)]
    pub latitude: f64,

    #[serde(default)]
    pub longitude: f64,

    #[serde(default)]
    pub ground_speed_kmh: f32,

    #[serde(default)]
    pub esc_enabled: bool,

    #[serde(default)]
    pub esc_rpm: u32,

    #[serde(default)]
    pub esc_temperature_c: i16,

    #[serde(default)]
    pub imu_temperature_c: Option<f32>,

    #[serde(default)]
    pub baro_temperature_c: Option<f32>,

    #[serde(default)]
    pub aux_temperatures_c: Vec<f32>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            voltage_v: 0.0,
            cell_count: default_cell_count(),
            current_a: 0.0,
            capacity_mah: 0,
            altitude_m: 0.0,
            vertical_speed_ms: 0.0,
            gps_enabled: false,
            latitude: 0.0,
            longitude: 0.0,
            ground_speed_kmh: 0.0,
            esc_enabled: false,
            esc_rpm: 0,
            esc_temperature_c: 0,
            imu_temperature_c: None,
            baro_temperature_c: None,
            aux_temperatures_c: Vec::new(),
        }
    }
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { SBUS2_BAUD_RATE }
fn default_timeout_ms() -> u64 { 100 }

fn default_telemetry_enabled() -> bool { true }
fn default_refresh_rate_hz() -> u32 { 10 }
fn default_transmit_interval_us() -> u64 { 100 }
fn default_esc_max_age_ms() -> u64 { 500 }
fn default_status_interval_s() -> u64 { 5 }

fn default_cell_count() -> u8 { 4 }

fn invalid(message: impl std::fmt::Display) -> Sbus2Error {
    Sbus2Error::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sbus2_telemetry::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        // SBUS2 is fixed at 100000 baud 8E2
        if self.serial.baud_rate != SBUS2_BAUD_RATE {
            return Err(invalid(format!("baud_rate must be {}", SBUS2_BAUD_RATE)));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if self.telemetry.refresh_rate_hz == 0 || self.telemetry.refresh_rate_hz > 100 {
            return Err(invalid("refresh_rate_hz must be between 1 and 100"));
        }

        // Must be well below the 650us slot width to hit a window at all
        if !(50..=1000).contains(&self.telemetry.transmit_interval_us) {
            return Err(invalid("transmit_interval_us must be between 50 and 1000"));
        }

        if self.telemetry.esc_max_age_ms == 0 || self.telemetry.esc_max_age_ms > 60000 {
            return Err(invalid("esc_max_age_ms must be between 1 and 60000"));
        }

        if self.telemetry.status_interval_s == 0 {
            return Err(invalid("status_interval_s must be greater than 0"));
        }

        if self.bench.aux_temperatures_c.len() > MAX_AUX_TEMPERATURE_SENSORS {
            return Err(invalid(format!(
                "at most {} aux_temperatures_c entries are supported",
                MAX_AUX_TEMPERATURE_SENSORS
            )));
        }

        for (name, value) in [("latitude", self.bench.latitude), ("longitude", self.bench.longitude)] {
            let limit = if name == "latitude" { 90.0 } else { 180.0 };
            if !(-limit..=limit).contains(&value) {
                return Err(invalid(format!("{} must be between {} and {}", name, -limit, limit)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Config {
        Config {
            serial: SerialConfig {
                port: default_serial_port(),
                baud_rate: default_baud_rate(),
                timeout_ms: default_timeout_ms(),
            },
            rx: RxConfig::default(),
            telemetry: TelemetryConfig {
                enabled: default_telemetry_enabled(),
                refresh_rate_hz: default_refresh_rate_hz(),
                transmit_interval_us: default_transmit_interval_us(),
                esc_max_age_ms: default_esc_max_age_ms(),
                status_interval_s: default_status_interval_s(),
            },
            bench: BenchConfig::default(),
        }
    }

    #[test]
    fn test_default_config() {
        assert!(create_valid_config().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyUSB1"

[rx]
receiver_type = "serial"
serial_provider = "sbus2"

[telemetry]
refresh_rate_hz = 20

[bench]
voltage_v = 16.8
gps_enabled = true
latitude = 52.520833
longitude = 13.409430
aux_temperatures_c = [21.0, 22.5]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.serial.baud_rate, 100_000);
        assert_eq!(config.rx.receiver_type, ReceiverType::Serial);
        assert_eq!(config.rx.serial_provider, SerialRxProvider::Sbus2);
        assert_eq!(config.telemetry.refresh_rate_hz, 20);
        assert!(config.bench.gps_enabled);
        assert_eq!(config.bench.aux_temperatures_c, vec![21.0, 22.5]);
        assert_eq!(config.bench.cell_count, 4);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml("[serial]\n[telemetry]\n").unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.rx, RxConfig::default());
        assert_eq!(config.telemetry.transmit_interval_us, 100);
        assert_eq!(config.bench, BenchConfig::default());
    }

    #[test]
    fn test_shipped_default_config_is_valid() {
        let config = Config::from_toml(include_str!("../config/default.toml")).unwrap();
        assert_eq!(config.serial.baud_rate, SBUS2_BAUD_RATE);
        assert_eq!(config.rx.serial_provider, SerialRxProvider::Sbus2);
        assert!(config.telemetry.enabled);
        assert!(config.bench.esc_enabled);
        assert_eq!(config.bench.imu_temperature_c, Some(38.5));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/sbus2-telemetry.toml");
        assert!(matches!(result, Err(Sbus2Error::Io(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml("[serial\nport = ");
        assert!(matches!(result, Err(Sbus2Error::Config(_))));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let result = Config::from_toml("[serial]\n[rx]\nserial_provider = \"dsm\"\n[telemetry]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_other_provider_parses() {
        let config = Config::from_toml("[serial]\n[rx]\nserial_provider = \"crsf\"\n[telemetry]\n").unwrap();
        assert_eq!(config.rx.serial_provider, SerialRxProvider::Crsf);
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = create_valid_config();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = create_valid_config();
        config.serial.baud_rate = 115_200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = create_valid_config();
        config.serial.timeout_ms = 0;
        assert!(config.validate().is_err());
        config.serial.timeout_ms = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_refresh_rate_bounds() {
        let mut config = create_valid_config();
        config.telemetry.refresh_rate_hz = 0;
        assert!(config.validate().is_err());
        config.telemetry.refresh_rate_hz = 101;
        assert!(config.validate().is_err());
        config.telemetry.refresh_rate_hz = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_transmit_interval_bounds() {
        let mut config = create_valid_config();
        config.telemetry.transmit_interval_us = 49;
        assert!(config.validate().is_err());
        config.telemetry.transmit_interval_us = 1001;
        assert!(config.validate().is_err());
        config.telemetry.transmit_interval_us = 50;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_esc_max_age_bounds() {
        let mut config = create_valid_config();
        config.telemetry.esc_max_age_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_status_interval_zero() {
        let mut config = create_valid_config();
        config.telemetry.status_interval_s = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_too_many_aux_temperatures() {
        let mut config = create_valid_config();
        config.bench.aux_temperatures_c = vec![20.0; 9];
        assert!(config.validate().is_err());
        config.bench.aux_temperatures_c = vec![20.0; 8];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_coordinate_bounds() {
        let mut config = create_valid_config();
        config.bench.latitude = 91.0;
        assert!(config.validate().is_err());

        let mut config = create_valid_config();
        config.bench.longitude = -180.5;
        assert!(config.validate().is_err());

        let mut config = create_valid_config();
        config.bench.longitude = -180.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_serial_port(), "/dev/ttyUSB0");
        assert_eq!(default_baud_rate(), 100_000);
        assert_eq!(default_timeout_ms(), 100);
        assert_eq!(default_telemetry_enabled(), true);
        assert_eq!(default_refresh_rate_hz(), 10);
        assert_eq!(default_transmit_interval_us(), 100);
        assert_eq!(default_esc_max_age_ms(), 500);
        assert_eq!(default_status_interval_s(), 5);
        assert_eq!(default_cell_count(), 4);
    }
}
