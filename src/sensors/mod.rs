//! # Sensor Collaborators
//!
//! Read-only views of the flight-controller subsystems that feed telemetry.
//!
//! Every capability is optional. A missing sensor is not an error: the
//! collector falls back to the zero/"unknown" encoding of the wire format so
//! the transmitter display shows a blank value.

use std::time::Duration;

pub mod bench;

/// Battery monitor
#[cfg_attr(test, mockall::automock)]
pub trait BatterySensor {
    /// Pack voltage in centivolts
    fn voltage_cv(&self) -> u16;

    /// Average cell voltage in centivolts
    fn average_cell_voltage_cv(&self) -> u16;

    /// Current draw in centiamps
    fn amperage_ca(&self) -> i32;

    /// Consumed capacity in mAh
    fn mah_drawn(&self) -> i32;
}

/// Navigation estimator (vertical axis only)
#[cfg_attr(test, mockall::automock)]
pub trait Navigation {
    /// Estimated altitude in centimetres
    fn altitude_cm(&self) -> f32;

    /// Estimated vertical speed in cm/s
    fn vertical_speed_cms(&self) -> f32;
}

/// GNSS fix quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum GpsFixType {
    #[default]
    NoFix,
    Fix2D,
    Fix3D,
}

/// Current GNSS solution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpsSolution {
    pub fix_type: GpsFixType,
    /// Ground speed in cm/s
    pub ground_speed_cms: u16,
    /// Latitude in degrees × 1e7
    pub lat_e7: i32,
    /// Longitude in degrees × 1e7
    pub lon_e7: i32,
}

/// GNSS receiver
#[cfg_attr(test, mockall::automock)]
pub trait GpsReceiver {
    fn solution(&self) -> GpsSolution;
}

/// Latest ESC telemetry sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscReading {
    pub rpm: u32,
    /// ESC temperature in °C
    pub temperature_c: i16,
    /// Time since the sample was received
    pub age: Duration,
}

/// ESC telemetry source
#[cfg_attr(test, mockall::automock)]
pub trait EscSensor {
    fn reading(&self) -> Option<EscReading>;
}

/// Temperature sources, all in deci-degrees Celsius
#[cfg_attr(test, mockall::automock)]
pub trait TemperatureSensors {
    fn imu_temperature(&self) -> Option<i16>;

    fn baro_temperature(&self) -> Option<i16>;

    /// Auxiliary sensor `index` (0-7)
    fn aux_temperature(&self, index: usize) -> Option<i16>;
}

/// The set of sensor capabilities available on this vehicle
#[derive(Default)]
pub struct SensorHub {
    pub battery: Option<Box<dyn BatterySensor>>,
    pub navigation: Option<Box<dyn Navigation>>,
    pub gps: Option<Box<dyn GpsReceiver>>,
    pub esc: Option<Box<dyn EscSensor>>,
    pub temperature: Option<Box<dyn TemperatureSensors>>,
}

impl std::fmt::Debug for SensorHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorHub")
            .field("battery", &self.battery.is_some())
            .field("navigation", &self.navigation.is_some())
            .field("gps", &self.gps.is_some())
            .field("esc", &self.esc.is_some())
            .field("temperature", &self.temperature.is_some())
            .finish()
    }
}

impl SensorHub {
    /// Hub with no sensors attached
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_battery(mut self, battery: impl BatterySensor + 'static) -> Self {
        self.battery = Some(Box::new(battery));
        self
    }

    pub fn with_navigation(mut self, navigation: impl Navigation + 'static) -> Self {
        self.navigation = Some(Box::new(navigation));
        self
    }

    pub fn with_gps(mut self, gps: impl GpsReceiver + 'static) -> Self {
        self.gps = Some(Box::new(gps));
        self
    }

    pub fn with_esc(mut self, esc: impl EscSensor + 'static) -> Self {
        self.esc = Some(Box::new(esc));
        self
    }

    pub fn with_temperature(mut self, temperature: impl TemperatureSensors + 'static) -> Self {
        self.temperature = Some(Box::new(temperature));
        self
    }
}
