//! # Telemetry Collector
//!
//! Samples the sensor collaborators once per refresh cycle, converts them to
//! the units each wire format expects and stages the payloads on a fixed
//! slot map:
//!
//! | Port  | Sensor                    | Slots |
//! |-------|---------------------------|-------|
//! | 1     | Voltage (pack, cell)      | 2     |
//! | 3     | Current / capacity / volt | 3     |
//! | 6     | RPM                       | 1     |
//! | 7     | ESC temperature (SBS-01T) | 1     |
//! | 8     | GPS (F1675)               | 8     |
//! | 16    | IMU temperature           | 1     |
//! | 17    | Baro temperature          | 1     |
//! | 18-25 | Aux temperatures          | 8     |

use std::time::Duration;

use tracing::trace;

use crate::config::{TelemetryConfig, MAX_AUX_TEMPERATURE_SENSORS};
use crate::sbus2::gps::DegreeMinutes;
use crate::sbus2::store::TelemetryStore;
use crate::sensors::{GpsFixType, SensorHub};

pub const PORT_VOLTAGE: u8 = 1;
pub const PORT_CURRENT: u8 = 3;
pub const PORT_RPM: u8 = 6;
pub const PORT_ESC_TEMPERATURE: u8 = 7;
pub const PORT_GPS: u8 = 8;
pub const PORT_IMU_TEMPERATURE: u8 = 16;
pub const PORT_BARO_TEMPERATURE: u8 = 17;
pub const PORT_AUX_TEMPERATURE: u8 = 18;

/// cm/s to km/h
const CMS_TO_KMH: f32 = 0.036;

/// One refresh cycle's worth of sensor values, in wire-ready units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Pack voltage in V
    pub voltage: f32,
    /// Average cell voltage in V
    pub cell_voltage: f32,
    /// Current in A
    pub current: f32,
    /// Consumed capacity in mAh
    pub capacity: u16,
    /// Altitude in m
    pub altitude: f32,
    /// Vertical speed in m/s
    pub vertical_speed: f32,
    /// ESC temperature in °C
    pub temperature: i16,
    /// Motor RPM
    pub rpm: u32,
    /// GPS has at least a 2D fix
    pub gps_fix: bool,
    /// Ground speed in km/h
    pub speed: u16,
    /// F1675 wire latitude
    pub latitude: DegreeMinutes,
    /// F1675 wire longitude
    pub longitude: DegreeMinutes,
    /// IMU temperature in °C
    pub imu_temperature: i16,
    /// Barometer temperature in °C
    pub baro_temperature: i16,
    /// Auxiliary temperatures in °C
    pub aux_temperatures: [i16; MAX_AUX_TEMPERATURE_SENSORS],
}

/// Periodic sensor-to-slot refresh
#[derive(Debug, Clone)]
pub struct TelemetryCollector {
    esc_max_age: Duration,
}

impl TelemetryCollector {
    pub fn new(config: &TelemetryConfig) -> Self {
        Self {
            esc_max_age: Duration::from_millis(config.esc_max_age_ms),
        }
    }

    /// Sample all sensors
    ///
    /// Missing sensors, stale ESC data and a GPS without fix read as zero.
    pub fn snapshot(&self, sensors: &SensorHub) -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::default();

        if let Some(battery) = &sensors.battery {
            snapshot.voltage = f32::from(battery.voltage_cv()) / 100.0;
            snapshot.cell_voltage = f32::from(battery.average_cell_voltage_cv()) / 100.0;
            snapshot.current = battery.amperage_ca() as f32 / 100.0;
            snapshot.capacity = battery.mah_drawn().clamp(0, i32::from(u16::MAX)) as u16;
        }

        if let Some(navigation) = &sensors.navigation {
            snapshot.altitude = navigation.altitude_cm() / 100.0;
            snapshot.vertical_speed = navigation.vertical_speed_cms() / 100.0;
        }

        if let Some(reading) = sensors.esc.as_ref().and_then(|esc| esc.reading()) {
            if reading.age <= self.esc_max_age {
                snapshot.rpm = reading.rpm;
                snapshot.temperature = reading.temperature_c;
            }
        }

        if let Some(gps) = &sensors.gps {
            let solution = gps.solution();
            if solution.fix_type >= GpsFixType::Fix2D {
                snapshot.gps_fix = true;
                snapshot.speed = (f32::from(solution.ground_speed_cms) * CMS_TO_KMH + 0.5) as u16;
                snapshot.latitude = DegreeMinutes::from_e7(solution.lat_e7);
                snapshot.longitude = DegreeMinutes::from_e7(solution.lon_e7);
            }
        }

        if let Some(temperature) = &sensors.temperature {
            snapshot.imu_temperature = whole_degrees(temperature.imu_temperature());
            snapshot.baro_temperature = whole_degrees(temperature.baro_temperature());
            for (index, slot) in snapshot.aux_temperatures.iter_mut().enumerate() {
                *slot = whole_degrees(temperature.aux_temperature(index));
            }
        }

        snapshot
    }

    /// Sample all sensors and stage every slot of the fixed map
    pub fn refresh(&self, store: &mut TelemetryStore, sensors: &SensorHub) -> SensorSnapshot {
        let snapshot = self.snapshot(sensors);

        trace!(
            voltage = snapshot.voltage,
            cell_voltage = snapshot.cell_voltage,
            current = snapshot.current,
            capacity = snapshot.capacity,
            altitude = snapshot.altitude,
            vario = snapshot.vertical_speed,
            rpm = snapshot.rpm,
            temperature = snapshot.temperature,
            "Telemetry snapshot"
        );

        stage(store, &snapshot);
        snapshot
    }
}

/// Deci-degrees to whole degrees, 0 when unavailable
fn whole_degrees(deci: Option<i16>) -> i16 {
    deci.map_or(0, |value| value / 10)
}

/// Write a snapshot to the fixed slot map
pub fn stage(store: &mut TelemetryStore, snapshot: &SensorSnapshot) {
    store.send_voltage(PORT_VOLTAGE, snapshot.voltage, snapshot.cell_voltage);
    store.send_current(PORT_CURRENT, snapshot.current, snapshot.capacity, snapshot.voltage);
    store.send_rpm(PORT_RPM, snapshot.rpm);
    store.send_sbs01t(PORT_ESC_TEMPERATURE, snapshot.temperature);

    store.send_f1675(
        PORT_GPS,
        snapshot.speed,
        snapshot.altitude as i16,
        snapshot.vertical_speed,
        snapshot.latitude,
        snapshot.longitude,
    );

    store.send_sbs01t(PORT_IMU_TEMPERATURE, snapshot.imu_temperature);
    store.send_sbs01t(PORT_BARO_TEMPERATURE, snapshot.baro_temperature);
    for (offset, &temperature) in snapshot.aux_temperatures.iter().enumerate() {
        store.send_sbs01t(PORT_AUX_TEMPERATURE + offset as u8, temperature);
    }
}
