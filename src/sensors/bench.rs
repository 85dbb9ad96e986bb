//! # Bench Sensors
//!
//! Fixed sensor readings taken from the `[bench]` configuration section.
//! Used by the host binary to drive a receiver on the bench without a flight
//! controller attached.

use std::time::Duration;

use crate::config::BenchConfig;

use super::{
    BatterySensor, EscReading, EscSensor, GpsFixType, GpsReceiver, GpsSolution, Navigation,
    SensorHub, TemperatureSensors,
};

/// Sensor source that always reports the configured values
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSensors {
    config: BenchConfig,
}

impl StaticSensors {
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    /// Build a hub with every capability backed by these values
    ///
    /// GPS and ESC are only attached when enabled in the configuration.
    pub fn into_hub(self) -> SensorHub {
        let mut hub = SensorHub::new()
            .with_battery(self.clone())
            .with_navigation(self.clone())
            .with_temperature(self.clone());

        if self.config.gps_enabled {
            hub = hub.with_gps(self.clone());
        }
        if self.config.esc_enabled {
            hub = hub.with_esc(self);
        }

        hub
    }
}

fn deci(value: f32) -> i16 {
    (value * 10.0) as i16
}

impl BatterySensor for StaticSensors {
    fn voltage_cv(&self) -> u16 {
        (self.config.voltage_v * 100.0) as u16
    }

    fn average_cell_voltage_cv(&self) -> u16 {
        let cells = u16::from(self.config.cell_count.max(1));
        self.voltage_cv() / cells
    }

    fn amperage_ca(&self) -> i32 {
        (self.config.current_a * 100.0) as i32
    }

    fn mah_drawn(&self) -> i32 {
        self.config.capacity_mah as i32
    }
}

impl Navigation for StaticSensors {
    fn altitude_cm(&self) -> f32 {
        self.config.altitude_m * 100.0
    }

    fn vertical_speed_cms(&self) -> f32 {
        self.config.vertical_speed_ms * 100.0
    }
}

impl GpsReceiver for StaticSensors {
    fn solution(&self) -> GpsSolution {
        GpsSolution {
            fix_type: GpsFixType::Fix3D,
            ground_speed_cms: (self.config.ground_speed_kmh / 0.036) as u16,
            lat_e7: (self.config.latitude * 1e7) as i32,
            lon_e7: (self.config.longitude * 1e7) as i32,
        }
    }
}

impl EscSensor for StaticSensors {
    fn reading(&self) -> Option<EscReading> {
        Some(EscReading {
            rpm: self.config.esc_rpm,
            temperature_c: self.config.esc_temperature_c,
            age: Duration::ZERO,
        })
    }
}

impl TemperatureSensors for StaticSensors {
    fn imu_temperature(&self) -> Option<i16> {
        self.config.imu_temperature_c.map(deci)
    }

    fn baro_temperature(&self) -> Option<i16> {
        self.config.baro_temperature_c.map(deci)
    }

    fn aux_temperature(&self, index: usize) -> Option<i16> {
        self.config.aux_temperatures_c.get(index).copied().map(deci)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench() -> BenchConfig {
        BenchConfig {
            voltage_v: 16.0,
            cell_count: 4,
            current_a: 12.5,
            capacity_mah: 850,
            altitude_m: 120.0,
            vertical_speed_ms: -1.5,
            gps_enabled: true,
            latitude: 52.5,
            longitude: 13.25,
            ground_speed_kmh: 36.0,
            esc_enabled: false,
            esc_rpm: 12_000,
            esc_temperature_c: 45,
            imu_temperature_c: Some(35.5),
            baro_temperature_c: None,
            aux_temperatures_c: vec![20.0, 21.5],
        }
    }

    #[test]
    fn test_battery_units() {
        let sensors = StaticSensors::new(bench());
        assert_eq!(sensors.voltage_cv(), 1600);
        assert_eq!(sensors.average_cell_voltage_cv(), 400);
        assert_eq!(sensors.amperage_ca(), 1250);
        assert_eq!(sensors.mah_drawn(), 850);
    }

    #[test]
    fn test_zero_cells_does_not_divide_by_zero() {
        let mut config = bench();
        config.cell_count = 0;
        let sensors = StaticSensors::new(config);
        assert_eq!(sensors.average_cell_voltage_cv(), 1600);
    }

    #[test]
    fn test_navigation_units() {
        let sensors = StaticSensors::new(bench());
        assert_eq!(sensors.altitude_cm(), 12_000.0);
        assert_eq!(sensors.vertical_speed_cms(), -150.0);
    }

    #[test]
    fn test_gps_solution() {
        let solution = StaticSensors::new(bench()).solution();
        assert_eq!(solution.fix_type, GpsFixType::Fix3D);
        assert_eq!(solution.lat_e7, 525_000_000);
        assert_eq!(solution.lon_e7, 132_500_000);
        assert!((999..=1000).contains(&solution.ground_speed_cms));
    }

    #[test]
    fn test_temperatures_in_deci_degrees() {
        let sensors = StaticSensors::new(bench());
        assert_eq!(sensors.imu_temperature(), Some(355));
        assert_eq!(sensors.baro_temperature(), None);
        assert_eq!(sensors.aux_temperature(0), Some(200));
        assert_eq!(sensors.aux_temperature(1), Some(215));
        assert_eq!(sensors.aux_temperature(2), None);
    }

    #[test]
    fn test_hub_respects_enable_flags() {
        let hub = StaticSensors::new(bench()).into_hub();
        assert!(hub.battery.is_some());
        assert!(hub.gps.is_some());
        assert!(hub.esc.is_none());
    }
}
