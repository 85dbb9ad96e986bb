//! # Emulated Sensors
//!
//! Typed entry points that scale flight-controller units into the integer
//! inputs of each encoder and stage the result in the store.
//!
//! `port` is the global slot index of the sensor's first slot. Multi-slot
//! sensors occupy `port..port + n`. Float to integer conversions truncate
//! toward zero and saturate at the target type bounds.

use super::encoder::{self, EscBlock, TurbineBlock};
use super::gps::{self, DegreeMinutes, Sbs10gFix};
use super::store::TelemetryStore;

impl TelemetryStore {
    /// SBS-01V voltage sensor (2 slots), volts
    pub fn send_voltage(&mut self, port: u8, voltage1: f32, voltage2: f32) {
        let payloads = encoder::voltage((voltage1 * 10.0) as u16, (voltage2 * 10.0) as u16);
        self.write_block(port, &payloads);
    }

    /// SBS-01C / F1678 current sensor (3 slots)
    ///
    /// # Arguments
    ///
    /// * `current` - Amps
    /// * `capacity` - Consumed capacity in mAh
    /// * `voltage` - Volts
    pub fn send_current(&mut self, port: u8, current: f32, capacity: u16, voltage: f32) {
        let payloads = encoder::current((current * 100.0) as u16, capacity, (voltage * 100.0) as u16);
        self.write_block(port, &payloads);
    }

    /// SBS-01RM/RO/RB/R rotation sensor (1 slot)
    pub fn send_rpm(&mut self, port: u8, rpm: u32) {
        self.write_block(port, &encoder::rpm(rpm));
    }

    /// SBS-01T temperature sensor (1 slot), °C
    pub fn send_sbs01t(&mut self, port: u8, temp: i16) {
        self.write_block(port, &encoder::temperature_sbs01t(temp));
    }

    /// SBS-01TE / F1713 temperature sensor (1 slot), °C
    pub fn send_temp125(&mut self, port: u8, temp: i16) {
        self.write_block(port, &encoder::temperature_125(temp));
    }

    /// F1672 variometer (2 slots), vario in m/s sent in cm/s
    pub fn send_f1672(&mut self, port: u8, altitude: i16, vario: f32) {
        self.write_block(port, &encoder::vario(altitude, (vario * 100.0) as i16));
    }

    /// F1712 variometer (2 slots), vario in m/s sent in 0.1 m/s
    pub fn send_f1712(&mut self, port: u8, altitude: i16, vario: f32) {
        self.write_block(port, &encoder::vario(altitude, (vario * 10.0) as i16));
    }

    /// F1675 GPS (8 slots)
    ///
    /// # Arguments
    ///
    /// * `speed` - Ground speed in km/h
    /// * `altitude` - Metres
    /// * `vario` - m/s, sent in 0.1 m/s
    /// * `latitude` / `longitude` - See [`DegreeMinutes`] for the accepted
    ///   input forms
    pub fn send_f1675(
        &mut self,
        port: u8,
        speed: u16,
        altitude: i16,
        vario: f32,
        latitude: DegreeMinutes,
        longitude: DegreeMinutes,
    ) {
        let payloads = gps::gps_f1675(speed, altitude, (vario * 10.0) as i16, latitude, longitude);
        self.write_block(port, &payloads);
    }

    /// SBS-10G GPS (8 slots)
    pub fn send_sbs10g(&mut self, port: u8, fix: &Sbs10gFix) {
        self.write_block(port, &gps::gps_sbs10g(fix));
    }

    /// Scorpion / Kontronik ESC (8 slots)
    pub fn send_esc(&mut self, port: u8, block: &EscBlock) {
        self.write_block(port, &encoder::esc(block));
    }

    /// JetCat turbine (14 slots)
    pub fn send_jetcat(&mut self, port: u8, block: &TurbineBlock) {
        self.write_block(port, &encoder::jetcat(block));
    }
}
