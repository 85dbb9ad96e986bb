//! # SBUS2 Payload Encoders
//!
//! Pure encoders for the third-party sensor formats a transmitter display
//! understands. Every function returns the payloads for consecutive slots,
//! starting with the slot the sensor is registered on.
//!
//! Unless noted otherwise, 16-bit values go out high byte first. The GPS
//! formats live in [`super::gps`].

use super::protocol::Payload;

/// Voltage sensor (SBS-01V): 2 slots
///
/// # Arguments
///
/// * `voltage1` - Main voltage in 0.1 V steps
/// * `voltage2` - Secondary voltage in 0.1 V steps
///
/// # Encoding
///
/// ```text
/// slot 0: voltage1 | 0x8000, limited to 0x8000..=0x9FFF (819.1 V max)
/// slot 1: voltage2, limited to 0x1FFF
/// ```
pub fn voltage(voltage1: u16, voltage2: u16) -> [Payload; 2] {
    let main = (voltage1 | 0x8000).clamp(0x8000, 0x9FFF);
    let secondary = voltage2.min(0x1FFF);

    [main.to_be_bytes(), secondary.to_be_bytes()]
}

/// Current sensor (SBS-01C / F1678): 3 slots
///
/// # Arguments
///
/// * `current` - Current in centiamps, limited to 0x3FFF (163.83 A)
/// * `capacity` - Consumed capacity in mAh
/// * `voltage` - Voltage in centivolts
///
/// The high byte of the current slot always carries bit 6 and never bit 7.
pub fn current(current: u16, capacity: u16, voltage: u16) -> [Payload; 3] {
    let [high, low] = current.min(0x3FFF).to_be_bytes();

    [
        [(high | 0x40) & 0x7F, low],
        voltage.to_be_bytes(),
        capacity.to_be_bytes(),
    ]
}

/// RPM sensor (SBS-01RM/RO/RB/R): 1 slot
///
/// The wire value is `rpm / 6`, saturated at 0xFFFF and sent low byte first.
pub fn rpm(rpm: u32) -> [Payload; 1] {
    let value = u16::try_from(rpm / 6).unwrap_or(u16::MAX);
    [value.to_le_bytes()]
}

/// Temperature sensor (SBS-01T): 1 slot
///
/// `(temp | 0x8000) + 100` in 16-bit arithmetic, sent low byte first.
pub fn temperature_sbs01t(temp: i16) -> [Payload; 1] {
    let value = ((temp as u16) | 0x8000).wrapping_add(100);
    [value.to_le_bytes()]
}

/// Temperature sensor (SBS-01TE / F1713, 125 °C range): 1 slot
pub fn temperature_125(temp: i16) -> [Payload; 1] {
    let value = (temp as u16) | 0x4000;
    [value.to_be_bytes()]
}

/// Variometer (F1672 / F1712): 2 slots
///
/// # Arguments
///
/// * `altitude` - Altitude in metres, sent as `altitude | 0x4000`
/// * `vario` - Vertical speed already scaled by the variant (×100 for F1672,
///   ×10 for F1712)
pub fn vario(altitude: i16, vario: i16) -> [Payload; 2] {
    [vario.to_be_bytes(), (altitude | 0x4000).to_be_bytes()]
}

/// ESC telemetry as shown for Scorpion and Kontronik controllers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EscBlock {
    /// Voltage in centivolts (41.10 V = 4110)
    pub voltage: u16,
    /// Consumed capacity in mAh
    pub capacity: u16,
    /// Motor RPM
    pub rpm: u32,
    /// Current in centiamps (133.10 A = 13310)
    pub current: u16,
    /// ESC temperature in °C
    pub temp: u16,
    /// BEC temperature in °C
    pub bec_temp: u16,
    /// BEC current in centiamps
    pub bec_current: u16,
    /// PWM output
    pub pwm: u16,
}

/// ESC sensor (Scorpion / Kontronik): 8 slots
///
/// Values are not limited; `rpm / 6` beyond 16 bits is truncated.
pub fn esc(block: &EscBlock) -> [Payload; 8] {
    [
        (block.voltage | 0x8000).to_be_bytes(),
        block.capacity.to_be_bytes(),
        ((block.rpm / 6) as u16).to_be_bytes(),
        block.current.to_be_bytes(),
        block.temp.to_be_bytes(),
        block.bec_temp.to_be_bytes(),
        block.bec_current.to_be_bytes(),
        block.pwm.to_be_bytes(),
    ]
}

/// Turbine telemetry (JetCat)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurbineBlock {
    /// Actual RPM
    pub rpm: u32,
    /// Exhaust gas temperature in °C
    pub egt: u16,
    /// Pump voltage in centivolts
    pub pump_voltage: u16,
    /// Setpoint RPM
    pub setpoint_rpm: u32,
    /// Thrust in 0.1 N
    pub thrust: u16,
    /// Remaining fuel in ml
    pub fuel: u16,
    /// Fuel flow in ml/min
    pub fuel_flow: u16,
    /// Altitude, sent without offset
    pub altitude: u16,
    /// Fuel quality in %
    pub quality: u16,
    /// Voltage in centivolts
    pub voltage: u16,
    /// Current in 0.1 A
    pub current: u16,
    /// Speed in km/h
    pub speed: u16,
    /// Status and error code
    pub status: u16,
    /// Second shaft RPM
    pub second_rpm: u32,
}

/// Turbine sensor (JetCat): 14 slots
///
/// Only the actual RPM carries the 0x4000 offset; altitude is sent raw.
pub fn jetcat(block: &TurbineBlock) -> [Payload; 14] {
    [
        saturate_u16((block.rpm / 100) | 0x4000).to_be_bytes(),
        block.egt.to_be_bytes(),
        block.pump_voltage.to_be_bytes(),
        saturate_u16(block.setpoint_rpm / 100).to_be_bytes(),
        block.thrust.to_be_bytes(),
        block.fuel.to_be_bytes(),
        block.fuel_flow.to_be_bytes(),
        block.altitude.to_be_bytes(),
        block.quality.to_be_bytes(),
        block.voltage.to_be_bytes(),
        block.current.to_be_bytes(),
        block.speed.to_be_bytes(),
        block.status.to_be_bytes(),
        saturate_u16(block.second_rpm / 100).to_be_bytes(),
    ]
}

fn saturate_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}
