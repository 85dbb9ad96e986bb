//! # SBUS2 GPS Encoders
//!
//! Two GPS sensor formats:
//!
//! - **F1675**: 8 slots, coordinates as whole degrees plus minutes with four
//!   decimals, hemisphere folded into the top nibble of the fraction.
//! - **SBS-10G**: 8 slots, coordinates in 1/600000 degree with dedicated
//!   hemisphere bits, fields interleaved across slot boundaries.

use super::protocol::Payload;

/// Scale of the integer coordinate representations (×1e6)
const MICRO: i32 = 1_000_000;

/// Fixed time shown by F1675 displays (12:34:56 = 45296 = 0xB0F0)
const F1675_TIME_PLACEHOLDER: Payload = [0xB0, 0xF0];

/// Convert decimal degrees to micro-degrees, rounding to nearest
///
/// Out-of-range values saturate at the `i32` bounds.
pub fn micro_degrees(degrees: f64) -> i32 {
    (degrees * f64::from(MICRO)).round() as i32
}

/// Convert micro-degrees back to decimal degrees
pub fn degrees_from_micro(micro: i32) -> f64 {
    f64::from(micro) / f64::from(MICRO)
}

/// F1675 wire coordinate
///
/// A ×1e6 integer holding `whole_degrees * 1_000_000 + minutes * 10_000`,
/// negative for south/west.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DegreeMinutes(i32);

impl DegreeMinutes {
    /// From micro-degrees (decimal degrees × 1e6)
    ///
    /// The fractional degree is turned into minutes with truncating integer
    /// arithmetic (`frac * 60 / 100`).
    pub fn from_micro_degrees(micro: i32) -> Self {
        let degrees = micro / MICRO;
        let fraction = micro % MICRO;
        Self(degrees * MICRO + (fraction * 60) / 100)
    }

    /// From decimal degrees
    ///
    /// # Examples
    ///
    /// ```
    /// use sbus2_telemetry::sbus2::gps::DegreeMinutes;
    ///
    /// // 52.5° = 52° 30.0000'
    /// assert_eq!(DegreeMinutes::from_degrees(52.5).raw(), 52_300_000);
    /// ```
    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_micro_degrees(micro_degrees(degrees))
    }

    /// From a GNSS-style 1e7-scaled integer
    pub fn from_e7(raw: i32) -> Self {
        Self::from_micro_degrees(raw / 10)
    }

    /// From whole degrees and decimal minutes
    ///
    /// The coordinate is negative if either part is negative.
    pub fn from_minutes(degrees: i8, minutes: f32) -> Self {
        let negative = degrees < 0 || minutes < 0.0;
        let minutes_e4 = (minutes.abs() * 10_000.0) as i32;
        Self::assemble(degrees.unsigned_abs(), minutes_e4, negative)
    }

    /// From whole degrees and minutes × 10000
    ///
    /// The coordinate is negative if either part is negative.
    pub fn from_minutes_e4(degrees: i8, minutes_e4: i32) -> Self {
        let negative = degrees < 0 || minutes_e4 < 0;
        let minutes_e4 = minutes_e4.checked_abs().unwrap_or(i32::MAX);
        Self::assemble(degrees.unsigned_abs(), minutes_e4, negative)
    }

    fn assemble(degrees: u8, minutes_e4: i32, negative: bool) -> Self {
        let magnitude = (i32::from(degrees) * MICRO).wrapping_add(minutes_e4);
        Self(if negative { magnitude.wrapping_neg() } else { magnitude })
    }

    /// Raw ×1e6 wire value
    pub fn raw(self) -> i32 {
        self.0
    }
}

/// Encode one F1675 coordinate into its two slots
///
/// ```text
/// slot 0: [whole degrees, fraction bits 16..19 | hemisphere]
/// slot 1: [fraction bits 8..15, fraction bits 0..7]
/// ```
///
/// North/east clears the top nibble; south/west ORs in 0x1F.
fn f1675_coordinate(coordinate: DegreeMinutes) -> [Payload; 2] {
    let negative = coordinate.0 < 0;
    let magnitude = coordinate.0.unsigned_abs();

    let degrees = (magnitude / MICRO as u32) as u8;
    let fraction = magnitude % MICRO as u32;

    let high = if negative {
        ((fraction >> 16) | 0x1F) as u8
    } else {
        ((fraction >> 16) & 0x0F) as u8
    };

    [
        [degrees, high],
        [(fraction >> 8) as u8, fraction as u8],
    ]
}

/// GPS sensor (F1675): 8 slots
///
/// # Arguments
///
/// * `speed` - Ground speed in km/h, limited to 999
/// * `altitude` - Altitude in metres, not limited
/// * `vario` - Vertical speed in 0.1 m/s, not limited
/// * `latitude` / `longitude` - Wire coordinates
///
/// # Slots
///
/// ```text
/// 0 speed | 0x4000     4-5 latitude
/// 1 altitude | 0x4000  6-7 longitude
/// 2 time placeholder
/// 3 vario (0.1 m/s)
/// ```
pub fn gps_f1675(
    speed: u16,
    altitude: i16,
    vario: i16,
    latitude: DegreeMinutes,
    longitude: DegreeMinutes,
) -> [Payload; 8] {
    let speed = (speed | 0x4000).clamp(0x4000, 0x43E7);
    let [lat0, lat1] = f1675_coordinate(latitude);
    let [lon0, lon1] = f1675_coordinate(longitude);

    [
        speed.to_be_bytes(),
        (altitude | 0x4000).to_be_bytes(),
        F1675_TIME_PLACEHOLDER,
        vario.to_be_bytes(),
        lat0,
        lat1,
        lon0,
        lon1,
    ]
}

/// Input for the SBS-10G GPS sensor
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sbs10gFix {
    /// UTC hours (0-24)
    pub hours: u16,
    /// UTC minutes (0-60)
    pub minutes: u16,
    /// UTC seconds (0-60)
    pub seconds: u16,
    /// Decimal degrees, negative for south
    pub latitude: f64,
    /// Decimal degrees, negative for west
    pub longitude: f64,
    /// Altitude in metres (valid -820..=4830)
    pub altitude_m: f32,
    /// Ground speed in km/h (valid 0..512)
    pub speed_kmh: u16,
    /// Vertical speed in m/s (valid -150..=260)
    pub vario_ms: f32,
}

const SBS10G_SOUTH: u32 = 0x400_0000;
const SBS10G_WEST: u32 = 0x800_0000;
const SBS10G_SPEED_VALID: u16 = 0x200;
const SBS10G_VARIO_VALID: u16 = 0x1000;

/// Scale a coordinate to 1/600000 degree and fold in the hemisphere bit
///
/// Only strictly positive values count as north/east.
fn sbs10g_coordinate(degrees: f64, hemisphere_bit: u32) -> u32 {
    if degrees > 0.0 {
        (600_000.0 * degrees + 0.5) as u32
    } else {
        ((-600_000.0 * degrees + 0.5) as u32) | hemisphere_bit
    }
}

/// `1.25 * (alt + 820)` rounded, or 0 outside -820..=4830 m
fn sbs10g_altitude(altitude_m: f32) -> u16 {
    if (-820.0..=4830.0).contains(&altitude_m) {
        (1.25 * f64::from(altitude_m + 820.0) + 0.5) as u16
    } else {
        0
    }
}

/// Speed with its enable bit, or 0 ("no data") from 512 km/h up
fn sbs10g_speed(speed_kmh: u16) -> u16 {
    if speed_kmh < 512 {
        speed_kmh | SBS10G_SPEED_VALID
    } else {
        0
    }
}

/// `10 * (vario + 150)` rounded with its enable bit, or 0 outside -150..=260 m/s
fn sbs10g_vario(vario_ms: f32) -> u16 {
    if (-150.0..=260.0).contains(&vario_ms) {
        ((10.0 * f64::from(vario_ms + 150.0) + 0.5) as u16) | SBS10G_VARIO_VALID
    } else {
        0
    }
}

/// GPS sensor (SBS-10G): 8 slots
///
/// Fields are packed as a bit stream that crosses slot boundaries:
///
/// ```text
/// slot 0: utc[0..16]
/// slot 1: lat[0..7] << 1 | utc[16], lat[7..15]
/// slot 2: lat[15..23], lat[23..27] | lon[0..4] << 4
/// slot 3: lon[4..12], lon[12..20]
/// slot 4: lon[20..28], speed[0..8]
/// slot 5: speed[8..10], 0
/// slot 6: alt[0..2] << 6, alt[2..10]
/// slot 7: vario[0..5] << 3 | alt[10..13], vario[5..13]
/// ```
pub fn gps_sbs10g(fix: &Sbs10gFix) -> [Payload; 8] {
    let utc = u32::from(fix.hours) * 3600 + u32::from(fix.minutes) * 60 + u32::from(fix.seconds);
    let lat = sbs10g_coordinate(fix.latitude, SBS10G_SOUTH);
    let lon = sbs10g_coordinate(fix.longitude, SBS10G_WEST);
    let alt = sbs10g_altitude(fix.altitude_m);
    let speed = sbs10g_speed(fix.speed_kmh);
    let vario = sbs10g_vario(fix.vario_ms);

    [
        [(utc & 0x00ff) as u8, ((utc & 0xff00) >> 8) as u8],
        [
            (((lat & 0x007f) << 1) | ((utc & 0x1_0000) >> 16)) as u8,
            ((lat & 0x7f80) >> 7) as u8,
        ],
        [
            ((lat & 0x07f_8000) >> 15) as u8,
            (((lat & 0x780_0000) >> 23) | ((lon & 0x0f) << 4)) as u8,
        ],
        [((lon & 0x0_0ff0) >> 4) as u8, ((lon & 0xf_f000) >> 12) as u8],
        [((lon & 0xff0_0000) >> 20) as u8, (speed & 0xff) as u8],
        [((speed & 0x300) >> 8) as u8, 0x00],
        [((alt & 0x003) << 6) as u8, ((alt & 0x3fc) >> 2) as u8],
        [
            (((vario & 0x001f) << 3) | ((alt & 0x1c00) >> 10)) as u8,
            ((vario & 0x1fe0) >> 5) as u8,
        ],
    ]
}
