//! Observation value types and unit conversions.
//!
//! An [`Observation`] is a normalized snapshot of one station report:
//! metric units only, every sensor optional. Conversions are keyed by
//! the WMO unit code the upstream attaches to each field.

use chrono::{DateTime, Utc};
use std::time::Instant;

/// One normalized weather observation. Fields are `None` when the
/// station did not report that sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Temperature in degrees Celsius.
    pub temperature_celsius: Option<f64>,
    /// Relative humidity, 0-100.
    pub relative_humidity_percent: Option<f64>,
    /// Wind speed in km/h.
    pub wind_speed_kmh: Option<f64>,
    /// Wind direction in degrees (0-360, meteorological).
    pub wind_direction_degrees: Option<f64>,
    /// Barometric pressure in pascals.
    pub barometric_pressure_pascals: Option<f64>,
    /// Upstream-reported observation time.
    pub observed_at: Option<DateTime<Utc>>,
}

/// A cached observation plus the local monotonic time it was fetched.
///
/// `fetched_at` is distinct from `Observation::observed_at`: the former
/// is when *we* retrieved the report, the latter is when the station
/// recorded it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub observation: Observation,
    pub fetched_at: Instant,
}

impl CacheEntry {
    /// Seconds elapsed since this entry was fetched.
    pub fn age_seconds(&self) -> f64 {
        self.fetched_at.elapsed().as_secs_f64()
    }
}

/// Strip the namespace prefix from a unit code.
///
/// The API reports codes like `wmoUnit:degC` (older payloads used
/// `unit:degC`); only the part after the colon identifies the unit.
pub fn unit_name(unit_code: &str) -> &str {
    unit_code.split(':').next_back().unwrap_or(unit_code)
}

/// Convert a temperature value to degrees Celsius.
///
/// Returns `None` for unit codes that are not temperatures.
pub fn to_celsius(unit_code: &str, value: f64) -> Option<f64> {
    match unit_name(unit_code) {
        "degC" => Some(value),
        "degF" => Some((value - 32.0) * 5.0 / 9.0),
        _ => None,
    }
}

/// Convert a speed value to kilometers per hour.
pub fn to_kilometers_per_hour(unit_code: &str, value: f64) -> Option<f64> {
    match unit_name(unit_code) {
        "km_h-1" => Some(value),
        "m_s-1" => Some(value * 3.6),
        _ => None,
    }
}

/// Convert a pressure value to pascals.
pub fn to_pascals(unit_code: &str, value: f64) -> Option<f64> {
    match unit_name(unit_code) {
        "Pa" => Some(value),
        "hPa" => Some(value * 100.0),
        _ => None,
    }
}

/// Pass through a percentage (0-100).
pub fn to_percent(unit_code: &str, value: f64) -> Option<f64> {
    match unit_name(unit_code) {
        "percent" => Some(value),
        _ => None,
    }
}

/// Pass through an angle in degrees.
pub fn to_degrees(unit_code: &str, value: f64) -> Option<f64> {
    match unit_name(unit_code) {
        "degree_(angle)" => Some(value),
        _ => None,
    }
}
