//! Unit conversion helpers.
//!
//! Providers report in mixed unit systems: AccuWeather ships Fahrenheit
//! and mph (we query it with `metric=false`), OpenWeather ships Celsius
//! but wind in metres per second, Open-Meteo is already km/h and Celsius.
//! Everything user-facing is normalised to Celsius and km/h.
//!
//! All conversions round to the nearest integer, half away from zero
//! (`f64::round` semantics).

/// Convert a temperature in degrees Fahrenheit to rounded degrees Celsius.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    ((fahrenheit - 32.0) * 5.0 / 9.0).round()
}

/// Convert a speed in miles per hour to rounded km/h.
pub fn mph_to_kmh(mph: f64) -> f64 {
    (mph * 1.60934).round()
}

/// Convert a speed in metres per second to rounded km/h.
pub fn mps_to_kmh(mps: f64) -> f64 {
    (mps * 3.6).round()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
