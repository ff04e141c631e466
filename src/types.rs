//! Shared types for the CEEFGuru service.
//!
//! These types form the data model used across all modules: the
//! normalized forecast record every provider maps into, the aggregate
//! shape the HTTP layer serves, and the target-day selector.

use chrono::{DateTime, FixedOffset, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// The three upstream weather providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastSource {
    #[serde(rename = "AccuWeather")]
    AccuWeather,
    #[serde(rename = "Open-Meteo")]
    OpenMeteo,
    #[serde(rename = "OpenWeather")]
    OpenWeather,
}

impl ForecastSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastSource::AccuWeather => "AccuWeather",
            ForecastSource::OpenMeteo => "Open-Meteo",
            ForecastSource::OpenWeather => "OpenWeather",
        }
    }
}

impl fmt::Display for ForecastSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Target day
// ---------------------------------------------------------------------------

/// Which weekday's forecast to extract from a multi-day payload.
///
/// The discriminants follow the JS `Date.getDay()` numbering the site's
/// front-end sends: 5 = Friday, 6 = Saturday. Anything else is a client
/// error, rejected before any upstream call is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetDay {
    Friday,
    Saturday,
}

impl TargetDay {
    /// The chrono weekday used when filtering provider time series.
    pub fn weekday(self) -> Weekday {
        match self {
            TargetDay::Friday => Weekday::Fri,
            TargetDay::Saturday => Weekday::Sat,
        }
    }

    /// The wire number the HTTP API accepts for this day.
    pub fn as_u8(self) -> u8 {
        match self {
            TargetDay::Friday => 5,
            TargetDay::Saturday => 6,
        }
    }
}

impl TryFrom<u8> for TargetDay {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(TargetDay::Friday),
            6 => Ok(TargetDay::Saturday),
            other => Err(anyhow::anyhow!(
                "Unsupported day '{other}'. Supported days: 5 (Friday), 6 (Saturday)."
            )),
        }
    }
}

impl fmt::Display for TargetDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetDay::Friday => f.write_str("Friday"),
            TargetDay::Saturday => f.write_str("Saturday"),
        }
    }
}

// ---------------------------------------------------------------------------
// Forecast records
// ---------------------------------------------------------------------------

/// A single normalized forecast entry, provider-agnostic.
///
/// Temperatures are always Celsius and wind speeds always km/h,
/// whatever the provider's native units. The timestamp always carries
/// the site's fixed UTC offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub source: ForecastSource,
    pub timestamp: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_probability_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
    /// Extra detail only the daily-forecast provider supplies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily: Option<DailyDetail>,
}

/// Day-level enrichment from AccuWeather's daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDetail {
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,
    pub real_feel_min_c: f64,
    pub real_feel_max_c: f64,
    pub day: DayPeriod,
    pub night: DayPeriod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moon_phase: Option<String>,
}

/// Daytime or nighttime half of a daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPeriod {
    pub has_precipitation: bool,
    pub phrase: String,
    pub precipitation_probability_pct: f64,
    pub thunderstorm_probability_pct: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction: String,
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// The combined result of one aggregation pass.
///
/// Each slot is independent: a provider that failed or had no data for
/// the target day is simply `None`, and never blocks the others.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregatedForecast {
    pub accuweather: Option<ForecastRecord>,
    pub open_meteo: Option<Vec<ForecastRecord>>,
    pub openweather: Option<Vec<ForecastRecord>>,
}

impl AggregatedForecast {
    /// True when every provider came back empty or failed.
    pub fn is_empty(&self) -> bool {
        self.accuweather.is_none() && self.open_meteo.is_none() && self.openweather.is_none()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
