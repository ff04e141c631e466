//! Open-Meteo hourly forecast adapter.
//!
//! Uses the free Open-Meteo API (no key required). Timestamps come back
//! as naive local time in the requested timezone; weather conditions as
//! WMO codes, mapped to shared description text here.
//!
//! API: `https://api.open-meteo.com/v1/forecast`
//! Auth: None required.
//! Rate limit: Generous (free tier).

use async_trait::async_trait;
use chrono::{Datelike, FixedOffset, NaiveDateTime, Timelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::time::Duration;

use super::{build_client, execute, ForecastProvider};
use crate::cache::cache_lifetime;
use crate::config::LocationConfig;
use crate::error::ProviderError;
use crate::types::{ForecastRecord, ForecastSource, TargetDay};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Hour windows shown on the site: Friday afternoon training slots,
/// Saturday morning-to-afternoon slots.
const FRIDAY_HOURS: RangeInclusive<u32> = 12..=19;
const SATURDAY_HOURS: RangeInclusive<u32> = 9..=16;

fn display_hours(day: TargetDay) -> RangeInclusive<u32> {
    match day {
        TargetDay::Friday => FRIDAY_HOURS,
        TargetDay::Saturday => SATURDAY_HOURS,
    }
}

/// Shared description text for the WMO weather codes Open-Meteo emits.
fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown conditions",
    }
}

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

/// Only the slice of the payload we consume; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    hourly: Option<OpenMeteoHourly>,
}

/// Parallel arrays, one slot per hour. Individual slots may be null.
#[derive(Debug, Deserialize)]
struct OpenMeteoHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    uv_index: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OpenMeteoClient {
    http: Client,
    latitude: f64,
    longitude: f64,
    timezone: String,
    offset: FixedOffset,
}

impl OpenMeteoClient {
    pub fn new(location: &LocationConfig, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            latitude: location.latitude,
            longitude: location.longitude,
            timezone: location.timezone.clone(),
            offset: location.offset(),
        })
    }

    /// Filter the hourly series to the target day's display window and
    /// map each surviving hour into a `ForecastRecord`. Pure.
    fn normalize(
        payload: &OpenMeteoResponse,
        day: TargetDay,
        offset: FixedOffset,
    ) -> Option<Vec<ForecastRecord>> {
        let hourly = payload.hourly.as_ref()?;
        let window = display_hours(day);

        let records: Vec<ForecastRecord> = hourly
            .time
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| {
                // Open-Meteo sends naive local time, e.g. "2026-08-07T14:00"
                let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").ok()?;
                let timestamp = naive.and_local_timezone(offset).single()?;

                if timestamp.weekday() != day.weekday() || !window.contains(&timestamp.hour()) {
                    return None;
                }

                let description = hourly
                    .weather_code
                    .get(i)
                    .copied()
                    .flatten()
                    .map(describe_weather_code)
                    .unwrap_or("Unknown conditions")
                    .to_string();

                Some(ForecastRecord {
                    source: ForecastSource::OpenMeteo,
                    timestamp,
                    temperature_c: hourly
                        .temperature_2m
                        .get(i)
                        .copied()
                        .flatten()
                        .map(f64::round),
                    description,
                    rain_probability_pct: hourly
                        .precipitation_probability
                        .get(i)
                        .copied()
                        .flatten(),
                    // Open-Meteo already reports wind in km/h
                    wind_speed_kmh: hourly
                        .wind_speed_10m
                        .get(i)
                        .copied()
                        .flatten()
                        .map(f64::round),
                    uv_index: hourly.uv_index.get(i).copied().flatten(),
                    daily: None,
                })
            })
            .collect();

        if records.is_empty() {
            None
        } else {
            Some(records)
        }
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    fn source(&self) -> ForecastSource {
        ForecastSource::OpenMeteo
    }

    async fn fetch_forecast(
        &self,
        day: TargetDay,
    ) -> Result<Option<Vec<ForecastRecord>>, ProviderError> {
        let window = cache_lifetime(Utc::now().with_timezone(&self.offset).date_naive());

        let request = self.http.get(BASE_URL).query(&[
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            (
                "hourly",
                "temperature_2m,precipitation_probability,weather_code,wind_speed_10m,uv_index"
                    .to_string(),
            ),
            ("timezone", self.timezone.clone()),
            ("forecast_days", "7".to_string()),
        ]);

        let body = execute(request, window).await?;
        let payload: OpenMeteoResponse = serde_json::from_str(&body)?;

        Ok(Self::normalize(&payload, day, self.offset))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
