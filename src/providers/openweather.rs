//! OpenWeather 5-day/3-hour forecast adapter.
//!
//! Queried with `units=metric`, so temperatures arrive in Celsius, but
//! wind speed still comes in metres per second and precipitation
//! probability as a 0–1 fraction; both are normalised here.
//!
//! API: `https://api.openweathermap.org/data/2.5/forecast`
//! Auth: API key as `appid` query parameter.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::time::Duration;

use super::{build_client, execute, ForecastProvider};
use crate::cache::cache_lifetime;
use crate::config::LocationConfig;
use crate::error::ProviderError;
use crate::types::{ForecastRecord, ForecastSource, TargetDay};
use crate::units::mps_to_kmh;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// The 3-hour steps shown for this provider cover most of the day.
const DISPLAY_HOURS: RangeInclusive<u32> = 6..=23;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    /// Unix timestamp, UTC.
    dt: i64,
    /// Probability of precipitation, 0.0–1.0.
    #[serde(default)]
    pop: Option<f64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: Option<OwWind>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    /// Metres per second under `units=metric`.
    speed: f64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OpenWeatherClient {
    http: Client,
    latitude: f64,
    longitude: f64,
    locale: String,
    offset: FixedOffset,
    api_key: Option<String>,
    api_key_env: String,
}

impl OpenWeatherClient {
    pub fn new(
        location: &LocationConfig,
        api_key_env: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            latitude: location.latitude,
            longitude: location.longitude,
            // OpenWeather spells language tags with an underscore
            locale: location.locale.replace('-', "_"),
            offset: location.offset(),
            api_key: std::env::var(api_key_env).ok(),
            api_key_env: api_key_env.to_string(),
        })
    }

    /// Filter the 3-hour series to the target day's display window and
    /// normalise each surviving entry. Pure.
    fn normalize(
        payload: &OwForecastResponse,
        day: TargetDay,
        offset: FixedOffset,
    ) -> Option<Vec<ForecastRecord>> {
        let records: Vec<ForecastRecord> = payload
            .list
            .iter()
            .filter_map(|entry| {
                let timestamp = DateTime::<Utc>::from_timestamp(entry.dt, 0)?
                    .with_timezone(&offset);

                if timestamp.weekday() != day.weekday()
                    || !DISPLAY_HOURS.contains(&timestamp.hour())
                {
                    return None;
                }

                let description = entry
                    .weather
                    .first()
                    .map(|w| w.description.clone())
                    .unwrap_or_else(|| "Unknown conditions".to_string());

                Some(ForecastRecord {
                    source: ForecastSource::OpenWeather,
                    timestamp,
                    temperature_c: Some(entry.main.temp.round()),
                    description,
                    // 0–1 fraction → percent with two decimals
                    rain_probability_pct: entry.pop.map(|p| (p * 10_000.0).round() / 100.0),
                    wind_speed_kmh: entry.wind.as_ref().map(|w| mps_to_kmh(w.speed)),
                    uv_index: None,
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
impl ForecastProvider for OpenWeatherClient {
    fn source(&self) -> ForecastSource {
        ForecastSource::OpenWeather
    }

    async fn fetch_forecast(
        &self,
        day: TargetDay,
    ) -> Result<Option<Vec<ForecastRecord>>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredential(self.api_key_env.clone()))?;

        let window = cache_lifetime(Utc::now().with_timezone(&self.offset).date_naive());

        let request = self.http.get(BASE_URL).query(&[
            ("lat", self.latitude.to_string()),
            ("lon", self.longitude.to_string()),
            ("appid", api_key.to_string()),
            ("units", "metric".to_string()),
            ("lang", self.locale.clone()),
        ]);

        let body = execute(request, window).await?;
        let payload: OwForecastResponse = serde_json::from_str(&body)?;

        Ok(Self::normalize(&payload, day, self.offset))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
