//! AccuWeather daily forecast adapter.
//!
//! The richest of the three sources: day/night phrases, real-feel
//! temperatures, thunderstorm probability, sunrise/sunset and moon
//! phase. We query with `metric=false`, so temperatures arrive in
//! Fahrenheit and wind in mph; both are converted on the way in.
//!
//! API: `https://dataservice.accuweather.com/forecasts/v1/daily/5day/{locationKey}`
//! Auth: API key as `apikey` query parameter.
//! Rate limit: 50 calls/day on the free tier, so the cache window matters here.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{build_client, execute, ForecastProvider};
use crate::cache::cache_lifetime;
use crate::config::LocationConfig;
use crate::error::ProviderError;
use crate::types::{DailyDetail, DayPeriod, ForecastRecord, ForecastSource, TargetDay};
use crate::units::{fahrenheit_to_celsius, mph_to_kmh};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://dataservice.accuweather.com/forecasts/v1/daily/5day";

// ---------------------------------------------------------------------------
// API response types (AccuWeather JSON → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccuDailyResponse {
    #[serde(default)]
    daily_forecasts: Vec<AccuDailyForecast>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccuDailyForecast {
    /// RFC 3339 with the location's offset, e.g. "2026-08-07T07:00:00-03:00".
    date: String,
    temperature: AccuTemperatureRange,
    #[serde(default)]
    real_feel_temperature: Option<AccuTemperatureRange>,
    day: AccuPeriod,
    night: AccuPeriod,
    #[serde(default)]
    sun: Option<AccuSun>,
    #[serde(default)]
    moon: Option<AccuMoon>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccuTemperatureRange {
    minimum: AccuValue,
    maximum: AccuValue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccuValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccuPeriod {
    #[serde(default)]
    has_precipitation: bool,
    #[serde(default)]
    long_phrase: String,
    #[serde(default)]
    precipitation_probability: f64,
    #[serde(default)]
    thunderstorm_probability: f64,
    #[serde(default)]
    wind: Option<AccuWind>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccuWind {
    speed: AccuValue,
    #[serde(default)]
    direction: Option<AccuDirection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccuDirection {
    english: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccuSun {
    #[serde(default)]
    rise: Option<String>,
    #[serde(default)]
    set: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccuMoon {
    #[serde(default)]
    phase: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct AccuWeatherClient {
    http: Client,
    location_key: String,
    locale: String,
    offset: FixedOffset,
    api_key: Option<String>,
    api_key_env: String,
}

impl AccuWeatherClient {
    pub fn new(
        location: &LocationConfig,
        api_key_env: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            location_key: location.accuweather_location_key.clone(),
            locale: location.locale.clone(),
            offset: location.offset(),
            api_key: std::env::var(api_key_env).ok(),
            api_key_env: api_key_env.to_string(),
        })
    }

    fn convert_period(period: &AccuPeriod) -> DayPeriod {
        DayPeriod {
            has_precipitation: period.has_precipitation,
            phrase: period.long_phrase.clone(),
            precipitation_probability_pct: period.precipitation_probability,
            thunderstorm_probability_pct: period.thunderstorm_probability,
            wind_speed_kmh: period
                .wind
                .as_ref()
                .map_or(0.0, |w| mph_to_kmh(w.speed.value)),
            wind_direction: period
                .wind
                .as_ref()
                .and_then(|w| w.direction.as_ref())
                .map(|d| d.english.clone())
                .unwrap_or_default(),
        }
    }

    /// Pick the forecast entry matching the target weekday and map it
    /// into a single enriched record. Pure.
    fn normalize(payload: &AccuDailyResponse, day: TargetDay) -> Option<ForecastRecord> {
        let forecast = payload.daily_forecasts.iter().find_map(|f| {
            let timestamp = DateTime::parse_from_rfc3339(&f.date).ok()?;
            (timestamp.weekday() == day.weekday()).then_some((f, timestamp))
        });
        let (forecast, timestamp) = forecast?;

        let real_feel = forecast
            .real_feel_temperature
            .as_ref()
            .unwrap_or(&forecast.temperature);

        let detail = DailyDetail {
            temperature_min_c: fahrenheit_to_celsius(forecast.temperature.minimum.value),
            temperature_max_c: fahrenheit_to_celsius(forecast.temperature.maximum.value),
            real_feel_min_c: fahrenheit_to_celsius(real_feel.minimum.value),
            real_feel_max_c: fahrenheit_to_celsius(real_feel.maximum.value),
            day: Self::convert_period(&forecast.day),
            night: Self::convert_period(&forecast.night),
            sunrise: forecast
                .sun
                .as_ref()
                .and_then(|s| s.rise.as_deref())
                .and_then(|r| DateTime::parse_from_rfc3339(r).ok()),
            sunset: forecast
                .sun
                .as_ref()
                .and_then(|s| s.set.as_deref())
                .and_then(|r| DateTime::parse_from_rfc3339(r).ok()),
            moon_phase: forecast.moon.as_ref().and_then(|m| m.phase.clone()),
        };

        Some(ForecastRecord {
            source: ForecastSource::AccuWeather,
            timestamp,
            temperature_c: Some(detail.temperature_max_c),
            description: detail.day.phrase.clone(),
            rain_probability_pct: Some(detail.day.precipitation_probability_pct),
            wind_speed_kmh: Some(detail.day.wind_speed_kmh),
            uv_index: None,
            daily: Some(detail),
        })
    }
}

#[async_trait]
impl ForecastProvider for AccuWeatherClient {
    fn source(&self) -> ForecastSource {
        ForecastSource::AccuWeather
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
        let url = format!("{BASE_URL}/{}", self.location_key);

        let request = self.http.get(&url).query(&[
            ("apikey", api_key),
            ("language", self.locale.as_str()),
            // Imperial wire units; converted during normalisation
            ("metric", "false"),
            ("details", "true"),
        ]);

        let body = execute(request, window).await?;
        let payload: AccuDailyResponse = serde_json::from_str(&body)?;

        Ok(Self::normalize(&payload, day).map(|record| vec![record]))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // A trimmed 5-day payload: Thursday and Friday entries, plus the
    // additive fields the real API sends that we deliberately ignore.
    const FIXTURE: &str = r#"{
        "Headline": { "Text": "Expect showers Friday afternoon", "Category": "rain" },
        "DailyForecasts": [
            {
                "Date": "2026-08-06T07:00:00-03:00",
                "EpochDate": 1786010400,
                "Temperature": {
                    "Minimum": { "Value": 66.0, "Unit": "F" },
                    "Maximum": { "Value": 80.0, "Unit": "F" }
                },
                "Day": { "HasPrecipitation": false, "LongPhrase": "Sunny" },
                "Night": { "HasPrecipitation": false, "LongPhrase": "Clear" }
            },
            {
                "Date": "2026-08-07T07:00:00-03:00",
                "EpochDate": 1786096800,
                "Temperature": {
                    "Minimum": { "Value": 68.0, "Unit": "F" },
                    "Maximum": { "Value": 86.0, "Unit": "F" }
                },
                "RealFeelTemperature": {
                    "Minimum": { "Value": 70.0, "Unit": "F" },
                    "Maximum": { "Value": 90.0, "Unit": "F" }
                },
                "Day": {
                    "HasPrecipitation": true,
                    "LongPhrase": "Cloudy with a shower in spots",
                    "PrecipitationProbability": 55,
                    "ThunderstormProbability": 20,
                    "Wind": {
                        "Speed": { "Value": 10.0, "Unit": "mi/h" },
                        "Direction": { "Degrees": 90, "English": "E" }
                    }
                },
                "Night": {
                    "HasPrecipitation": false,
                    "LongPhrase": "Partly cloudy",
                    "PrecipitationProbability": 10,
                    "ThunderstormProbability": 2,
                    "Wind": {
                        "Speed": { "Value": 6.2, "Unit": "mi/h" },
                        "Direction": { "Degrees": 120, "English": "ESE" }
                    }
                },
                "Sun": { "Rise": "2026-08-07T06:05:00-03:00", "Set": "2026-08-07T17:32:00-03:00" },
                "Moon": { "Rise": "2026-08-07T01:10:00-03:00", "Set": "2026-08-07T13:40:00-03:00", "Phase": "WaningCrescent", "Age": 24 }
            }
        ]
    }"#;

    fn fixture() -> AccuDailyResponse {
        serde_json::from_str(FIXTURE).unwrap()
    }

    #[test]
    fn test_normalize_picks_matching_weekday() {
        let record = AccuWeatherClient::normalize(&fixture(), TargetDay::Friday).unwrap();
        assert_eq!(record.source, ForecastSource::AccuWeather);
        assert_eq!(record.timestamp.day(), 7);
        assert_eq!(record.description, "Cloudy with a shower in spots");
    }

    #[test]
    fn test_normalize_converts_imperial_units() {
        let record = AccuWeatherClient::normalize(&fixture(), TargetDay::Friday).unwrap();
        let daily = record.daily.as_ref().unwrap();

        // 68°F → 20°C, 86°F → 30°C
        assert_eq!(daily.temperature_min_c, 20.0);
        assert_eq!(daily.temperature_max_c, 30.0);
        // 70°F → 21°C, 90°F → 32°C
        assert_eq!(daily.real_feel_min_c, 21.0);
        assert_eq!(daily.real_feel_max_c, 32.0);
        // 10 mph → 16 km/h, 6.2 mph → 10 km/h
        assert_eq!(daily.day.wind_speed_kmh, 16.0);
        assert_eq!(daily.night.wind_speed_kmh, 10.0);

        assert_eq!(record.temperature_c, Some(30.0));
        assert_eq!(record.wind_speed_kmh, Some(16.0));
    }

    #[test]
    fn test_normalize_day_period_detail() {
        let record = AccuWeatherClient::normalize(&fixture(), TargetDay::Friday).unwrap();
        let daily = record.daily.as_ref().unwrap();

        assert!(daily.day.has_precipitation);
        assert_eq!(daily.day.precipitation_probability_pct, 55.0);
        assert_eq!(daily.day.thunderstorm_probability_pct, 20.0);
        assert_eq!(daily.day.wind_direction, "E");
        assert_eq!(daily.night.phrase, "Partly cloudy");
        assert_eq!(record.rain_probability_pct, Some(55.0));
    }

    #[test]
    fn test_normalize_sun_and_moon() {
        let record = AccuWeatherClient::normalize(&fixture(), TargetDay::Friday).unwrap();
        let daily = record.daily.as_ref().unwrap();

        assert_eq!(daily.sunrise.unwrap().format("%H:%M").to_string(), "06:05");
        assert_eq!(daily.sunset.unwrap().format("%H:%M").to_string(), "17:32");
        assert_eq!(daily.moon_phase.as_deref(), Some("WaningCrescent"));
    }

    #[test]
    fn test_normalize_missing_optional_blocks() {
        // The Thursday entry has no RealFeel/Sun/Moon/Wind blocks
        let record = AccuWeatherClient::normalize(&fixture(), TargetDay::Saturday);
        assert!(record.is_none(), "no Saturday in the payload");

        let payload: AccuDailyResponse = serde_json::from_str(
            r#"{ "DailyForecasts": [ {
                "Date": "2026-08-07T07:00:00-03:00",
                "Temperature": {
                    "Minimum": { "Value": 60.0 },
                    "Maximum": { "Value": 75.0 }
                },
                "Day": { "LongPhrase": "Breezy" },
                "Night": {}
            } ] }"#,
        )
        .unwrap();
        let record = AccuWeatherClient::normalize(&payload, TargetDay::Friday).unwrap();
        let daily = record.daily.as_ref().unwrap();
        // Real-feel falls back to the plain range when absent
        assert_eq!(daily.real_feel_max_c, daily.temperature_max_c);
        assert_eq!(daily.day.wind_speed_kmh, 0.0);
        assert!(daily.sunrise.is_none());
        assert!(daily.moon_phase.is_none());
    }

    #[test]
    fn test_normalize_is_pure() {
        let payload = fixture();
        let a = AccuWeatherClient::normalize(&payload, TargetDay::Friday);
        let b = AccuWeatherClient::normalize(&payload, TargetDay::Friday);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_payload_is_absent() {
        let payload: AccuDailyResponse =
            serde_json::from_str(r#"{ "DailyForecasts": [] }"#).unwrap();
        assert!(AccuWeatherClient::normalize(&payload, TargetDay::Friday).is_none());
    }
}
