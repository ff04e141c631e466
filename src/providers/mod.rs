//! Weather provider integrations.
//!
//! Defines the `ForecastProvider` trait and provides implementations for:
//! - AccuWeather — 5-day daily forecast, imperial wire units, richest detail
//! - Open-Meteo — hourly model forecast, no API key required
//! - OpenWeather — 5-day/3-hour stepped forecast
//!
//! All adapters normalise into the shared `ForecastRecord` shape and
//! contain their own failures behind `ProviderError`.

pub mod accuweather;
pub mod open_meteo;
pub mod openweather;

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

use crate::cache::CacheWindow;
use crate::error::ProviderError;
use crate::types::{ForecastRecord, ForecastSource, TargetDay};

/// Abstraction over upstream weather data sources.
///
/// `Ok(None)` means the provider had no entries for the target day: a
/// legitimate outcome distinct from every error variant, so callers can
/// tell "no opinion" apart from "failed". Implementations never return
/// `Ok(Some(vec![]))`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Which provider this adapter talks to.
    fn source(&self) -> ForecastSource;

    /// Fetch and normalise the forecast entries for `day`.
    async fn fetch_forecast(
        &self,
        day: TargetDay,
    ) -> Result<Option<Vec<ForecastRecord>>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Shared HTTP plumbing
// ---------------------------------------------------------------------------

const USER_AGENT: &str = "CEEFGuru/0.1.0";

/// Build the HTTP client every adapter uses. The timeout bounds a hung
/// provider so it cannot stall the aggregation join.
pub(crate) fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    use anyhow::Context;
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build provider HTTP client")
}

/// Send a GET carrying the cache window as a `Cache-Control` request
/// directive, and return the body of a successful response.
pub(crate) async fn execute(
    request: RequestBuilder,
    cache: CacheWindow,
) -> Result<String, ProviderError> {
    let response = request
        .header(CACHE_CONTROL, cache.max_age())
        .send()
        .await
        .map_err(ProviderError::from)?;

    let status = response.status();
    let body = response.text().await.map_err(ProviderError::from)?;

    if !status.is_success() {
        return Err(classify_status(status, body));
    }
    Ok(body)
}

/// Map a non-2xx upstream status onto the error taxonomy.
fn classify_status(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::InvalidCredential(status.as_u16())
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        other => ProviderError::Upstream {
            status: other.as_u16(),
            body: truncate_body(&body),
        },
    }
}

/// Keep error bodies loggable without dumping whole payloads.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let end = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
