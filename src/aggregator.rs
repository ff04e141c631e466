//! Multi-provider forecast aggregation.
//!
//! Fans one request out to every enabled provider concurrently, waits
//! for all of them to settle, and assembles the combined result. A
//! provider that fails (bad key, rate limit, timeout, garbage payload)
//! only empties its own slot; the others' data is always kept. Failures
//! are recorded to the shared log buffer for after-the-fact diagnosis.

use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::logbuf::{LogBuffer, LogLevel};
use crate::providers::ForecastProvider;
use crate::types::{AggregatedForecast, ForecastRecord, ForecastSource, TargetDay};

/// Unified entry point over the three provider adapters.
///
/// Pass `None` for any provider that is disabled in config.
pub struct ForecastAggregator {
    accuweather: Option<Box<dyn ForecastProvider>>,
    open_meteo: Option<Box<dyn ForecastProvider>>,
    openweather: Option<Box<dyn ForecastProvider>>,
    log: LogBuffer,
}

/// What one provider slot resolved to. Disabled providers never ran.
enum SlotOutcome {
    Disabled,
    Data(Vec<ForecastRecord>),
    NoData,
    Failed(ProviderError),
}

impl ForecastAggregator {
    pub fn new(
        accuweather: Option<Box<dyn ForecastProvider>>,
        open_meteo: Option<Box<dyn ForecastProvider>>,
        openweather: Option<Box<dyn ForecastProvider>>,
        log: LogBuffer,
    ) -> Self {
        Self {
            accuweather,
            open_meteo,
            openweather,
            log,
        }
    }

    /// Query all enabled providers for `day` and collect the outcomes.
    ///
    /// Never fails as a whole: total provider failure still yields a
    /// structurally valid all-absent result.
    pub async fn aggregate(&self, day: TargetDay) -> AggregatedForecast {
        debug!(day = %day, "Starting forecast aggregation");

        let (accuweather, open_meteo, openweather) = tokio::join!(
            Self::fetch_slot(&self.accuweather, day),
            Self::fetch_slot(&self.open_meteo, day),
            Self::fetch_slot(&self.openweather, day),
        );

        let accuweather = self
            .settle(ForecastSource::AccuWeather, day, accuweather)
            .await
            .and_then(|mut records| {
                // Daily provider: a single record per day
                if records.is_empty() { None } else { Some(records.remove(0)) }
            });
        let open_meteo = self.settle(ForecastSource::OpenMeteo, day, open_meteo).await;
        let openweather = self.settle(ForecastSource::OpenWeather, day, openweather).await;

        let result = AggregatedForecast {
            accuweather,
            open_meteo,
            openweather,
        };

        info!(
            day = %day,
            accuweather = result.accuweather.is_some(),
            open_meteo = result.open_meteo.is_some(),
            openweather = result.openweather.is_some(),
            "Forecast aggregation complete"
        );

        result
    }

    async fn fetch_slot(
        slot: &Option<Box<dyn ForecastProvider>>,
        day: TargetDay,
    ) -> SlotOutcome {
        match slot {
            None => SlotOutcome::Disabled,
            Some(provider) => match provider.fetch_forecast(day).await {
                Ok(Some(records)) => SlotOutcome::Data(records),
                Ok(None) => SlotOutcome::NoData,
                Err(err) => SlotOutcome::Failed(err),
            },
        }
    }

    /// Convert one slot's outcome into its result value, recording the
    /// outcome to the log buffer. Failure becomes absence, never an error.
    async fn settle(
        &self,
        source: ForecastSource,
        day: TargetDay,
        outcome: SlotOutcome,
    ) -> Option<Vec<ForecastRecord>> {
        match outcome {
            SlotOutcome::Disabled => None,
            SlotOutcome::Data(records) => {
                self.log
                    .record(
                        LogLevel::Success,
                        format!("[{source}] Forecast fetched"),
                        Some(json!({ "day": day.as_u8(), "entries": records.len() })),
                    )
                    .await;
                Some(records)
            }
            SlotOutcome::NoData => {
                self.log
                    .record(
                        LogLevel::Info,
                        format!("[{source}] No data for {day}"),
                        Some(json!({ "day": day.as_u8() })),
                    )
                    .await;
                None
            }
            SlotOutcome::Failed(err) => {
                warn!(provider = %source, day = %day, error = %err, "Provider fetch failed, continuing without");
                self.log
                    .record(
                        LogLevel::Error,
                        format!("[{source}] Fetch failed: {err}"),
                        Some(json!({ "day": day.as_u8(), "kind": err.kind() })),
                    )
                    .await;
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
