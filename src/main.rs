//! CEEFGuru — weekend weather aggregation service
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires the enabled provider adapters into the aggregator, and runs
//! the web server until shutdown.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use ceefguru::aggregator::ForecastAggregator;
use ceefguru::config::AppConfig;
use ceefguru::logbuf::LogBuffer;
use ceefguru::providers::accuweather::AccuWeatherClient;
use ceefguru::providers::open_meteo::OpenMeteoClient;
use ceefguru::providers::openweather::OpenWeatherClient;
use ceefguru::providers::ForecastProvider;
use ceefguru::server::{self, ServiceState};

const BANNER: &str = r#"
   ____ _____ _____ _____ ____
  / ___| ____| ____|  ___/ ___|_   _ _ __ _   _
 | |   |  _| |  _| | |_ | |  _| | | | '__| | | |
 | |___| |___| |___|  _|| |_| | |_| | |  | |_| |
  \____|_____|_____|_|   \____|\__,_|_|   \__,_|

  Friday/Saturday forecasts for the CEEF field
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        port = cfg.server.port,
        latitude = cfg.location.latitude,
        longitude = cfg.location.longitude,
        "CEEFGuru starting up"
    );

    let timeout = Duration::from_secs(cfg.http.timeout_secs);

    // -- Provider adapters -------------------------------------------------
    //
    // A disabled provider is simply absent from the aggregation. A missing
    // API key is NOT checked here: the adapter surfaces it per request so
    // the service still serves whatever the other providers return.

    let accuweather: Option<Box<dyn ForecastProvider>> = if cfg.providers.accuweather.enabled {
        Some(Box::new(AccuWeatherClient::new(
            &cfg.location,
            &cfg.providers.accuweather.api_key_env,
            timeout,
        )?))
    } else {
        warn!("AccuWeather provider disabled in config");
        None
    };

    let open_meteo: Option<Box<dyn ForecastProvider>> = if cfg.providers.open_meteo.enabled {
        Some(Box::new(OpenMeteoClient::new(&cfg.location, timeout)?))
    } else {
        warn!("Open-Meteo provider disabled in config");
        None
    };

    let openweather: Option<Box<dyn ForecastProvider>> = if cfg.providers.openweather.enabled {
        Some(Box::new(OpenWeatherClient::new(
            &cfg.location,
            &cfg.providers.openweather.api_key_env,
            timeout,
        )?))
    } else {
        warn!("OpenWeather provider disabled in config");
        None
    };

    // -- Shared state ------------------------------------------------------

    let log = LogBuffer::default();
    let aggregator = ForecastAggregator::new(accuweather, open_meteo, openweather, log.clone());
    let state = Arc::new(ServiceState { aggregator, log });

    server::serve(state, cfg.server.port).await?;

    info!("CEEFGuru shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ceefguru=info"));

    let json_logging = std::env::var("CEEFGURU_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
