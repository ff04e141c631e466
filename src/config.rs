//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`. A missing key is a
//! recoverable per-provider failure at fetch time, never a startup
//! failure.

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub location: LocationConfig,
    pub providers: ProvidersConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// The single fixed site all forecasts are for.
#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name, passed to providers that localise timestamps.
    pub timezone: String,
    /// Fixed UTC offset of the site. Bahia dropped DST in 2019, so a
    /// constant offset is exact.
    pub utc_offset_hours: i32,
    /// AccuWeather's opaque key for this location.
    pub accuweather_location_key: String,
    /// Language tag sent to providers that support localisation.
    pub locale: String,
}

impl LocationConfig {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .expect("utc_offset_hours out of range")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    pub accuweather: KeyedProviderConfig,
    pub open_meteo: ProviderConfig,
    pub openweather: KeyedProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeyedProviderConfig {
    pub enabled: bool,
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        port = 3000

        [location]
        latitude = -13.008085569770852
        longitude = -38.51330742515813
        timezone = "America/Bahia"
        utc_offset_hours = -3
        accuweather_location_key = "43080"
        locale = "pt-br"

        [providers.accuweather]
        enabled = true
        api_key_env = "ACCUWEATHER_API_KEY"

        [providers.open_meteo]
        enabled = true

        [providers.openweather]
        enabled = false
        api_key_env = "OPENWEATHER_API_KEY"

        [http]
        timeout_secs = 15
    "#;

    #[test]
    fn test_parse_sample_config() {
        let cfg: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.location.accuweather_location_key, "43080");
        assert!(cfg.providers.accuweather.enabled);
        assert!(!cfg.providers.openweather.enabled);
        assert_eq!(cfg.providers.openweather.api_key_env, "OPENWEATHER_API_KEY");
        assert_eq!(cfg.http.timeout_secs, 15);
    }

    #[test]
    fn test_offset_is_west_of_utc() {
        let cfg: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.location.offset().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = AppConfig::load("does-not-exist.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_repo_config_parses() {
        // Keeps config.toml in the repository root honest.
        if let Ok(cfg) = AppConfig::load("config.toml") {
            assert_eq!(cfg.location.timezone, "America/Bahia");
            assert!(cfg.location.latitude < 0.0);
        }
    }
}
