use std::env;

use anyhow::Context;

use crate::models::SlotGrid;
use crate::repository::BackendMode;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub backend_mode: BackendMode,
    pub backend_url: String,
    pub backend_api_key: String,
    pub weather_url: String,
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub grid: SlotGrid,
    /// Serve a random grid when the backend cannot report availability.
    pub demo_availability: bool,
    /// Sessions older than this are dropped on the next lookup.
    pub session_ttl_hours: u32,
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn flag(key: &str, default: bool) -> anyhow::Result<bool> {
    match env::var(key) {
        Ok(raw) => parse_flag(&raw)
            .with_context(|| format!("{key} must be true or false, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "pitchbook.db".to_string(),
            backend_mode: BackendMode::Fixture,
            backend_url: String::new(),
            backend_api_key: String::new(),
            weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            default_latitude: 32.8811,
            default_longitude: -6.9063,
            grid: SlotGrid::default(),
            demo_availability: false,
            session_ttl_hours: 24 * 7,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let backend_mode = match env::var("BACKEND_MODE") {
            Ok(raw) => BackendMode::parse(&raw)
                .with_context(|| format!("BACKEND_MODE must be fixture or live, got {raw:?}"))?,
            Err(_) => defaults.backend_mode,
        };

        let grid = SlotGrid::new(
            parsed("AVAILABILITY_DAYS", defaults.grid.days),
            parsed("OPEN_HOUR", defaults.grid.open_hour),
            parsed("CLOSE_HOUR", defaults.grid.close_hour),
        )
        .context("invalid availability grid configuration")?;

        Ok(Self {
            port: parsed("PORT", defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            backend_mode,
            backend_url: env::var("BACKEND_URL").unwrap_or_default(),
            backend_api_key: env::var("BACKEND_API_KEY").unwrap_or_default(),
            weather_url: env::var("WEATHER_URL").unwrap_or(defaults.weather_url),
            default_latitude: parsed("DEFAULT_LATITUDE", defaults.default_latitude),
            default_longitude: parsed("DEFAULT_LONGITUDE", defaults.default_longitude),
            grid,
            demo_availability: flag("DEMO_AVAILABILITY", defaults.demo_availability)?,
            session_ttl_hours: parsed("SESSION_TTL_HOURS", defaults.session_ttl_hours),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.backend_mode, BackendMode::Fixture);
        assert_eq!(config.grid.hours().count(), 14);
        assert!(!config.demo_availability);
        assert_eq!(config.session_ttl_hours, 168);
    }

    #[test]
    fn test_flag_spellings() {
        for on in ["1", "true", "YES", " on "] {
            assert_eq!(parse_flag(on), Some(true), "{on}");
        }
        for off in ["0", "false", "No", "off", ""] {
            assert_eq!(parse_flag(off), Some(false), "{off}");
        }
        assert_eq!(parse_flag("maybe"), None);
    }
}
