//! Server configuration from environment.

use std::env;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub google_api_key: String,
    pub air_quality_url: String,
    pub weather_url: String,
    pub upstream_timeout_s: u64,
    pub model_path: String,
    pub scaler_path: String,
    /// Offset applied to forecast time labels, in minutes east of UTC.
    pub local_offset_minutes: i32,
    pub history_hours: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            google_api_key: String::new(),
            air_quality_url: "https://airquality.googleapis.com/v1".to_string(),
            weather_url: "https://weather.googleapis.com/v1".to_string(),
            upstream_timeout_s: 5,
            model_path: "models/aqi_model.json".to_string(),
            scaler_path: "models/scaler_x.json".to_string(),
            local_offset_minutes: 330,
            history_hours: 24,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parsed("AQI_PORT").unwrap_or(defaults.server_port),
            google_api_key: env::var("GOOGLE_API_KEY").unwrap_or(defaults.google_api_key),
            air_quality_url: env::var("AQI_AIR_QUALITY_URL").unwrap_or(defaults.air_quality_url),
            weather_url: env::var("AQI_WEATHER_URL").unwrap_or(defaults.weather_url),
            upstream_timeout_s: parsed("AQI_UPSTREAM_TIMEOUT_S").unwrap_or(defaults.upstream_timeout_s),
            model_path: env::var("AQI_MODEL_PATH").unwrap_or(defaults.model_path),
            scaler_path: env::var("AQI_SCALER_PATH").unwrap_or(defaults.scaler_path),
            local_offset_minutes: parsed("AQI_LOCAL_OFFSET_MINUTES")
                .unwrap_or(defaults.local_offset_minutes),
            history_hours: parsed("AQI_HISTORY_HOURS").unwrap_or(defaults.history_hours),
        }
    }

    /// Label offset; out-of-range values fall back to UTC.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.local_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = Config::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.upstream_timeout_s, 5);
        assert_eq!(config.history_hours, 24);
        assert_eq!(config.local_offset().local_minus_utc(), 330 * 60);
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let config = Config {
            local_offset_minutes: 100 * 60,
            ..Config::default()
        };
        assert_eq!(config.local_offset().local_minus_utc(), 0);
    }

    #[test]
    fn unparseable_values_are_ignored() {
        std::env::set_var("AQI_TEST_PARSED_PORT", "not-a-port");
        assert_eq!(parsed::<u16>("AQI_TEST_PARSED_PORT"), None);
        std::env::set_var("AQI_TEST_PARSED_PORT", " 9100 ");
        assert_eq!(parsed::<u16>("AQI_TEST_PARSED_PORT"), Some(9100));
        std::env::remove_var("AQI_TEST_PARSED_PORT");
    }
}
