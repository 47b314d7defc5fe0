//! Upstream data providers.

pub mod google;

use async_trait::async_trait;
use thiserror::Error;

use aqi_core::{AqiError, AqiHistoryHour, PollutantProfile, WeatherHour};

pub use google::GoogleEnvironmentClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(reqwest::Error),

    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("malformed provider payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for ProviderError {
    /// The request URL carries the API key, so it never reaches the error text.
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.without_url())
    }
}

impl From<ProviderError> for AqiError {
    fn from(err: ProviderError) -> Self {
        AqiError::UpstreamUnavailable(err.to_string())
    }
}

/// Current pollutant snapshot at a coordinate.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    async fn fetch_profile(&self, lat: f64, lon: f64) -> Result<PollutantProfile, ProviderError>;
}

/// Hourly history at a coordinate, oldest first.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch_aqi_history(&self, lat: f64, lon: f64) -> Result<Vec<AqiHistoryHour>, ProviderError>;

    async fn fetch_weather_history(&self, lat: f64, lon: f64) -> Result<Vec<WeatherHour>, ProviderError>;
}
