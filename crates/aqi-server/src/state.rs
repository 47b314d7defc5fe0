//! Shared application state.

use std::sync::Arc;

use chrono::FixedOffset;

use aqi_core::{MultiStationForecaster, StationDirectory};

use crate::config::Config;
use crate::model_store;
use crate::providers::{GoogleEnvironmentClient, HistoryProvider, ProfileProvider};

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileProvider>,
    pub history: Arc<dyn HistoryProvider>,
    pub forecaster: MultiStationForecaster,
    pub local_offset: FixedOffset,
}

impl AppState {
    pub fn new(
        profiles: Arc<dyn ProfileProvider>,
        history: Arc<dyn HistoryProvider>,
        forecaster: MultiStationForecaster,
        local_offset: FixedOffset,
    ) -> Self {
        Self {
            profiles,
            history,
            forecaster,
            local_offset,
        }
    }

    /// Production wiring: Google providers and artifacts from `config`.
    pub fn from_config(config: &Config) -> Self {
        let google = Arc::new(GoogleEnvironmentClient::new(config));
        Self::new(
            google.clone(),
            google,
            model_store::load_forecaster(config),
            config.local_offset(),
        )
    }

    pub fn stations(&self) -> StationDirectory {
        self.forecaster.stations()
    }
}
