//! Startup loading of the scaler and sequence model artifacts.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use serde::de::DeserializeOwned;

use aqi_core::{
    ForecastModel, LinearHeadArtifact, LinearSequenceHead, MultiStationForecaster, SequenceModel,
    StandardScaler, StationDirectory,
};

use crate::config::Config;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub fn load_scaler(path: &Path) -> Result<StandardScaler> {
    let scaler: StandardScaler = read_json(path)?;
    scaler
        .validated()
        .with_context(|| format!("invalid scaler {}", path.display()))
}

pub fn load_model(path: &Path) -> Result<LinearSequenceHead> {
    let artifact: LinearHeadArtifact = read_json(path)?;
    LinearSequenceHead::from_artifact(artifact)
        .with_context(|| format!("invalid model {}", path.display()))
}

/// Load both artifacts and check they agree with each other and the registry.
pub fn load_forecast_model(config: &Config, stations: StationDirectory) -> Result<ForecastModel> {
    let scaler = load_scaler(Path::new(&config.scaler_path))?;
    let model = load_model(Path::new(&config.model_path))?;

    ensure!(
        scaler.features() == model.input_width(),
        "scaler has {} features but model expects {}",
        scaler.features(),
        model.input_width()
    );
    ensure!(
        model.stations() >= stations.len(),
        "model knows {} stations but registry has {}",
        model.stations(),
        stations.len()
    );

    Ok(ForecastModel {
        scaler: Arc::new(scaler),
        model: Arc::new(model),
    })
}

/// Build the forecaster, degrading to an unavailable one on load failure.
pub fn load_forecaster(config: &Config) -> MultiStationForecaster {
    let stations = StationDirectory::default();
    match load_forecast_model(config, stations) {
        Ok(model) => {
            tracing::info!(
                model = %config.model_path,
                scaler = %config.scaler_path,
                "forecast model loaded"
            );
            MultiStationForecaster::new(stations, model)
        }
        Err(err) => {
            tracing::error!("forecast model unavailable: {:#}", err);
            MultiStationForecaster::unavailable(stations, format!("{err:#}"))
        }
    }
}
