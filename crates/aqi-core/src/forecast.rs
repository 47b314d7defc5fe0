//! Batched multi-station AQI forecasting.
//!
//! One 24-hour history window is aligned into a feature matrix, scaled once,
//! copied once per station and sent through the sequence model in a single
//! batched call with each copy's station index as a side input.

use std::fmt;
use std::sync::Arc;

use nalgebra::DMatrix;
use serde::Serialize;

use crate::error::{AqiError, ModelError, Result};
use crate::models::{round2, HistoryRecord, OBSERVED_FEATURES};
use crate::stations::StationDirectory;

/// History records consumed per forecast.
pub const HISTORY_WINDOW: usize = 24;
/// Plausible AQI range; model outputs are clipped into it.
pub const AQI_MIN: f64 = 0.0;
pub const AQI_MAX: f64 = 500.0;

/// Pre-fitted feature transform applied before inference.
pub trait FeatureScaler: Send + Sync {
    /// Transform a `timesteps x features` matrix. Must not refit.
    fn transform(&self, features: &DMatrix<f64>) -> std::result::Result<DMatrix<f64>, ModelError>;
}

/// Pretrained sequence model producing a forecast per (sequence, station) pair.
pub trait SequenceModel: Send + Sync {
    /// Timesteps per input sequence.
    fn timesteps(&self) -> usize;
    /// Features per timestep.
    fn input_width(&self) -> usize;
    /// Forecast steps per output row.
    fn horizon(&self) -> usize;
    /// Run one batched forward pass; returns one row per batch entry.
    fn predict(
        &self,
        sequences: &[DMatrix<f64>],
        station_indices: &[usize],
    ) -> std::result::Result<Vec<Vec<f64>>, ModelError>;
}

/// Loaded scaler and model pair, shared read-only across requests.
#[derive(Clone)]
pub struct ForecastModel {
    pub scaler: Arc<dyn FeatureScaler>,
    pub model: Arc<dyn SequenceModel>,
}

impl fmt::Debug for ForecastModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastModel")
            .field("timesteps", &self.model.timesteps())
            .field("input_width", &self.model.input_width())
            .field("horizon", &self.model.horizon())
            .finish_non_exhaustive()
    }
}

/// AQI sequence for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSeries {
    pub station_id: &'static str,
    pub aqi: Vec<f64>,
}

/// Forecasts for every station, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationForecastSet {
    pub series: Vec<StationSeries>,
}

impl StationForecastSet {
    pub fn get(&self, station_id: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|series| series.station_id == station_id)
            .map(|series| series.aqi.as_slice())
    }

    /// Forecast length shared by every station.
    pub fn horizon(&self) -> usize {
        self.series.first().map(|series| series.aqi.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Forecaster for every station in the directory.
///
/// Built either with a loaded model or with the reason loading failed; the
/// latter reports `ModelUnavailable` on every call.
#[derive(Debug, Clone)]
pub struct MultiStationForecaster {
    stations: StationDirectory,
    model: std::result::Result<ForecastModel, String>,
}

impl MultiStationForecaster {
    pub fn new(stations: StationDirectory, model: ForecastModel) -> Self {
        Self {
            stations,
            model: Ok(model),
        }
    }

    pub fn unavailable(stations: StationDirectory, reason: impl Into<String>) -> Self {
        Self {
            stations,
            model: Err(reason.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_ok()
    }

    /// Fail with `ModelUnavailable` when artifacts were not loaded.
    pub fn ensure_ready(&self) -> Result<&ForecastModel> {
        self.model
            .as_ref()
            .map_err(|reason| AqiError::ModelUnavailable(reason.clone()))
    }

    pub fn stations(&self) -> StationDirectory {
        self.stations
    }

    /// Forecast AQI for every station from one history window.
    ///
    /// `history` must be oldest first; only the first `HISTORY_WINDOW`
    /// records are used.
    pub fn forecast(&self, history: &[HistoryRecord]) -> Result<StationForecastSet> {
        let loaded = self.ensure_ready()?;

        if history.len() < HISTORY_WINDOW {
            return Err(AqiError::InsufficientData {
                required: HISTORY_WINDOW,
                available: history.len(),
            });
        }

        let model = loaded.model.as_ref();
        if model.timesteps() != HISTORY_WINDOW {
            return Err(ModelError::shape(
                format!("{HISTORY_WINDOW} timesteps"),
                format!("{} timesteps", model.timesteps()),
            )
            .into());
        }

        let features = align_features(&history[..HISTORY_WINDOW], model.input_width())?;
        let scaled = loaded.scaler.transform(&features)?;
        if scaled.shape() != features.shape() {
            return Err(ModelError::shape(
                format!("{:?}", features.shape()),
                format!("{:?}", scaled.shape()),
            )
            .into());
        }

        let station_count = self.stations.len();
        let batch = vec![scaled; station_count];
        let station_indices: Vec<usize> = (0..station_count).collect();
        let raw = model.predict(&batch, &station_indices)?;

        if raw.len() != station_count {
            return Err(ModelError::shape(
                format!("{station_count} forecast rows"),
                format!("{} rows", raw.len()),
            )
            .into());
        }

        let horizon = model.horizon();
        let mut series = Vec::with_capacity(station_count);
        for (station, row) in self.stations.stations().iter().zip(raw) {
            if row.len() != horizon {
                return Err(ModelError::shape(
                    format!("{horizon} steps"),
                    format!("{} steps for {}", row.len(), station.id),
                )
                .into());
            }
            if row.iter().any(|value| !value.is_finite()) {
                return Err(ModelError::NonFinite("model output").into());
            }
            series.push(StationSeries {
                station_id: station.id,
                aqi: row
                    .into_iter()
                    .map(|value| round2(value.clamp(AQI_MIN, AQI_MAX)))
                    .collect(),
            });
        }

        tracing::debug!(stations = series.len(), horizon, "multi-station forecast complete");
        Ok(StationForecastSet { series })
    }
}

/// Build the `records x width` feature matrix.
///
/// Observed values fill the leading columns in canonical order; the remaining
/// columns are the model's reserved slots and stay zero.
pub fn align_features(
    records: &[HistoryRecord],
    width: usize,
) -> std::result::Result<DMatrix<f64>, ModelError> {
    if width < OBSERVED_FEATURES {
        return Err(ModelError::shape(
            format!("at least {OBSERVED_FEATURES} features"),
            format!("{width} features"),
        ));
    }

    let mut matrix = DMatrix::<f64>::zeros(records.len(), width);
    for (row, record) in records.iter().enumerate() {
        for (col, value) in record.observed_features().into_iter().enumerate() {
            matrix[(row, col)] = value;
        }
    }
    Ok(matrix)
}
