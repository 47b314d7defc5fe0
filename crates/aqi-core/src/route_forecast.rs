//! Route forecast assembly: base window selection, batched forecast and blend.

use chrono::FixedOffset;
use serde::Serialize;

use crate::blend::{annotate, blend, forecast_labels};
use crate::error::{AqiError, ModelError, Result};
use crate::forecast::{MultiStationForecaster, HISTORY_WINDOW};
use crate::models::{HistoryRecord, RouteForecast, RoutePoint, StationForecast};
use crate::spatial::midpoint;

/// History fetch outcome for one station.
#[derive(Debug)]
pub struct StationHistory {
    pub station_id: &'static str,
    pub outcome: Result<Vec<HistoryRecord>>,
}

/// Forecast for every station plus the blended route forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteForecastReport {
    pub stations: Vec<(&'static str, StationForecast)>,
    pub route_forecast: RouteForecast,
    pub start_station: &'static str,
    pub end_station: &'static str,
}

/// Pick the history window that feeds the forecaster.
///
/// The first station, in the order given, whose fetch succeeded with at least
/// a full window wins. Errors distinguish "nothing fetched" from "fetched but
/// too short".
pub fn select_base_window(histories: &[StationHistory]) -> Result<&[HistoryRecord]> {
    let mut longest: Option<usize> = None;
    for history in histories {
        if let Ok(records) = &history.outcome {
            if records.len() >= HISTORY_WINDOW {
                tracing::debug!(station = history.station_id, "selected base history window");
                return Ok(records.as_slice());
            }
            longest = Some(longest.map_or(records.len(), |n| n.max(records.len())));
        }
    }

    match longest {
        Some(available) => Err(AqiError::InsufficientData {
            required: HISTORY_WINDOW,
            available,
        }),
        None => {
            let reason = histories
                .iter()
                .find_map(|history| history.outcome.as_ref().err())
                .map(|err| match err {
                    AqiError::UpstreamUnavailable(reason) => reason.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "no stations queried".to_string());
            Err(AqiError::UpstreamUnavailable(reason))
        }
    }
}

/// Forecast every station from `history` and blend the stations nearest to
/// `start` and `end` at the route midpoint.
pub fn forecast_route(
    forecaster: &MultiStationForecaster,
    history: &[HistoryRecord],
    start: RoutePoint,
    end: RoutePoint,
    local: FixedOffset,
) -> Result<RouteForecastReport> {
    let set = forecaster.forecast(history)?;
    // Labels follow the window the forecaster actually read.
    let window = &history[..HISTORY_WINDOW.min(history.len())];
    let labels = forecast_labels(window, local, set.horizon());

    let directory = forecaster.stations();
    let (start_station, end_station) = match (
        directory.nearest(start.lat, start.lon),
        directory.nearest(end.lat, end.lon),
    ) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(AqiError::ModelUnavailable("station registry is empty".to_string())),
    };

    let missing = |id: &str| ModelError::Other(format!("no forecast for {id}"));
    let start_values = set.get(start_station.id).ok_or_else(|| missing(start_station.id))?;
    let end_values = set.get(end_station.id).ok_or_else(|| missing(end_station.id))?;

    let route_forecast = blend(
        start_values,
        end_values,
        midpoint(start.lat, start.lon, end.lat, end.lon),
        (start_station.lat, start_station.lon),
        (end_station.lat, end_station.lon),
        &labels,
    );

    let stations = set
        .series
        .iter()
        .map(|series| (series.station_id, annotate(&series.aqi, &labels)))
        .collect();

    tracing::info!(
        start_station = start_station.id,
        end_station = end_station.id,
        steps = route_forecast.len(),
        "route forecast blended"
    );

    Ok(RouteForecastReport {
        stations,
        route_forecast,
        start_station: start_station.id,
        end_station: end_station.id,
    })
}
