//! Request pipelines: upstream fan-out, then the core algorithms.

use futures::future::join_all;

use aqi_core::{
    forecast_route, interpolate, merge_history, select_base_window, summarize, AqiError,
    HistoryRecord, PollutantProfile, RouteExposure, RouteForecastReport, RoutePoint, RouteProfile,
    Station, StationDirectory, StationHistory,
};

use crate::providers::{HistoryProvider, ProfileProvider};
use crate::state::AppState;

/// Weather and AQI history for one station, fetched concurrently and merged.
pub async fn fetch_station_history(
    provider: &dyn HistoryProvider,
    station: &Station,
) -> Result<Vec<HistoryRecord>, AqiError> {
    let (weather, aqi) = tokio::join!(
        provider.fetch_weather_history(station.lat, station.lon),
        provider.fetch_aqi_history(station.lat, station.lon)
    );

    match (weather, aqi) {
        (Ok(weather), Ok(aqi)) => {
            let merged = merge_history(&weather, &aqi);
            tracing::debug!(station = station.id, records = merged.len(), "station history merged");
            Ok(merged)
        }
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!(station = station.id, "history fetch failed: {}", err);
            Err(err.into())
        }
    }
}

/// Fetch history for every station concurrently; results keep registry order.
pub async fn fetch_all_histories(
    provider: &dyn HistoryProvider,
    stations: StationDirectory,
) -> Vec<StationHistory> {
    join_all(stations.stations().iter().map(|station| async move {
        StationHistory {
            station_id: station.id,
            outcome: fetch_station_history(provider, station).await,
        }
    }))
    .await
}

/// Forecast every station and blend the route between `start` and `end`.
pub async fn predict_route(
    state: &AppState,
    start: RoutePoint,
    end: RoutePoint,
) -> Result<RouteForecastReport, AqiError> {
    state.forecaster.ensure_ready()?;

    let histories = fetch_all_histories(state.history.as_ref(), state.stations()).await;
    let window = select_base_window(&histories)?;

    forecast_route(&state.forecaster, window, start, end, state.local_offset)
}

/// Interpolated profile and averages for one candidate route.
#[derive(Debug, Clone)]
pub struct AnalyzedRoute {
    pub exposure: RouteExposure,
    pub details: RouteProfile,
}

/// Endpoint snapshots plus one analysis per route, in request order.
#[derive(Debug, Clone)]
pub struct RouteAnalysis {
    pub start: PollutantProfile,
    pub end: PollutantProfile,
    pub routes: Vec<AnalyzedRoute>,
}

/// Fetch both endpoint snapshots concurrently, then krige every route.
pub async fn analyze_routes(
    provider: &dyn ProfileProvider,
    start: RoutePoint,
    end: RoutePoint,
    routes: &[Vec<RoutePoint>],
) -> Result<RouteAnalysis, AqiError> {
    let (start_profile, end_profile) = tokio::join!(
        provider.fetch_profile(start.lat, start.lon),
        provider.fetch_profile(end.lat, end.lon)
    );
    let start_profile = start_profile.map_err(|err| {
        tracing::warn!("start endpoint fetch failed: {}", err);
        AqiError::from(err)
    })?;
    let end_profile = end_profile.map_err(|err| {
        tracing::warn!("end endpoint fetch failed: {}", err);
        AqiError::from(err)
    })?;

    let routes = routes
        .iter()
        .map(|points| {
            let details = interpolate(&start_profile, &end_profile, points);
            AnalyzedRoute {
                exposure: summarize(&details),
                details,
            }
        })
        .collect::<Vec<_>>();

    tracing::info!(routes = routes.len(), "route analysis complete");
    Ok(RouteAnalysis {
        start: start_profile,
        end: end_profile,
        routes,
    })
}
