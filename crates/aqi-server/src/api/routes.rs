//! REST API routes.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use aqi_core::{ForecastPoint, HistoryRecord, InterpolatedPoint, PollutantProfile, RoutePoint};

use crate::api::error::ApiError;
use crate::pipeline;
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/v1/analyze-routes", post(analyze_routes))
        .route("/v1/history-data-all", post(history_data_all))
        .route("/v1/predict-all-stations", post(predict_all_stations))
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct RouteData {
    /// Echoed back unchanged; callers send display strings such as "12.4 km".
    #[serde(default)]
    pub distance: Value,
    #[serde(default)]
    pub duration: Value,
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRoutesRequest {
    pub start_loc: Vec<f64>,
    pub end_loc: Vec<f64>,
    #[serde(default, rename = "routeCount")]
    pub route_count: Option<usize>,
    #[serde(default)]
    pub routes: Vec<RouteData>,
}

#[derive(Debug, Serialize)]
pub struct GroundTruth {
    pub start_point: PollutantProfile,
    pub end_point: PollutantProfile,
}

#[derive(Debug, Serialize)]
pub struct RouteSummary {
    pub distance: Value,
    pub duration: Value,
    pub avg_aqi: f64,
    pub avg_pm25: f64,
    pub avg_pm10: f64,
    pub avg_co: f64,
    pub details: Vec<InterpolatedPoint>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeRoutesResponse {
    pub status: &'static str,
    pub ground_truth: GroundTruth,
    /// `Route_1..Route_n` in request order.
    #[serde(serialize_with = "ordered_map")]
    pub route_analysis: Vec<(String, RouteSummary)>,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "sLat")]
    pub s_lat: f64,
    #[serde(rename = "sLon")]
    pub s_lon: f64,
    #[serde(rename = "dLat")]
    pub d_lat: f64,
    #[serde(rename = "dLon")]
    pub d_lon: f64,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub status: &'static str,
    pub forecast_data: BTreeMap<&'static str, Vec<ForecastPoint>>,
    pub route_forecast: Vec<ForecastPoint>,
    pub start_station: &'static str,
    pub end_station: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StationHistoryEntry {
    Fetched {
        location: RoutePoint,
        history_count: usize,
        data: Vec<HistoryRecord>,
    },
    Failed {
        error: String,
    },
}

fn ordered_map<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    serializer.collect_map(entries.iter().map(|(key, value)| (key, value)))
}

// === Validation ===

fn validate_point(lat: f64, lon: f64, field: &str) -> Result<RoutePoint, ApiError> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(ApiError::invalid(format!("{field} must be finite")));
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(ApiError::invalid(format!("{field} is out of range")));
    }
    Ok(RoutePoint::new(lat, lon))
}

fn validate_pair(pair: &[f64], field: &str) -> Result<RoutePoint, ApiError> {
    match pair {
        [lat, lon] => validate_point(*lat, *lon, field),
        _ => Err(ApiError::invalid(format!(
            "{field} must be [lat, lon], got {} values",
            pair.len()
        ))),
    }
}

// === Handlers ===

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "online",
        "timestamp": Utc::now().to_rfc3339(),
        "model_loaded": state.forecaster.is_ready(),
    }))
}

async fn analyze_routes(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRoutesRequest>, JsonRejection>,
) -> Result<Json<AnalyzeRoutesResponse>, ApiError> {
    let Json(request) = payload?;
    let start = validate_pair(&request.start_loc, "start_loc")?;
    let end = validate_pair(&request.end_loc, "end_loc")?;

    if let Some(count) = request.route_count {
        if count != request.routes.len() {
            tracing::debug!(count, routes = request.routes.len(), "routeCount disagrees with routes");
        }
    }

    let routes = request
        .routes
        .iter()
        .enumerate()
        .map(|(i, route)| {
            route
                .coordinates
                .iter()
                .map(|c| validate_point(c.lat, c.lng, &format!("routes[{i}].coordinates")))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let analysis = pipeline::analyze_routes(state.profiles.as_ref(), start, end, &routes).await?;

    let route_analysis = request
        .routes
        .into_iter()
        .zip(analysis.routes)
        .enumerate()
        .map(|(i, (route, analyzed))| {
            (
                format!("Route_{}", i + 1),
                RouteSummary {
                    distance: route.distance,
                    duration: route.duration,
                    avg_aqi: analyzed.exposure.avg_aqi,
                    avg_pm25: analyzed.exposure.avg_pm25,
                    avg_pm10: analyzed.exposure.avg_pm10,
                    avg_co: analyzed.exposure.avg_co,
                    details: analyzed.details,
                },
            )
        })
        .collect();

    Ok(Json(AnalyzeRoutesResponse {
        status: "success",
        ground_truth: GroundTruth {
            start_point: analysis.start,
            end_point: analysis.end,
        },
        route_analysis,
    }))
}

async fn history_data_all(State(state): State<AppState>) -> Json<Value> {
    let stations = state.stations();
    let histories = pipeline::fetch_all_histories(state.history.as_ref(), stations).await;

    let data: BTreeMap<&'static str, StationHistoryEntry> = stations
        .stations()
        .iter()
        .zip(histories)
        .map(|(station, history)| {
            let entry = match history.outcome {
                Ok(records) => StationHistoryEntry::Fetched {
                    location: RoutePoint::new(station.lat, station.lon),
                    history_count: records.len(),
                    data: records,
                },
                Err(err) => StationHistoryEntry::Failed {
                    error: err.to_string(),
                },
            };
            (station.id, entry)
        })
        .collect();

    Json(json!({
        "status": "success",
        "data": data,
    }))
}

async fn predict_all_stations(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let start = validate_point(request.s_lat, request.s_lon, "sLat/sLon")?;
    let end = validate_point(request.d_lat, request.d_lon, "dLat/dLon")?;

    let report = pipeline::predict_route(&state, start, end).await?;

    Ok(Json(PredictResponse {
        status: "success",
        forecast_data: report.stations.into_iter().collect(),
        route_forecast: report.route_forecast,
        start_station: report.start_station,
        end_station: report.end_station,
    }))
}
