pub mod artifacts;
pub mod blend;
pub mod error;
pub mod forecast;
pub mod health;
pub mod kriging;
pub mod models;
pub mod route_forecast;
pub mod spatial;
pub mod stations;
pub mod summary;

pub use artifacts::{LinearHeadArtifact, LinearSequenceHead, StandardScaler};
pub use blend::{annotate, blend, forecast_labels, weighted_average};
pub use error::{AqiError, ModelError, Result};
pub use forecast::{
    FeatureScaler, ForecastModel, MultiStationForecaster, SequenceModel, StationForecastSet,
    StationSeries, HISTORY_WINDOW,
};
pub use health::{classify, HealthCategory, HealthInfo};
pub use kriging::{interpolate, interpolate_with, GaussianVariogram};
pub use models::{
    merge_history, AqiHistoryHour, ForecastPoint, HistoryRecord, InterpolatedPoint,
    PollutantField, PollutantProfile, RouteForecast, RoutePoint, RouteProfile, StationForecast,
    WeatherHour,
};
pub use route_forecast::{forecast_route, select_base_window, RouteForecastReport, StationHistory};
pub use spatial::haversine_km;
pub use stations::{Station, StationDirectory, STATIONS};
pub use summary::{summarize, RouteExposure};
