//! Core data models for the AQI engine.

use serde::{Deserialize, Serialize};

use crate::health::HealthInfo;

/// Point-in-time pollutant snapshot at a location.
///
/// Every pollutant field defaults to 0 when the upstream provider omits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PollutantProfile {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub aqi: f64,
    #[serde(default)]
    pub pm25: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub co: f64,
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub o3: f64,
}

impl PollutantProfile {
    /// Create an all-zero profile at a location.
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Default::default()
        }
    }

    /// Value of one of the interpolated pollutant fields.
    pub fn field(&self, field: PollutantField) -> f64 {
        match field {
            PollutantField::Aqi => self.aqi,
            PollutantField::Pm25 => self.pm25,
            PollutantField::Pm10 => self.pm10,
            PollutantField::Co => self.co,
            PollutantField::No2 => self.no2,
            PollutantField::O3 => self.o3,
        }
    }
}

/// Pollutant fields estimated along a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollutantField {
    Aqi,
    Pm25,
    Pm10,
    Co,
    No2,
    O3,
}

impl PollutantField {
    pub const ALL: [PollutantField; 6] = [
        PollutantField::Aqi,
        PollutantField::Pm25,
        PollutantField::Pm10,
        PollutantField::Co,
        PollutantField::No2,
        PollutantField::O3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PollutantField::Aqi => "aqi",
            PollutantField::Pm25 => "pm25",
            PollutantField::Pm10 => "pm10",
            PollutantField::Co => "co",
            PollutantField::No2 => "no2",
            PollutantField::O3 => "o3",
        }
    }
}

/// One coordinate along a route polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
}

impl RoutePoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Interpolated pollutant estimate at one route point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedPoint {
    #[serde(flatten)]
    pub location: RoutePoint,
    pub aqi: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
}

impl InterpolatedPoint {
    pub(crate) fn empty(location: RoutePoint) -> Self {
        Self {
            location,
            aqi: 0.0,
            pm25: 0.0,
            pm10: 0.0,
            co: 0.0,
            no2: 0.0,
            o3: 0.0,
        }
    }

    pub fn field(&self, field: PollutantField) -> f64 {
        match field {
            PollutantField::Aqi => self.aqi,
            PollutantField::Pm25 => self.pm25,
            PollutantField::Pm10 => self.pm10,
            PollutantField::Co => self.co,
            PollutantField::No2 => self.no2,
            PollutantField::O3 => self.o3,
        }
    }

    pub(crate) fn set_field(&mut self, field: PollutantField, value: f64) {
        match field {
            PollutantField::Aqi => self.aqi = value,
            PollutantField::Pm25 => self.pm25 = value,
            PollutantField::Pm10 => self.pm10 = value,
            PollutantField::Co => self.co = value,
            PollutantField::No2 => self.no2 = value,
            PollutantField::O3 => self.o3 = value,
        }
    }
}

/// Interpolated profile for a whole route, one entry per input point.
pub type RouteProfile = Vec<InterpolatedPoint>;

/// One hour of combined pollutant and weather observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default)]
    pub pm2_5: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub co: f64,
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub o3: f64,
    #[serde(default)]
    pub temp_c: f64,
    #[serde(default)]
    pub wind: f64,
    #[serde(default)]
    pub humidity: f64,
}

impl HistoryRecord {
    /// Observed values in model feature order (pollutants, then weather).
    pub fn observed_features(&self) -> [f64; OBSERVED_FEATURES] {
        [
            self.pm2_5,
            self.pm10,
            self.no2,
            self.co,
            self.so2,
            self.o3,
            self.temp_c,
            self.wind,
            self.humidity,
        ]
    }
}

/// Number of observed values per history record fed to the model.
pub const OBSERVED_FEATURES: usize = 9;

/// Hourly AQI history row as returned by the air-quality provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AqiHistoryHour {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub aqi: f64,
    #[serde(default)]
    pub pm25: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub co: f64,
    #[serde(default)]
    pub so2: f64,
    #[serde(default)]
    pub o3: f64,
}

/// Hourly weather history row as returned by the weather provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherHour {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub temp_c: f64,
    #[serde(default)]
    pub wind: f64,
    #[serde(default)]
    pub humidity: f64,
}

/// Merge weather and AQI rows pairwise into history records.
///
/// Rows are paired by position; the result is as long as the shorter input
/// and takes its timestamp from the AQI row.
pub fn merge_history(weather: &[WeatherHour], aqi: &[AqiHistoryHour]) -> Vec<HistoryRecord> {
    weather
        .iter()
        .zip(aqi.iter())
        .map(|(w, a)| HistoryRecord {
            time: a.time.clone(),
            pm2_5: a.pm25,
            pm10: a.pm10,
            no2: a.no2,
            co: a.co,
            so2: a.so2,
            o3: a.o3,
            temp_c: w.temp_c,
            wind: w.wind,
            humidity: w.humidity,
        })
        .collect()
}

/// Forecast value for one horizon step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: String,
    pub aqi: f64,
    pub health_info: HealthInfo,
}

/// Forecast sequence for a single station.
pub type StationForecast = Vec<ForecastPoint>;

/// Blended forecast sequence for a route.
pub type RouteForecast = Vec<ForecastPoint>;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_pollutants_default_to_zero() {
        let profile: PollutantProfile =
            serde_json::from_str(r#"{"lat": 23.5, "lon": 87.3, "aqi": 120}"#).unwrap();
        assert_eq!(profile.aqi, 120.0);
        assert_eq!(profile.pm25, 0.0);
        assert_eq!(profile.so2, 0.0);
    }

    #[test]
    fn merge_history_truncates_to_shorter_input() {
        let weather = vec![
            WeatherHour { time: None, temp_c: 30.0, wind: 2.0, humidity: 60.0 },
            WeatherHour { time: None, temp_c: 31.0, wind: 2.5, humidity: 58.0 },
        ];
        let aqi = vec![AqiHistoryHour {
            time: Some("2025-01-01T00:00:00Z".to_string()),
            pm25: 55.0,
            ..Default::default()
        }];

        let merged = merge_history(&weather, &aqi);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].pm2_5, 55.0);
        assert_eq!(merged[0].temp_c, 30.0);
        assert_eq!(merged[0].time.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn observed_features_follow_model_order() {
        let record = HistoryRecord {
            pm2_5: 1.0,
            pm10: 2.0,
            no2: 3.0,
            co: 4.0,
            so2: 5.0,
            o3: 6.0,
            temp_c: 7.0,
            wind: 8.0,
            humidity: 9.0,
            ..Default::default()
        };
        assert_eq!(
            record.observed_features(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(12.346), 12.35);
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(0.004), 0.0);
    }
}
