//! Google Air Quality and Weather API client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use aqi_core::{AqiHistoryHour, PollutantProfile, WeatherHour};

use super::{HistoryProvider, ProfileProvider, ProviderError};
use crate::config::Config;

const EXTRA_COMPUTATIONS: [&str; 2] = ["POLLUTANT_CONCENTRATION", "LOCAL_AQI"];

#[derive(Clone)]
pub struct GoogleEnvironmentClient {
    client: Client,
    api_key: String,
    air_quality_url: String,
    weather_url: String,
    history_hours: u32,
}

impl GoogleEnvironmentClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_s.max(1)))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: config.google_api_key.clone(),
            air_quality_url: config.air_quality_url.trim_end_matches('/').to_string(),
            weather_url: config.weather_url.trim_end_matches('/').to_string(),
            history_hours: config.history_hours.max(1),
        }
    }

    async fn post_air_quality<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .post(format!("{}/{}", self.air_quality_url, endpoint))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        response
            .json()
            .await
            .map_err(|err| ProviderError::Payload(err.without_url().to_string()))
    }
}

#[async_trait]
impl ProfileProvider for GoogleEnvironmentClient {
    async fn fetch_profile(&self, lat: f64, lon: f64) -> Result<PollutantProfile, ProviderError> {
        let body = json!({
            "location": { "latitude": lat, "longitude": lon },
            "universalAqi": false,
            "extraComputations": EXTRA_COMPUTATIONS,
            "languageCode": "en",
        });
        let conditions: ConditionsPayload = self
            .post_air_quality("currentConditions:lookup", body)
            .await?;
        Ok(conditions.into_profile(lat, lon))
    }
}

#[async_trait]
impl HistoryProvider for GoogleEnvironmentClient {
    async fn fetch_aqi_history(&self, lat: f64, lon: f64) -> Result<Vec<AqiHistoryHour>, ProviderError> {
        let body = json!({
            "location": { "latitude": lat, "longitude": lon },
            "hours": self.history_hours,
            "pageSize": self.history_hours,
            "universalAqi": false,
            "extraComputations": EXTRA_COMPUTATIONS,
            "languageCode": "en",
        });
        let history: AqiHistoryPayload = self.post_air_quality("history:lookup", body).await?;
        Ok(history.into_rows())
    }

    async fn fetch_weather_history(&self, lat: f64, lon: f64) -> Result<Vec<WeatherHour>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/history/hours:lookup", self.weather_url))
            .query(&[
                ("key", self.api_key.clone()),
                ("location.latitude", lat.to_string()),
                ("location.longitude", lon.to_string()),
                ("hours", self.history_hours.to_string()),
                ("unitsSystem", "METRIC".to_string()),
                ("languageCode", "en".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        let history: WeatherHistoryPayload = response
            .json()
            .await
            .map_err(|err| ProviderError::Payload(err.without_url().to_string()))?;
        Ok(history.into_rows())
    }
}

// === Wire types ===

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionsPayload {
    #[serde(default)]
    indexes: Vec<IndexPayload>,
    #[serde(default)]
    pollutants: Vec<PollutantPayload>,
}

#[derive(Debug, Deserialize)]
struct IndexPayload {
    #[serde(default)]
    aqi: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PollutantPayload {
    code: String,
    #[serde(default)]
    concentration: Option<ConcentrationPayload>,
}

#[derive(Debug, Deserialize)]
struct ConcentrationPayload {
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AqiHistoryPayload {
    #[serde(default)]
    hours_info: Vec<HourInfoPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourInfoPayload {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    indexes: Vec<IndexPayload>,
    #[serde(default)]
    pollutants: Vec<PollutantPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherHistoryPayload {
    #[serde(default)]
    history_hours: Vec<WeatherHourPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherHourPayload {
    #[serde(default)]
    interval: Option<IntervalPayload>,
    #[serde(default)]
    temperature: Option<TemperaturePayload>,
    #[serde(default)]
    wind: Option<WindPayload>,
    #[serde(default)]
    relative_humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntervalPayload {
    #[serde(default)]
    start_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemperaturePayload {
    #[serde(default)]
    degrees: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WindPayload {
    #[serde(default)]
    speed: Option<SpeedPayload>,
}

#[derive(Debug, Deserialize)]
struct SpeedPayload {
    #[serde(default)]
    value: Option<f64>,
}

/// Pollutant concentrations keyed by provider code; missing values become 0.
fn concentrations(pollutants: &[PollutantPayload]) -> HashMap<&str, f64> {
    pollutants
        .iter()
        .map(|p| {
            let value = p.concentration.as_ref().and_then(|c| c.value).unwrap_or(0.0);
            (p.code.as_str(), value)
        })
        .collect()
}

fn first_aqi(indexes: &[IndexPayload]) -> f64 {
    indexes.first().and_then(|index| index.aqi).unwrap_or(0.0)
}

impl ConditionsPayload {
    fn into_profile(self, lat: f64, lon: f64) -> PollutantProfile {
        let values = concentrations(&self.pollutants);
        let get = |code: &str| values.get(code).copied().unwrap_or(0.0);
        PollutantProfile {
            lat,
            lon,
            aqi: first_aqi(&self.indexes),
            pm25: get("pm25"),
            pm10: get("pm10"),
            no2: get("no2"),
            co: get("co"),
            so2: get("so2"),
            o3: get("o3"),
        }
    }
}

impl AqiHistoryPayload {
    fn into_rows(self) -> Vec<AqiHistoryHour> {
        let mut rows: Vec<AqiHistoryHour> = self
            .hours_info
            .into_iter()
            .map(|hour| {
                let values = concentrations(&hour.pollutants);
                let get = |code: &str| values.get(code).copied().unwrap_or(0.0);
                AqiHistoryHour {
                    aqi: first_aqi(&hour.indexes),
                    pm25: get("pm25"),
                    pm10: get("pm10"),
                    no2: get("no2"),
                    co: get("co"),
                    so2: get("so2"),
                    o3: get("o3"),
                    time: hour.date_time,
                }
            })
            .collect();
        sort_oldest_first(&mut rows, |row| row.time.as_deref());
        rows
    }
}

impl WeatherHistoryPayload {
    fn into_rows(self) -> Vec<WeatherHour> {
        let mut rows: Vec<WeatherHour> = self
            .history_hours
            .into_iter()
            .map(|hour| WeatherHour {
                time: hour.interval.and_then(|i| i.start_time),
                temp_c: hour.temperature.and_then(|t| t.degrees).unwrap_or(0.0),
                wind: hour
                    .wind
                    .and_then(|w| w.speed)
                    .and_then(|s| s.value)
                    .unwrap_or(0.0),
                humidity: hour.relative_humidity.unwrap_or(0.0),
            })
            .collect();
        sort_oldest_first(&mut rows, |row| row.time.as_deref());
        rows
    }
}

/// Sort chronologically when every row carries a parseable timestamp;
/// otherwise keep provider order.
fn sort_oldest_first<T>(rows: &mut [T], time: impl Fn(&T) -> Option<&str>) {
    let parse = |row: &T| time(row).and_then(|t| DateTime::parse_from_rfc3339(t).ok());
    if rows.iter().any(|row| parse(row).is_none()) {
        return;
    }
    rows.sort_by_key(|row| parse(row));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_client(key: &str) -> GoogleEnvironmentClient {
        GoogleEnvironmentClient::new(&Config {
            google_api_key: key.to_string(),
            air_quality_url: "http://127.0.0.1:9".to_string(),
            weather_url: "http://127.0.0.1:9".to_string(),
            upstream_timeout_s: 2,
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn request_failures_do_not_expose_api_key() {
        let client = unreachable_client("SECRET_KEY_123");

        let profile_err = client.fetch_profile(23.5, 87.3).await.unwrap_err();
        let weather_err = client.fetch_weather_history(23.5, 87.3).await.unwrap_err();

        for err in [profile_err, weather_err] {
            assert!(matches!(err, ProviderError::Http(_)));
            let message = aqi_core::AqiError::from(err).to_string();
            assert!(!message.contains("SECRET_KEY_123"), "leaked: {message}");
            assert!(!message.contains("key="), "leaked: {message}");
        }
    }

    #[test]
    fn conditions_payload_maps_codes_and_defaults() {
        let payload: ConditionsPayload = serde_json::from_value(json!({
            "dateTime": "2025-03-01T09:00:00Z",
            "indexes": [{ "code": "ind_cpcb", "aqi": 142 }, { "code": "uaqi", "aqi": 60 }],
            "pollutants": [
                { "code": "pm25", "concentration": { "value": 61.5, "units": "MICROGRAMS_PER_CUBIC_METER" } },
                { "code": "co", "concentration": { "value": 410.2 } },
                { "code": "o3" }
            ]
        }))
        .unwrap();

        let profile = payload.into_profile(23.5, 87.3);

        assert_eq!(profile.aqi, 142.0);
        assert_eq!(profile.pm25, 61.5);
        assert_eq!(profile.co, 410.2);
        assert_eq!(profile.o3, 0.0);
        assert_eq!(profile.pm10, 0.0);
        assert_eq!((profile.lat, profile.lon), (23.5, 87.3));
    }

    #[test]
    fn empty_conditions_payload_is_all_zero() {
        let payload: ConditionsPayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(payload.into_profile(1.0, 2.0), PollutantProfile::at(1.0, 2.0));
    }

    #[test]
    fn aqi_history_is_returned_oldest_first() {
        let payload: AqiHistoryPayload = serde_json::from_value(json!({
            "hoursInfo": [
                { "dateTime": "2025-03-01T09:00:00Z", "indexes": [{ "aqi": 90 }] },
                { "dateTime": "2025-03-01T08:00:00Z", "indexes": [{ "aqi": 80 }],
                  "pollutants": [{ "code": "pm10", "concentration": { "value": 120.0 } }] }
            ]
        }))
        .unwrap();

        let rows = payload.into_rows();

        assert_eq!(rows[0].time.as_deref(), Some("2025-03-01T08:00:00Z"));
        assert_eq!(rows[0].aqi, 80.0);
        assert_eq!(rows[0].pm10, 120.0);
        assert_eq!(rows[1].aqi, 90.0);
    }

    #[test]
    fn weather_history_reads_nested_fields() {
        let payload: WeatherHistoryPayload = serde_json::from_value(json!({
            "historyHours": [
                {
                    "interval": { "startTime": "2025-03-01T09:00:00Z", "endTime": "2025-03-01T10:00:00Z" },
                    "temperature": { "degrees": 31.4, "unit": "CELSIUS" },
                    "wind": { "speed": { "value": 7, "unit": "KILOMETERS_PER_HOUR" } },
                    "relativeHumidity": 48
                },
                { "interval": { "startTime": "2025-03-01T08:00:00Z" } }
            ]
        }))
        .unwrap();

        let rows = payload.into_rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].temp_c, 0.0);
        assert_eq!(rows[1].temp_c, 31.4);
        assert_eq!(rows[1].wind, 7.0);
        assert_eq!(rows[1].humidity, 48.0);
    }

    #[test]
    fn rows_without_timestamps_keep_provider_order() {
        let payload: AqiHistoryPayload = serde_json::from_value(json!({
            "hoursInfo": [
                { "dateTime": "2025-03-01T09:00:00Z", "indexes": [{ "aqi": 90 }] },
                { "indexes": [{ "aqi": 80 }] }
            ]
        }))
        .unwrap();
        let rows = payload.into_rows();
        assert_eq!(rows[0].aqi, 90.0);
        assert_eq!(rows[1].aqi, 80.0);
    }
}
