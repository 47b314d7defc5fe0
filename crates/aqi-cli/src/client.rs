//! HTTP client for the AQI service.

use anyhow::{bail, Context, Result};
use aqi_core::RoutePoint;
use reqwest::Client;
use serde_json::{json, Value};

/// Thin JSON client over the service endpoints.
pub struct AqiClient {
    client: Client,
    base_url: String,
}

impl AqiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn health(&self) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("health request failed")?;
        Self::read(response).await
    }

    pub async fn forecast(&self, start: RoutePoint, end: RoutePoint) -> Result<Value> {
        let body = json!({
            "sLat": start.lat,
            "sLon": start.lon,
            "dLat": end.lat,
            "dLon": end.lon,
        });
        self.post("/v1/predict-all-stations", &body).await
    }

    /// Analyze one route running `start`, `points`..., `end`.
    pub async fn analyze_route(
        &self,
        start: RoutePoint,
        end: RoutePoint,
        points: &[RoutePoint],
    ) -> Result<Value> {
        let coordinates: Vec<Value> = std::iter::once(start)
            .chain(points.iter().copied())
            .chain(std::iter::once(end))
            .map(|p| json!({ "lat": p.lat, "lng": p.lon }))
            .collect();
        let body = json!({
            "start_loc": [start.lat, start.lon],
            "end_loc": [end.lat, end.lon],
            "routeCount": 1,
            "routes": [{ "distance": "", "duration": "", "coordinates": coordinates }],
        });
        self.post("/v1/analyze-routes", &body).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {path} failed"))?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body: Value = response.json().await.context("response was not JSON")?;
        if !status.is_success() {
            bail!(
                "server returned {}: {} ({})",
                status,
                body["message"].as_str().unwrap_or("no message"),
                body["error"].as_str().unwrap_or("unknown")
            );
        }
        Ok(body)
    }
}
