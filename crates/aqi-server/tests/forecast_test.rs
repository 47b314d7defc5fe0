//! Live API integration tests against a running server.
//!
//! Run with: cargo test --test forecast_test -- --ignored

use reqwest::Client;

fn base_url() -> String {
    std::env::var("AQI_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

#[tokio::test]
#[ignore]
async fn test_health_is_online() {
    let client = Client::new();
    let resp = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "online");
    assert!(body["model_loaded"].is_boolean());
}

#[tokio::test]
#[ignore]
async fn test_predict_all_stations() {
    let client = Client::new();
    let body = serde_json::json!({
        "sLat": 23.5190,
        "sLon": 87.3456,
        "dLat": 23.5548,
        "dLon": 87.2468
    });

    let resp = client
        .post(format!("{}/v1/predict-all-stations", base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to request forecast");

    let status = resp.status();
    let json: serde_json::Value = resp.json().await.unwrap();
    if !status.is_success() {
        // Upstream or model problems are reported, never masked.
        assert_eq!(json["status"], "error");
        assert!(json["error"].is_string());
        return;
    }

    let route = json["route_forecast"].as_array().expect("route_forecast");
    assert!(!route.is_empty());
    for point in route {
        let aqi = point["aqi"].as_f64().unwrap();
        assert!((0.0..=500.0).contains(&aqi));
        assert!(point["health_info"]["category"].is_string());
    }
    assert_eq!(json["forecast_data"].as_object().unwrap().len(), 4);
}

#[tokio::test]
#[ignore]
async fn test_analyze_single_route() {
    let client = Client::new();
    let body = serde_json::json!({
        "start_loc": [23.5190, 87.3456],
        "end_loc": [23.5548, 87.2468],
        "routeCount": 1,
        "routes": [{
            "distance": "11 km",
            "duration": "22 mins",
            "coordinates": [
                { "lat": 23.5190, "lng": 87.3456 },
                { "lat": 23.5390, "lng": 87.3040 },
                { "lat": 23.5548, "lng": 87.2468 }
            ]
        }]
    });

    let resp = client
        .post(format!("{}/v1/analyze-routes", base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to analyze routes");

    if resp.status().is_success() {
        let json: serde_json::Value = resp.json().await.unwrap();
        let details = json["route_analysis"]["Route_1"]["details"].as_array().unwrap();
        assert_eq!(details.len(), 3);
    } else {
        assert_eq!(resp.status().as_u16(), 503);
    }
}
