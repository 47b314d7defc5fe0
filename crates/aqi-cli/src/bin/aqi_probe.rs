//! CLI tool to query a running AQI Server.

use aqi_cli::{AqiClient, Args, Command};
use aqi_core::{classify, RoutePoint};
use clap::Parser;
use serde_json::Value;

fn number(value: &Value) -> String {
    value
        .as_f64()
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

fn print_forecast(body: &Value) {
    println!(
        "Route forecast {} -> {}",
        body["start_station"].as_str().unwrap_or("?"),
        body["end_station"].as_str().unwrap_or("?")
    );
    println!("{:<10} {:>8}  {}", "TIME", "AQI", "CATEGORY");
    for point in body["route_forecast"].as_array().into_iter().flatten() {
        println!(
            "{:<10} {:>8}  {}",
            point["time"].as_str().unwrap_or("?"),
            number(&point["aqi"]),
            point["health_info"]["category"].as_str().unwrap_or("?")
        );
    }
}

fn print_route(body: &Value) {
    let route = &body["route_analysis"]["Route_1"];
    println!("Start AQI: {}", number(&body["ground_truth"]["start_point"]["aqi"]));
    println!("End AQI:   {}", number(&body["ground_truth"]["end_point"]["aqi"]));
    println!(
        "Average AQI {}  PM2.5 {}  PM10 {}  CO {}",
        number(&route["avg_aqi"]),
        number(&route["avg_pm25"]),
        number(&route["avg_pm10"]),
        number(&route["avg_co"])
    );
    for point in route["details"].as_array().into_iter().flatten() {
        println!(
            "  ({}, {})  aqi {}",
            number(&point["lat"]),
            number(&point["lon"]),
            number(&point["aqi"])
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Classify { aqi } => {
            let info = classify(aqi);
            println!("{aqi:.2}: {} ({})", info.category, info.color);
        }
        Command::Forecast { s_lat, s_lon, d_lat, d_lon } => {
            let client = AqiClient::new(&args.url);
            let health = client.health().await?;
            if health["model_loaded"] == Value::Bool(false) {
                eprintln!("Warning: server reports the forecast model is not loaded");
            }
            let body = client
                .forecast(RoutePoint::new(s_lat, s_lon), RoutePoint::new(d_lat, d_lon))
                .await?;
            print_forecast(&body);
        }
        Command::Route { start, end, points } => {
            let client = AqiClient::new(&args.url);
            let body = client.analyze_route(start, end, &points).await?;
            print_route(&body);
        }
    }

    Ok(())
}
