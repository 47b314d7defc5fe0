//! Command line arguments.

use aqi_core::RoutePoint;
use clap::{Parser, Subcommand};

/// Probe the AQI service
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// AQI Server URL
    #[arg(long, default_value = "http://localhost:8000")]
    pub url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Blended 12-hour forecast between two coordinates
    Forecast {
        #[arg(long, allow_hyphen_values = true)]
        s_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        s_lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        d_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        d_lon: f64,
    },
    /// Pollutant exposure along a single route
    Route {
        /// Start as lat,lon
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        start: RoutePoint,
        /// End as lat,lon
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        end: RoutePoint,
        /// Intermediate route point as lat,lon (repeatable, in order)
        #[arg(long = "point", value_parser = parse_point, allow_hyphen_values = true)]
        points: Vec<RoutePoint>,
    },
    /// Health category for an AQI value (offline)
    Classify {
        #[arg(allow_hyphen_values = true)]
        aqi: f64,
    },
}

/// Parse `lat,lon` into a route point.
pub fn parse_point(raw: &str) -> Result<RoutePoint, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon but got '{raw}'"))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude '{lat}'"))?;
    let lon: f64 = lon.trim().parse().map_err(|_| format!("invalid longitude '{lon}'"))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinate out of range: {lat},{lon}"));
    }
    Ok(RoutePoint::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points() {
        assert_eq!(parse_point("23.52, 87.34").unwrap(), RoutePoint::new(23.52, 87.34));
        assert_eq!(parse_point("-33.9,-70.6").unwrap(), RoutePoint::new(-33.9, -70.6));
        assert!(parse_point("23.52").is_err());
        assert!(parse_point("abc,87").is_err());
        assert!(parse_point("95,87").is_err());
    }

    #[test]
    fn parses_route_command() {
        let args = Args::try_parse_from([
            "aqi_probe",
            "route",
            "--start",
            "23.52,87.34",
            "--end",
            "23.56,87.25",
            "--point",
            "23.54,87.30",
            "--point",
            "23.55,87.28",
        ])
        .unwrap();

        assert_eq!(args.url, "http://localhost:8000");
        match args.command {
            Command::Route { start, end, points } => {
                assert_eq!(start, RoutePoint::new(23.52, 87.34));
                assert_eq!(end, RoutePoint::new(23.56, 87.25));
                assert_eq!(points.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_forecast_command() {
        let args = Args::try_parse_from([
            "aqi_probe",
            "--url",
            "http://aqi.internal:9000",
            "forecast",
            "--s-lat",
            "23.519",
            "--s-lon",
            "87.345",
            "--d-lat",
            "23.554",
            "--d-lon",
            "87.246",
        ])
        .unwrap();

        assert_eq!(args.url, "http://aqi.internal:9000");
        assert!(matches!(args.command, Command::Forecast { s_lat, .. } if s_lat == 23.519));
    }

    #[test]
    fn forecast_requires_all_coordinates() {
        assert!(Args::try_parse_from(["aqi_probe", "forecast", "--s-lat", "23.5"]).is_err());
    }
}
