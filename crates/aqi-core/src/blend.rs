//! Forecast time labels and route blending.

use chrono::{DateTime, Duration, FixedOffset};

use crate::health::classify;
use crate::models::{round2, ForecastPoint, HistoryRecord, RouteForecast, StationForecast};
use crate::spatial::haversine_km;

/// Display format for forecast labels, e.g. `03:00 PM`.
pub const LABEL_FORMAT: &str = "%I:%M %p";

/// Labels for `horizon` forecast steps.
///
/// Step `h` (1-based) is `anchor + h hours` in the `local` offset. The anchor
/// is the newest parseable timestamp in `history`; without one every label
/// falls back to `+{h}h`.
pub fn forecast_labels(history: &[HistoryRecord], local: FixedOffset, horizon: usize) -> Vec<String> {
    let anchor = history
        .iter()
        .rev()
        .filter_map(|record| record.time.as_deref())
        .find_map(|time| DateTime::parse_from_rfc3339(time).ok())
        .map(|time| time.with_timezone(&local));

    (1..=horizon)
        .map(|step| match anchor {
            Some(anchor) => (anchor + Duration::hours(step as i64))
                .format(LABEL_FORMAT)
                .to_string(),
            None => format!("+{step}h"),
        })
        .collect()
}

/// Attach labels and health categories to a raw AQI sequence.
pub fn annotate(values: &[f64], labels: &[String]) -> StationForecast {
    values
        .iter()
        .enumerate()
        .map(|(step, &aqi)| ForecastPoint {
            time: label_for(labels, step),
            aqi,
            health_info: classify(aqi),
        })
        .collect()
}

/// Inverse-distance weighted AQI at `midpoint` from two stations.
///
/// A station sitting exactly on the midpoint takes its value outright.
pub fn weighted_average(
    aqi_a: f64,
    aqi_b: f64,
    midpoint: (f64, f64),
    station_a: (f64, f64),
    station_b: (f64, f64),
) -> f64 {
    let d_a = haversine_km(midpoint.0, midpoint.1, station_a.0, station_a.1);
    let d_b = haversine_km(midpoint.0, midpoint.1, station_b.0, station_b.1);

    if d_a == 0.0 {
        return aqi_a;
    }
    if d_b == 0.0 {
        return aqi_b;
    }
    let (w_a, w_b) = (1.0 / d_a, 1.0 / d_b);
    (aqi_a * w_a + aqi_b * w_b) / (w_a + w_b)
}

/// Blend the start and end station forecasts into one route forecast.
///
/// Output length is the shorter of the two inputs; each step is rounded to
/// two decimals and classified from the rounded value.
pub fn blend(
    start: &[f64],
    end: &[f64],
    midpoint: (f64, f64),
    start_station: (f64, f64),
    end_station: (f64, f64),
    labels: &[String],
) -> RouteForecast {
    start
        .iter()
        .zip(end)
        .enumerate()
        .map(|(step, (&a, &b))| {
            let aqi = round2(weighted_average(a, b, midpoint, start_station, end_station));
            ForecastPoint {
                time: label_for(labels, step),
                aqi,
                health_info: classify(aqi),
            }
        })
        .collect()
}

fn label_for(labels: &[String], step: usize) -> String {
    labels
        .get(step)
        .cloned()
        .unwrap_or_else(|| format!("+{}h", step + 1))
}
