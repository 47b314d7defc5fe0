//! Per-route exposure averages.

use serde::{Deserialize, Serialize};

use crate::models::{round2, InterpolatedPoint, PollutantField};

/// Mean exposure along one interpolated route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteExposure {
    pub avg_aqi: f64,
    pub avg_pm25: f64,
    pub avg_pm10: f64,
    pub avg_co: f64,
}

/// Average the interpolated values; an empty route averages to zero.
pub fn summarize(profile: &[InterpolatedPoint]) -> RouteExposure {
    let mean = |field: PollutantField| {
        if profile.is_empty() {
            return 0.0;
        }
        let total: f64 = profile.iter().map(|point| point.field(field)).sum();
        round2(total / profile.len() as f64)
    };

    RouteExposure {
        avg_aqi: mean(PollutantField::Aqi),
        avg_pm25: mean(PollutantField::Pm25),
        avg_pm10: mean(PollutantField::Pm10),
        avg_co: mean(PollutantField::Co),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoutePoint;

    fn point(aqi: f64, pm25: f64) -> InterpolatedPoint {
        InterpolatedPoint {
            location: RoutePoint::new(0.0, 0.0),
            aqi,
            pm25,
            pm10: 10.0,
            co: 0.333,
            no2: 0.0,
            o3: 0.0,
        }
    }

    #[test]
    fn averages_each_field() {
        let exposure = summarize(&[point(100.0, 40.0), point(150.0, 45.0)]);
        assert_eq!(exposure.avg_aqi, 125.0);
        assert_eq!(exposure.avg_pm25, 42.5);
        assert_eq!(exposure.avg_pm10, 10.0);
        assert_eq!(exposure.avg_co, 0.33);
    }

    #[test]
    fn empty_route_is_zero() {
        assert_eq!(summarize(&[]), RouteExposure::default());
    }
}
