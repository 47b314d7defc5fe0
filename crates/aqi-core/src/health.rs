//! Health category classification for AQI values.

use serde::{Deserialize, Serialize};

/// Health category and display color for an AQI value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub category: String,
    pub color: String,
}

/// Severity bands, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
}

impl HealthCategory {
    /// Band containing `aqi`. Upper bounds are inclusive.
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 50.0 {
            HealthCategory::Good
        } else if aqi <= 100.0 {
            HealthCategory::Satisfactory
        } else if aqi <= 200.0 {
            HealthCategory::Moderate
        } else if aqi <= 300.0 {
            HealthCategory::Poor
        } else if aqi <= 400.0 {
            HealthCategory::VeryPoor
        } else {
            HealthCategory::Severe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthCategory::Good => "Good",
            HealthCategory::Satisfactory => "Satisfactory",
            HealthCategory::Moderate => "Moderate",
            HealthCategory::Poor => "Poor",
            HealthCategory::VeryPoor => "Very Poor",
            HealthCategory::Severe => "Severe",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            HealthCategory::Good => "#00E400",
            HealthCategory::Satisfactory => "#FFFF00",
            HealthCategory::Moderate => "#FF7E00",
            HealthCategory::Poor => "#FF0000",
            HealthCategory::VeryPoor => "#8F3F97",
            HealthCategory::Severe => "#7E0023",
        }
    }
}

/// Classify an AQI value into its health category and color.
pub fn classify(aqi: f64) -> HealthInfo {
    let category = HealthCategory::from_aqi(aqi);
    HealthInfo {
        category: category.label().to_string(),
        color: category.color().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_reference_values() {
        assert_eq!(
            classify(45.0),
            HealthInfo { category: "Good".into(), color: "#00E400".into() }
        );
        assert_eq!(
            classify(150.0),
            HealthInfo { category: "Moderate".into(), color: "#FF7E00".into() }
        );
        assert_eq!(
            classify(450.0),
            HealthInfo { category: "Severe".into(), color: "#7E0023".into() }
        );
    }

    #[test]
    fn band_upper_bounds_are_inclusive() {
        assert_eq!(HealthCategory::from_aqi(50.0), HealthCategory::Good);
        assert_eq!(HealthCategory::from_aqi(50.01), HealthCategory::Satisfactory);
        assert_eq!(HealthCategory::from_aqi(100.0), HealthCategory::Satisfactory);
        assert_eq!(HealthCategory::from_aqi(200.0), HealthCategory::Moderate);
        assert_eq!(HealthCategory::from_aqi(300.0), HealthCategory::Poor);
        assert_eq!(HealthCategory::from_aqi(400.0), HealthCategory::VeryPoor);
        assert_eq!(classify(400.0).category, "Very Poor");
    }

    #[test]
    fn severity_is_monotonic() {
        let mut previous = HealthCategory::from_aqi(0.0);
        let mut aqi = 0.0;
        while aqi <= 600.0 {
            let current = HealthCategory::from_aqi(aqi);
            assert!(current >= previous, "severity dropped at aqi {aqi}");
            previous = current;
            aqi += 0.5;
        }
        assert_eq!(previous, HealthCategory::Severe);
    }
}
