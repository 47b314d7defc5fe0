//! Error taxonomy for the AQI engine.

use thiserror::Error;

/// Failures that reach the caller.
///
/// Each variant implies a different remediation: retry later, pick another
/// location, or contact the operator.
#[derive(Debug, Error)]
pub enum AqiError {
    /// A data provider call failed or timed out.
    #[error("upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Fewer aligned history records than the model window requires.
    #[error("insufficient history: need {required} records, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// Forecasting model or feature scaler was not loaded at startup.
    #[error("forecasting model unavailable: {0}")]
    ModelUnavailable(String),

    /// Scaler or model raised during a forecast.
    #[error("forecast unavailable: {0}")]
    ForecastUnavailable(#[from] ModelError),

    /// Request input is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl AqiError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AqiError::UpstreamUnavailable(_) => "upstream_unavailable",
            AqiError::InsufficientData { .. } => "insufficient_data",
            AqiError::ModelUnavailable(_) => "model_unavailable",
            AqiError::ForecastUnavailable(_) => "forecast_unavailable",
            AqiError::InvalidInput(_) => "invalid_input",
        }
    }
}

/// Failures raised by a feature scaler or sequence model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("shape mismatch: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("station index {index} out of range for {stations} stations")]
    StationIndex { index: usize, stations: usize },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("{0}")]
    Other(String),
}

impl ModelError {
    pub fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Shape {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AqiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            AqiError::UpstreamUnavailable("timeout".into()),
            AqiError::InsufficientData { required: 24, available: 3 },
            AqiError::ModelUnavailable("missing file".into()),
            AqiError::ForecastUnavailable(ModelError::Other("boom".into())),
            AqiError::InvalidInput("bad".into()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(AqiError::kind).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn insufficient_data_message_names_counts() {
        let err = AqiError::InsufficientData { required: 24, available: 10 };
        let message = err.to_string();
        assert!(message.contains("24"));
        assert!(message.contains("10"));
    }

    #[test]
    fn model_error_converts_to_forecast_unavailable() {
        let err: AqiError = ModelError::NonFinite("scaler output").into();
        assert_eq!(err.kind(), "forecast_unavailable");
    }
}
