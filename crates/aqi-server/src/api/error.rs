//! Mapping from engine errors to HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use aqi_core::AqiError;

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub AqiError);

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self(AqiError::InvalidInput(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            AqiError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AqiError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AqiError::ModelUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AqiError::ForecastUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AqiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<AqiError> for ApiError {
    fn from(err: AqiError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), "request failed: {}", self.0);
        } else {
            tracing::warn!(kind = self.0.kind(), "request rejected: {}", self.0);
        }

        let body = Json(json!({
            "status": "error",
            "error": self.0.kind(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
