//! HTTP API for the AQI service.

pub mod error;
pub mod request_id;
mod routes;

use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use error::ApiError;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    routes::create_router()
        .with_state(state)
        .layer(middleware::from_fn(request_id::ensure_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
