//! Route AQI analysis and station forecasting service.

pub mod api;
pub mod config;
pub mod model_store;
pub mod pipeline;
pub mod providers;
pub mod state;
