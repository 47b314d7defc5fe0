//! AQI CLI - probe a running AQI service from the command line.
//!
//! Binaries:
//! - aqi_probe: route forecast, route analysis and offline classification

pub mod args;
pub mod client;

pub use args::{parse_point, Args, Command};
pub use client::AqiClient;
