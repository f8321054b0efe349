//! Weather proxy for AgriAssist
//!
//! Fetches current conditions and a 3-hourly forecast from OpenWeather and
//! reshapes them into a current snapshot plus one entry per day.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod provider;
pub mod transform;
pub mod types;

pub use provider::WeatherProvider;
pub use types::*;
