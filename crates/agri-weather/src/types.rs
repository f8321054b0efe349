use agri_core::{AppError, ConfigError, UpstreamError};
use serde::{Deserialize, Serialize};

/// Current conditions at the requested coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    /// Degrees Celsius, one decimal
    pub temperature: f64,
    pub humidity: f64,
    /// Millimetres over the last 1h (or 3h when 1h is absent)
    pub rainfall: f64,
    pub description: String,
    pub icon: String,
    pub location: String,
}

/// One forecast entry per calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Short weekday name, e.g. "Mon"
    pub day: String,
    pub temp: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: WeatherData,
    pub forecast: Vec<ForecastDay>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("{0} not configured")]
    MissingApiKey(String),

    #[error("Weather API rate limit exceeded while fetching {0}")]
    RateLimited(&'static str),

    #[error("Failed to fetch {what}: {message}")]
    Fetch { what: &'static str, message: String },

    #[error("HTTP client error: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::MissingApiKey(name) => AppError::Config(ConfigError::MissingSecret(name)),
            WeatherError::RateLimited(_) => AppError::Upstream(UpstreamError::RateLimited {
                service: "Weather API".to_string(),
            }),
            WeatherError::Fetch { what, message } => AppError::Upstream(UpstreamError::FetchFailed {
                what: what.to_string(),
                message,
            }),
            WeatherError::Network(e) => AppError::Upstream(UpstreamError::FetchFailed {
                what: "weather data".to_string(),
                message: e.without_url().to_string(),
            }),
        }
    }
}
