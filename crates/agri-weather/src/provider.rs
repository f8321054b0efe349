//! OpenWeather client.

use std::sync::Arc;
use std::time::Duration;

use agri_core::{SecretProvider, WeatherConfig};
use chrono::Local;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::transform::{current_weather, forecast_days, OwmCurrent, OwmForecast};
use crate::types::{WeatherError, WeatherReport};

const API_KEY_LABEL: &str = "OpenWeather API key";

#[derive(Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key_secret: String,
    secrets: Arc<dyn SecretProvider>,
}

impl WeatherProvider {
    pub fn new(
        config: &WeatherConfig,
        secrets: Arc<dyn SecretProvider>,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key_secret: config.api_key_secret.clone(),
            secrets,
        })
    }

    /// Current conditions plus a per-day forecast for the coordinates.
    ///
    /// Every call goes to the provider; nothing is cached.
    #[instrument(skip(self), level = "info")]
    pub async fn get(&self, lat: f64, lon: f64) -> Result<WeatherReport, WeatherError> {
        let api_key = self
            .secrets
            .get(&self.api_key_secret)
            .ok_or_else(|| WeatherError::MissingApiKey(API_KEY_LABEL.to_string()))?;

        let current: OwmCurrent = self
            .fetch("data/2.5/weather", "weather data", lat, lon, &api_key)
            .await?;
        let forecast: OwmForecast = self
            .fetch("data/2.5/forecast", "forecast data", lat, lon, &api_key)
            .await?;

        let report = WeatherReport {
            current: current_weather(&current),
            forecast: forecast_days(&forecast, &Local),
        };

        tracing::debug!(
            "Weather for {} ({}, {}): {} forecast days",
            report.current.location,
            lat,
            lon,
            report.forecast.len()
        );
        Ok(report)
    }

    #[instrument(skip(self, api_key), level = "debug")]
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        what: &'static str,
        lat: f64,
        lon: f64,
        api_key: &str,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key
                let e = e.without_url();
                tracing::error!("Error fetching {}: {}", what, e);
                WeatherError::Fetch {
                    what,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Weather API rate limited while fetching {}", what);
            return Err(WeatherError::RateLimited(what));
        }
        if !status.is_success() {
            tracing::error!("HTTP error fetching {}: {}", what, status);
            return Err(WeatherError::Fetch {
                what,
                message: format!("provider returned {}", status),
            });
        }

        response.json().await.map_err(|e| {
            let e = e.without_url();
            tracing::error!("Invalid {} payload: {}", what, e);
            WeatherError::Fetch {
                what,
                message: format!("invalid response: {}", e),
            }
        })
    }
}
