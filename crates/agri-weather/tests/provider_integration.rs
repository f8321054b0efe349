//! Integration tests for WeatherProvider using wiremock.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use agri_core::{StaticSecrets, WeatherConfig};
use agri_weather::{WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key";

fn provider(server: &MockServer, secrets: StaticSecrets) -> WeatherProvider {
    let config = WeatherConfig {
        base_url: server.uri(),
        timeout_secs: 10,
        api_key_secret: "OPENWEATHER_API_KEY".to_string(),
    };
    WeatherProvider::new(&config, Arc::new(secrets)).unwrap()
}

fn keyed() -> StaticSecrets {
    StaticSecrets::new().with("OPENWEATHER_API_KEY", KEY)
}

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "main": {"temp": 31.47, "humidity": 60},
        "weather": [{"description": "haze", "icon": "50d"}],
        "name": "New Delhi"
    })
}

fn forecast_body(entries: i64) -> serde_json::Value {
    // 3-hour steps starting 2024-06-03T00:00:00Z
    let list: Vec<_> = (0..entries)
        .map(|i| {
            serde_json::json!({
                "dt": 1_717_372_800 + i * 10_800,
                "main": {"temp": 30.0 + (i % 8) as f64 * 0.25, "humidity": 55},
                "weather": [{"description": "clear sky", "icon": "01d"}]
            })
        })
        .collect();
    serde_json::json!({ "list": list })
}

async fn mount_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "28.6"))
        .and(query_param("lon", "77.2"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_current_and_forecast() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let report = provider(&server, keyed()).get(28.6, 77.2).await.unwrap();

    assert_eq!(report.current.temperature, 31.5);
    assert_eq!(report.current.rainfall, 0.0);
    assert_eq!(report.current.humidity, 60.0);
    assert_eq!(report.current.description, "Haze");
    assert_eq!(report.current.location, "New Delhi");

    // 5 days of data lands on 5 or 6 local dates depending on the host zone
    assert!(report.forecast.len() >= 5 && report.forecast.len() <= 7);
    assert!(report.forecast.iter().all(|d| d.description == "Clear Sky"));
    let mut names: Vec<_> = report.forecast.iter().map(|d| d.day.clone()).collect();
    names.dedup();
    assert_eq!(names.len(), report.forecast.len());
}

#[tokio::test]
async fn test_missing_api_key_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server, StaticSecrets::new())
        .get(28.6, 77.2)
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::MissingApiKey(_)));
    assert_eq!(err.to_string(), "OpenWeather API key not configured");
}

#[tokio::test]
async fn test_rate_limited_current() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = provider(&server, keyed()).get(1.0, 2.0).await.unwrap_err();
    assert!(matches!(err, WeatherError::RateLimited("weather data")));
}

#[tokio::test]
async fn test_rate_limited_forecast() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = provider(&server, keyed()).get(1.0, 2.0).await.unwrap_err();
    assert!(matches!(err, WeatherError::RateLimited("forecast data")));
}

#[tokio::test]
async fn test_server_error_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let err = provider(&server, keyed()).get(1.0, 2.0).await.unwrap_err();
    assert!(matches!(err, WeatherError::Fetch { what: "weather data", .. }));

    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(!message.contains(KEY));
}

#[tokio::test]
async fn test_malformed_payload_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server, keyed()).get(1.0, 2.0).await.unwrap_err();
    assert!(matches!(err, WeatherError::Fetch { .. }));
}

#[tokio::test]
async fn test_every_call_hits_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(8)))
        .expect(2)
        .mount(&server)
        .await;

    let provider = provider(&server, keyed());
    provider.get(28.6, 77.2).await.unwrap();
    provider.get(28.6, 77.2).await.unwrap();
}
