//! Reshaping of OpenWeather payloads into `WeatherData` / `ForecastDay`.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, TimeZone};
use serde::Deserialize;

use crate::types::{ForecastDay, WeatherData};

/// Forecast entries returned at most.
pub const MAX_FORECAST_DAYS: usize = 7;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwmCondition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwmRain {
    #[serde(rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(rename = "3h")]
    pub three_hours: Option<f64>,
}

/// `/data/2.5/weather` response (fields we use)
#[derive(Debug, Clone, Deserialize)]
pub struct OwmCurrent {
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
    #[serde(default)]
    pub rain: Option<OwmRain>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwmForecastEntry {
    /// Unix seconds
    pub dt: i64,
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
}

/// `/data/2.5/forecast` response (fields we use)
#[derive(Debug, Clone, Deserialize)]
pub struct OwmForecast {
    #[serde(default)]
    pub list: Vec<OwmForecastEntry>,
}

/// Round to one decimal place.
///
/// Rounds the exact binary value, ties to even, so `31.45` (stored as
/// 31.4499...) gives `31.4` and the exact tie `2.25` gives `2.2`.
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Capitalize the first letter of every word and lowercase the rest.
/// A "word" starts after any non-alphabetic character.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// First non-zero of the 1h and 3h precipitation figures, else 0.
pub fn rainfall(rain: Option<&OwmRain>) -> f64 {
    rain.and_then(|r| {
        [r.one_hour, r.three_hours]
            .into_iter()
            .flatten()
            .find(|v| *v != 0.0)
    })
    .unwrap_or(0.0)
}

fn primary_condition(conditions: &[OwmCondition]) -> OwmCondition {
    conditions.first().cloned().unwrap_or_default()
}

pub fn current_weather(current: &OwmCurrent) -> WeatherData {
    let condition = primary_condition(&current.weather);
    WeatherData {
        temperature: round1(current.main.temp),
        humidity: current.main.humidity,
        rainfall: rainfall(current.rain.as_ref()),
        description: title_case(&condition.description),
        icon: condition.icon,
        location: current.name.clone(),
    }
}

/// One entry per distinct calendar date in `tz`, keeping the first interval
/// seen for each date, in feed order, capped at `MAX_FORECAST_DAYS`.
pub fn forecast_days<Tz: TimeZone>(forecast: &OwmForecast, tz: &Tz) -> Vec<ForecastDay> {
    let mut days_seen = HashSet::new();
    let mut days = Vec::new();

    for entry in &forecast.list {
        if days.len() >= MAX_FORECAST_DAYS {
            break;
        }

        let Some(utc) = DateTime::from_timestamp(entry.dt, 0) else {
            tracing::debug!("Skipping forecast entry with invalid timestamp {}", entry.dt);
            continue;
        };
        let date = utc.with_timezone(tz).date_naive();

        if !days_seen.insert(date) {
            continue;
        }

        let condition = primary_condition(&entry.weather);
        days.push(ForecastDay {
            day: DAY_NAMES[date.weekday().num_days_from_monday() as usize].to_string(),
            temp: round1(entry.main.temp),
            description: title_case(&condition.description),
            icon: condition.icon,
        });
    }

    days
}
