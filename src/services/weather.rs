use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::weather::describe_weather_code;
use crate::models::Weather;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn weather(&self, date: NaiveDate, latitude: f64, longitude: f64)
        -> anyhow::Result<Weather>;
}

pub struct OpenMeteoProvider {
    url: String,
    client: reqwest::Client,
}

impl OpenMeteoProvider {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

const CURRENT_VARIABLES: &str =
    "temperature_2m,relative_humidity_2m,is_day,weather_code,wind_speed_10m";

/// Reads the `current` block of an Open-Meteo forecast response.
pub fn parse_current(date: NaiveDate, data: &serde_json::Value) -> anyhow::Result<Weather> {
    let current = &data["current"];
    let number = |key: &str| {
        current[key]
            .as_f64()
            .ok_or_else(|| anyhow::anyhow!("missing {key} in weather response"))
    };

    let code = number("weather_code")?;
    let is_day = number("is_day").map(|v| v >= 1.0).unwrap_or(true);
    let described = describe_weather_code(code.clamp(0.0, 255.0) as u8, is_day);

    Ok(Weather {
        date,
        temperature: number("temperature_2m")?.round() as i32,
        condition: described.condition.to_string(),
        icon: described.icon.to_string(),
        humidity: number("relative_humidity_2m")
            .unwrap_or(0.0)
            .clamp(0.0, 100.0)
            .round() as u8,
        wind_speed: number("wind_speed_10m")?.round() as i32,
    })
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn weather(
        &self,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
    ) -> anyhow::Result<Weather> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_VARIABLES.to_string()),
            ])
            .send()
            .await
            .context("failed to call weather API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse weather response")?;

        if !status.is_success() {
            anyhow::bail!("weather API error ({}): {}", status, data);
        }

        parse_current(date, &data)
    }
}
