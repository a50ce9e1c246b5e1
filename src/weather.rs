//! Validates city names and fetches their current weather from an OpenWeatherMap compatible API.

use std::{fmt::Debug, time::Duration};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::WeatherConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait WeatherLookup: Send + Sync + Debug {
    /// `true` only if the provider positively confirms the city. Any failure counts as `false`.
    async fn check_existing(&self, city: &str) -> bool;

    /// The current temperature in °C.
    async fn current_weather(&self, city: &str) -> Result<f64>;
}

#[derive(Debug, Clone)]
pub struct OpenWeather {
    base_url: Url,
    api_key: String,
    http: Client,
}

impl OpenWeather {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build weather HTTP client")?;

        Ok(Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            http,
        })
    }

    async fn fetch_current(&self, city: &str) -> Result<OwCurrentResponse> {
        let url = self
            .base_url
            .join("data/2.5/weather")
            .context("Invalid weather API base URL")?;

        let res = self
            .http
            .get(url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather request for `{city}` failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).context("Failed to parse OpenWeather JSON")
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
}

#[async_trait]
impl WeatherLookup for OpenWeather {
    async fn check_existing(&self, city: &str) -> bool {
        match self.fetch_current(city).await {
            Ok(_) => {
                debug!("City `{city}` confirmed by OpenWeather");
                true
            }
            Err(e) => {
                warn!("City `{city}` can not be validated: {e:#}");
                false
            }
        }
    }

    async fn current_weather(&self, city: &str) -> Result<f64> {
        Ok(self.fetch_current(city).await?.main.temp)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}
