use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    config::OpenWeatherConfig,
    model::WeatherSample,
    provider::{FetchError, truncate_body},
    units::kelvin_to_celsius,
};

use super::WeatherProvider;

const PROVIDER: &str = "openweather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, config: OpenWeatherConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn current_url(&self) -> String {
        format!("{}/data/2.5/weather", self.base_url)
    }
}

// No `units` parameter is sent, so temperatures arrive in Kelvin.
#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

fn sample_from_body(city: &str, body: &str) -> Result<WeatherSample, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|source| FetchError::Payload { provider: PROVIDER, source })?;

    let condition = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.main)
        .ok_or(FetchError::MissingCondition { provider: PROVIDER })?;

    Ok(WeatherSample {
        city: city.to_string(),
        temperature_c: kelvin_to_celsius(parsed.main.temp),
        feels_like_c: kelvin_to_celsius(parsed.main.feels_like),
        condition,
        observed_at: parsed.dt,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, city: &str) -> Result<Option<WeatherSample>, FetchError> {
        debug!(city, "requesting current weather");

        let res = self
            .http
            .get(self.current_url())
            .query(&[("q", city), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport { provider: PROVIDER, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { provider: PROVIDER, source })?;

        if !status.is_success() {
            warn!(
                %status,
                body = %truncate_body(&body),
                "Error fetching data from OpenWeather"
            );
            return Ok(None);
        }

        sample_from_body(city, &body).map(Some)
    }
}
