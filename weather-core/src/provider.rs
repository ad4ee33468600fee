use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::{Config, WeatherSample, provider::openweather::OpenWeatherProvider};

pub mod openweather;

/// Failures that abort a fetch. A non-success HTTP status is not one of them:
/// providers report it and return `Ok(None)`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse {provider} response: {source}")]
    Payload {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} response contained no weather condition")]
    MissingCondition { provider: &'static str },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the current weather for `city`.
    ///
    /// Returns `Ok(None)` when the provider answered with a non-success status.
    async fn fetch(&self, city: &str) -> Result<Option<WeatherSample>, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.resolved_api_key()?;
    let provider = OpenWeatherProvider::new(api_key.to_owned(), config.openweather.clone())?;
    Ok(Box::new(provider))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `weather-monitor configure`"));
    }

    #[test]
    fn provider_from_config_works_when_key_set() {
        let cfg = Config { api_key: Some("KEY".into()), ..Config::default() };
        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn truncate_body_cuts_long_bodies_on_char_boundary() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
