//! Core library for the `weather-monitor` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather fetcher behind the [`WeatherProvider`] trait
//! - SQLite storage of weather samples
//! - Daily summaries, the temperature trend chart and threshold alerts
//!
//! It is used by `weather-monitor`, but can also be reused by other binaries or services.

pub mod config;
pub mod model;
pub mod provider;
pub mod report;
pub mod store;
pub mod units;

pub use config::{Config, OpenWeatherConfig};
pub use model::{DailySummary, TrendPoint, WeatherSample};
pub use provider::{FetchError, WeatherProvider, openweather::OpenWeatherProvider};
pub use report::{Alert, ReportError, check_alert};
pub use store::{Store, StoreError};
