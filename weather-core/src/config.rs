use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::report::DEFAULT_ALERT_THRESHOLD_C;

pub const DEFAULT_DATABASE_PATH: &str = "weather_data.db";
pub const DEFAULT_PLOT_PATH: &str = "temperature_trend.png";

/// Connection settings for the OpenWeather API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD_C
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self { base_url: default_base_url(), timeout_secs: default_timeout() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// city = "Delhi"
/// api_key = "..."
/// alert_threshold_c = 35.0
///
/// [openweather]
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub city: Option<String>,

    pub api_key: Option<String>,

    /// SQLite file; relative paths resolve against the working directory.
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_threshold")]
    pub alert_threshold_c: f64,

    /// PNG file the trend chart is written to.
    pub plot_path: Option<PathBuf>,

    #[serde(default)]
    pub openweather: OpenWeatherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            city: None,
            api_key: None,
            database_path: None,
            alert_threshold_c: DEFAULT_ALERT_THRESHOLD_C,
            plot_path: None,
            openweather: OpenWeatherConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform config directory, or return an empty default
    /// if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-monitor", "weather-monitor")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn resolved_city(&self) -> Result<&str> {
        self.city.as_deref().filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No city configured.\n\
                 Hint: pass `--city <name>` or run `weather-monitor configure`."
            )
        })
    }

    pub fn resolved_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured for OpenWeather.\n\
                 Hint: run `weather-monitor configure` or set OPENWEATHER_API_KEY."
            )
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    pub fn plot_path(&self) -> PathBuf {
        self.plot_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_PLOT_PATH))
    }
}
