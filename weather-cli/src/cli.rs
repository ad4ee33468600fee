use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use weather_core::{Config, Store, provider::provider_from_config, report};

use crate::pipeline;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-monitor", version, about = "Fetch, store and report on current weather")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of the platform default.
    #[arg(long, global = true, env = "WEATHER_MONITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// City to fetch, as understood by OpenWeather (e.g. "Delhi" or "Paris,FR").
    #[arg(long, global = true, env = "WEATHER_MONITOR_CITY")]
    pub city: Option<String>,

    /// OpenWeather API key.
    #[arg(long, global = true, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// SQLite database file.
    #[arg(long, global = true, env = "WEATHER_MONITOR_DB")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set city, API key and alert threshold.
    Configure,

    /// Fetch current weather, store it, then print the summary and plot the trend.
    Run {
        /// Alert when the fetched temperature is above this value (°C).
        #[arg(long)]
        threshold: Option<f64>,

        /// Where to write the trend chart (PNG).
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Skip rendering the trend chart.
        #[arg(long, conflicts_with = "plot")]
        no_plot: bool,
    },

    /// Print the per-city daily summary of stored samples.
    Summary,

    /// Render the daily average temperature trend of stored samples.
    Plot {
        /// Output PNG path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let file_config = self.load_file_config()?;

        match &self.command {
            Command::Configure => self.configure(file_config),
            Command::Run { threshold, plot, no_plot } => {
                let cfg = self.apply_overrides(file_config);
                let city = cfg.resolved_city()?;
                let provider = provider_from_config(&cfg)?;
                let store = open_store(&cfg)?;

                let threshold = threshold.unwrap_or(cfg.alert_threshold_c);
                let plot_path = (!no_plot).then(|| plot.clone().unwrap_or_else(|| cfg.plot_path()));

                pipeline::run_once(
                    provider.as_ref(),
                    &store,
                    city,
                    threshold,
                    plot_path.as_deref(),
                    &mut std::io::stdout(),
                )
                .await?;
                Ok(())
            }
            Command::Summary => {
                let cfg = self.apply_overrides(file_config);
                let store = open_store(&cfg)?;
                pipeline::print_summary(&store, &mut std::io::stdout())
            }
            Command::Plot { output } => {
                let cfg = self.apply_overrides(file_config);
                let store = open_store(&cfg)?;
                let output = output.clone().unwrap_or_else(|| cfg.plot_path());

                report::plot_trend(&store, &output)
                    .with_context(|| format!("Failed to plot trend to {}", output.display()))?;
                println!("Temperature trend written to {}", output.display());
                Ok(())
            }
        }
    }

    fn load_file_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    /// Flags and environment take precedence over the config file.
    fn apply_overrides(&self, mut cfg: Config) -> Config {
        if let Some(city) = &self.city {
            cfg.city = Some(city.clone());
        }
        if let Some(key) = &self.api_key {
            cfg.api_key = Some(key.clone());
        }
        if let Some(db) = &self.database {
            cfg.database_path = Some(db.clone());
        }
        cfg
    }

    fn configure(&self, mut cfg: Config) -> Result<()> {
        let current_city = cfg.city.clone().unwrap_or_default();
        let mut city_prompt = Text::new("City:");
        if !current_city.is_empty() {
            city_prompt = city_prompt.with_default(&current_city);
        }
        let city = city_prompt.prompt().context("Failed to read city")?;
        cfg.city = Some(city.trim().to_string());

        let mut key_prompt = Password::new("OpenWeather API key:")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked);
        if cfg.api_key.is_some() {
            key_prompt = key_prompt.with_help_message("Leave empty to keep the current key");
        }
        let key = key_prompt.prompt().context("Failed to read API key")?;
        if !key.trim().is_empty() {
            cfg.api_key = Some(key.trim().to_string());
        }

        cfg.alert_threshold_c = CustomType::<f64>::new("Alert threshold (°C):")
            .with_default(cfg.alert_threshold_c)
            .with_error_message("Please enter a number")
            .prompt()
            .context("Failed to read alert threshold")?;

        let path = match &self.config {
            Some(path) => {
                cfg.save_to(path)?;
                path.clone()
            }
            None => cfg.save()?,
        };
        println!("Configuration saved to {}", path.display());
        Ok(())
    }
}

fn open_store(cfg: &Config) -> Result<Store> {
    let path = cfg.database_path();
    open_store_at(&path)
}

fn open_store_at(path: &Path) -> Result<Store> {
    let store = Store::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    store.ensure_schema().context("Failed to prepare weather table")?;
    Ok(store)
}
