use std::{io::Write, path::Path};

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use weather_core::{
    Store, WeatherProvider, WeatherSample, check_alert,
    report::{self, format_summary_line},
};

/// Fetch one sample for `city`, store it, then report.
///
/// `store` must already have its schema in place. Returns `None` when the
/// provider had no data; nothing is stored or reported in that case.
pub async fn run_once<W: Write>(
    provider: &dyn WeatherProvider,
    store: &Store,
    city: &str,
    threshold_c: f64,
    plot: Option<&Path>,
    out: &mut W,
) -> Result<Option<WeatherSample>> {
    let sample = provider
        .fetch(city)
        .await
        .with_context(|| format!("Failed to fetch weather for '{city}'"))?;

    let Some(sample) = sample else {
        warn!(city, "No weather data received; nothing stored");
        return Ok(None);
    };

    let id = store.insert(&sample).context("Failed to store weather sample")?;
    info!(id, city, temperature_c = sample.temperature_c, "stored weather sample");
    writeln!(out, "Weather data successfully stored in the database.")?;

    if let Some(alert) = check_alert(sample.temperature_c, threshold_c) {
        writeln!(out, "{alert}")?;
    }

    print_summary(store, out)?;

    if let Some(path) = plot {
        // The sample is already stored; a chart failure only costs the chart.
        match report::plot_trend(store, path) {
            Ok(()) => writeln!(out, "Temperature trend written to {}", path.display())?,
            Err(err) => error!(error = %err, "Failed to render temperature trend"),
        }
    }

    Ok(Some(sample))
}

pub fn print_summary<W: Write>(store: &Store, out: &mut W) -> Result<()> {
    let rows = report::daily_summary(store).context("Failed to compute daily summary")?;
    for row in &rows {
        writeln!(out, "{}", format_summary_line(row))?;
    }
    Ok(())
}
