//! Read-only reports over the `weather` table.

use std::{collections::HashMap, fmt, path::Path};

use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    model::{DailySummary, TrendPoint},
    store::Store,
};

/// Temperature above which [`check_alert`] fires unless configured otherwise.
pub const DEFAULT_ALERT_THRESHOLD_C: f64 = 35.0;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Unexpected date value '{value}' in weather table")]
    BadDate { value: String },

    #[error("Failed to render chart: {0}")]
    Render(String),

    #[error("No weather data stored yet")]
    NoData,
}

fn parse_date(value: String) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|_| ReportError::BadDate { value })
}

/// Per city and UTC day: average, maximum and minimum temperature plus the
/// dominant condition, ordered by date then city.
///
/// The dominant condition is the most frequent label of the group; ties go to
/// the lexicographically greatest label.
pub fn daily_summary(store: &Store) -> Result<Vec<DailySummary>, ReportError> {
    let conn = store.connection();

    let mut dominant: HashMap<(String, String), String> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT city, DATE(timestamp, 'unixepoch') AS date, main, COUNT(*) AS n
         FROM weather
         WHERE main IS NOT NULL
         GROUP BY city, date, main
         ORDER BY n DESC, main DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
    })?;
    for row in rows {
        let (city, date, condition) = row?;
        // Rows arrive best-first, so the first label seen per group wins.
        dominant.entry((city, date)).or_insert(condition);
    }

    let mut stmt = conn.prepare(
        "SELECT city, DATE(timestamp, 'unixepoch') AS date,
                AVG(temp) AS avg_temp,
                MAX(temp) AS max_temp,
                MIN(temp) AS min_temp
         FROM weather
         GROUP BY city, date
         ORDER BY date, city",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, f64>(3)?,
            row.get::<_, f64>(4)?,
        ))
    })?;

    let mut summaries = Vec::new();
    for row in rows {
        let (city, date, avg_temp_c, max_temp_c, min_temp_c) = row?;
        let dominant_condition =
            dominant.remove(&(city.clone(), date.clone())).unwrap_or_default();

        summaries.push(DailySummary {
            date: parse_date(date)?,
            city,
            avg_temp_c,
            max_temp_c,
            min_temp_c,
            dominant_condition,
        });
    }

    debug!(groups = summaries.len(), "computed daily summary");
    Ok(summaries)
}

pub fn format_summary_line(summary: &DailySummary) -> String {
    format!(
        "{} | {} | Avg Temp: {:.2}°C | Max Temp: {:.2}°C | Min Temp: {:.2}°C | Dominant Weather: {}",
        summary.date.format(DATE_FORMAT),
        summary.city,
        summary.avg_temp_c,
        summary.max_temp_c,
        summary.min_temp_c,
        summary.dominant_condition,
    )
}

/// Average temperature per UTC day across all cities, in date order.
pub fn trend_points(store: &Store) -> Result<Vec<TrendPoint>, ReportError> {
    let mut stmt = store.connection().prepare(
        "SELECT DATE(timestamp, 'unixepoch') AS date, AVG(temp) AS avg_temp
         FROM weather
         GROUP BY date
         ORDER BY date",
    )?;
    let rows =
        stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?;

    let mut points = Vec::new();
    for row in rows {
        let (date, avg_temp_c) = row?;
        points.push(TrendPoint { date: parse_date(date)?, avg_temp_c });
    }
    Ok(points)
}

/// Query the trend and render it as a PNG line chart at `output`.
pub fn plot_trend(store: &Store, output: &Path) -> Result<(), ReportError> {
    let points = trend_points(store)?;
    render_trend(&points, output)
}

fn render_err(err: impl fmt::Display) -> ReportError {
    ReportError::Render(err.to_string())
}

pub fn render_trend(points: &[TrendPoint], output: &Path) -> Result<(), ReportError> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(ReportError::NoData);
    };

    let x_start = first.date.checked_sub_days(Days::new(1)).unwrap_or(first.date);
    let x_end = last.date.checked_add_days(Days::new(1)).unwrap_or(last.date);

    let (y_min, y_max) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.avg_temp_c), hi.max(p.avg_temp_c))
    });

    let root = BitMapBackend::new(output, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Daily Average Temperature Trend", ("sans-serif", 32).into_font())
        .margin(10)
        .x_label_area_size(110)
        .y_label_area_size(70)
        .build_cartesian_2d(x_start..x_end, (y_min - 1.0)..(y_max + 1.0))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Average Temperature (°C)")
        .x_labels(points.len().clamp(2, 12))
        .x_label_formatter(&|d: &NaiveDate| d.format(DATE_FORMAT).to_string())
        .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(points.iter().map(|p| (p.date, p.avg_temp_c)), &BLUE))
        .map_err(render_err)?;
    chart
        .draw_series(points.iter().map(|p| Circle::new((p.date, p.avg_temp_c), 4, BLUE.filled())))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;

    info!(path = %output.display(), points = points.len(), "rendered temperature trend");
    Ok(())
}

/// A temperature that went over the alert threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alert {
    pub threshold_c: f64,
    pub temperature_c: f64,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Alert: Temperature has exceeded {}°C! Current temperature: {}°C",
            self.threshold_c, self.temperature_c
        )
    }
}

/// Returns an alert when `temperature_c` is strictly above `threshold_c`.
pub fn check_alert(temperature_c: f64, threshold_c: f64) -> Option<Alert> {
    (temperature_c > threshold_c).then_some(Alert { threshold_c, temperature_c })
}
