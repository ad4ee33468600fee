use chrono::NaiveDate;

/// One observation as returned by a provider and stored in the `weather` table.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSample {
    /// City exactly as the caller spelled it.
    pub city: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    /// Short condition label, e.g. "Clouds".
    pub condition: String,
    /// Unix seconds as reported by the provider, not the local fetch time.
    pub observed_at: i64,
}

/// Aggregate of all samples for one city on one UTC calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub city: String,
    pub avg_temp_c: f64,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub dominant_condition: String,
}

/// Average temperature for one UTC calendar day across every city.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub avg_temp_c: f64,
}
