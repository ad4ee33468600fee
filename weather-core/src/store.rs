//! SQLite persistence for weather samples.
//!
//! One [`Store`] is opened per run and handed to every component that needs
//! it; the connection closes when the store is dropped.

use std::path::Path;

use rusqlite::{Connection, params};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::WeatherSample;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

const CREATE_WEATHER_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS weather (
        id INTEGER PRIMARY KEY,
        city TEXT,
        temp REAL,
        feels_like REAL,
        main TEXT,
        timestamp INTEGER
    )";

#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening weather database");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the `weather` table if it does not exist yet.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(CREATE_WEATHER_TABLE)?;
        debug!("weather table ready");
        Ok(())
    }

    /// Append one sample; returns the new row id.
    pub fn insert(&self, sample: &WeatherSample) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO weather (city, temp, feels_like, main, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                sample.city,
                sample.temperature_c,
                sample.feels_like_c,
                sample.condition,
                sample.observed_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(id, city = %sample.city, "inserted weather sample");
        Ok(id)
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM weather", [], |row| row.get(0))?;
        Ok(u64::try_from(n).unwrap_or_default())
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}
