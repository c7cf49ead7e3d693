use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::forecast::ForecastConfig;

pub const DB_ENV: &str = "FINTRACK_DB";
pub const TREND_THRESHOLD_ENV: &str = "FINTRACK_TREND_THRESHOLD";
const DB_FILE_NAME: &str = "fintrack.db";

/// Settings resolved once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub forecast: ForecastConfig,
}

impl Config {
    /// Resolve the configuration from the `--db` flag and the process
    /// environment.
    pub fn load(db_flag: Option<PathBuf>) -> Result<Self> {
        Self::resolve(db_flag, |key| std::env::var(key).ok())
    }

    /// The database path comes from the flag, then `FINTRACK_DB`, then the
    /// per-user data directory.
    pub fn resolve(db_flag: Option<PathBuf>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = match db_flag.or_else(|| env(DB_ENV).map(PathBuf::from)) {
            Some(path) => path,
            None => default_db_path()?,
        };

        let mut forecast = ForecastConfig::default();
        if let Some(raw) = env(TREND_THRESHOLD_ENV) {
            forecast.trend_threshold = parse_threshold(&raw)
                .with_context(|| format!("Invalid {TREND_THRESHOLD_ENV}: {raw:?}"))?;
        }

        Ok(Self { db_path, forecast })
    }
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse()?;
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("threshold must be a finite, non-negative number");
    }
    Ok(value)
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "Fintrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join(DB_FILE_NAME))
}
