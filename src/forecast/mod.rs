//! Linear trend fitting and projection.
//!
//! Fits `amount = slope * ordinal + intercept` by ordinary least squares and
//! projects the line forward. Ordinals are either positions in a series or
//! days since the first transaction.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::models::Transaction;

pub const DEFAULT_TREND_THRESHOLD: f64 = 0.01;
pub const MIN_HORIZON: u32 = 1;
pub const MAX_HORIZON: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastConfig {
    /// Slopes within `-trend_threshold..=trend_threshold` count as stable.
    pub trend_threshold: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            trend_threshold: DEFAULT_TREND_THRESHOLD,
        }
    }
}

/// One observation (or projection) on the time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub ordinal: i64,
    pub amount: f64,
}

impl TrendPoint {
    pub fn new(ordinal: i64, amount: f64) -> Self {
        Self { ordinal, amount }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination on the training points, in `0.0..=1.0`.
    pub r_squared: f64,
    pub observations: usize,
}

impl LinearFit {
    pub fn predict(&self, ordinal: i64) -> f64 {
        self.slope * ordinal as f64 + self.intercept
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn classify(slope: f64, config: &ForecastConfig) -> Self {
        if slope > config.trend_threshold {
            Self::Up
        } else if slope < -config.trend_threshold {
            Self::Down
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub fit: LinearFit,
    pub direction: TrendDirection,
    pub projections: Vec<TrendPoint>,
}

/// Fit a least-squares line through `points`.
///
/// Needs at least two distinct ordinals. R² is reported as zero when every
/// amount is the same.
pub fn fit_linear(points: &[TrendPoint]) -> Result<LinearFit> {
    let distinct = points.iter().map(|p| p.ordinal).collect::<BTreeSet<_>>().len();
    if distinct < 2 {
        return Err(Error::InsufficientData {
            required: 2,
            actual: distinct,
        });
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.ordinal as f64).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.amount).sum::<f64>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), p| {
        let dx = p.ordinal as f64 - mean_x;
        (sxx + dx * dx, sxy + dx * (p.amount - mean_y))
    });

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = points.iter().map(|p| (p.amount - mean_y).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|p| (p.amount - (slope * p.ordinal as f64 + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
        observations: points.len(),
    })
}

/// Fit `points` and project the next `horizon` ordinals past the last one
/// observed.
pub fn forecast(points: &[TrendPoint], horizon: u32, config: &ForecastConfig) -> Result<Forecast> {
    if !(MIN_HORIZON..=MAX_HORIZON).contains(&horizon) {
        return Err(Error::InvalidRange {
            value: f64::from(horizon),
            min: f64::from(MIN_HORIZON),
            max: f64::from(MAX_HORIZON),
        });
    }
    let fit = fit_linear(points)?;
    let last = points.iter().map(|p| p.ordinal).max().unwrap_or_default();
    let projections = (1..=i64::from(horizon))
        .map(|step| {
            let ordinal = last + step;
            TrendPoint::new(ordinal, fit.predict(ordinal))
        })
        .collect();

    tracing::debug!(
        slope = fit.slope,
        r_squared = fit.r_squared,
        horizon,
        "fitted trend"
    );

    Ok(Forecast {
        fit,
        direction: TrendDirection::classify(fit.slope, config),
        projections,
    })
}

/// Use each amount's position in the series as its ordinal.
pub fn points_by_index(amounts: &[f64]) -> Vec<TrendPoint> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| TrendPoint::new(i as i64, amount))
        .collect()
}

/// Use days since the earliest transaction as the ordinal, oldest first.
pub fn points_by_day<'a, I>(transactions: I) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    day_points(transactions.into_iter().map(|t| (t, t.amount_f64())))
}

/// Like [`points_by_day`] but only for expenses, using the amount spent as
/// a positive number.
pub fn expense_points_by_day<'a, I>(transactions: I) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    day_points(
        transactions
            .into_iter()
            .filter(|t| t.is_expense())
            .map(|t| (t, t.amount_f64().abs())),
    )
}

fn day_points<'a>(items: impl Iterator<Item = (&'a Transaction, f64)>) -> Vec<TrendPoint> {
    let mut items: Vec<_> = items.collect();
    items.sort_by_key(|(t, _)| t.date());
    let Some(first) = items.first().map(|(t, _)| t.date()) else {
        return Vec::new();
    };
    items
        .into_iter()
        .map(|(t, amount)| TrendPoint::new((t.date() - first).num_days(), amount))
        .collect()
}
