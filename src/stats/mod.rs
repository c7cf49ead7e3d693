//! Descriptive statistics over amounts and bucketed totals over transactions.
//!
//! Everything here is a pure function. Functions that need observations
//! return [`Error::EmptyInput`] or [`Error::InsufficientData`] rather than a
//! placeholder value.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::models::{Transaction, YearMonth};

/// Mean, median, mode, spread and range of a sequence of amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Skewness and excess kurtosis of a sequence of amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub skewness: f64,
    pub kurtosis: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CashFlow {
    pub income: Decimal,
    /// Magnitude of the money that went out, always zero or positive.
    pub expenses: Decimal,
}

impl CashFlow {
    pub fn net(&self) -> Decimal {
        self.income - self.expenses
    }
}

/// Income, expense and balance totals of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LedgerSummary {
    pub total_income: Decimal,
    /// Magnitude of all expenses, always zero or positive.
    pub total_expenses: Decimal,
    pub net_balance: Decimal,
    pub count: usize,
}

pub fn compute_stats(amounts: &[f64]) -> Result<Summary> {
    if amounts.is_empty() {
        return Err(Error::EmptyInput("statistics"));
    }
    let (min, max) = min_max(amounts)?;
    Ok(Summary {
        count: amounts.len(),
        mean: mean(amounts)?,
        median: median(amounts)?,
        mode: mode(amounts)?,
        std_dev: sample_std_dev(amounts)?,
        min,
        max,
    })
}

pub fn mean(amounts: &[f64]) -> Result<f64> {
    if amounts.is_empty() {
        return Err(Error::EmptyInput("mean"));
    }
    Ok(amounts.iter().sum::<f64>() / amounts.len() as f64)
}

pub fn median(amounts: &[f64]) -> Result<f64> {
    if amounts.is_empty() {
        return Err(Error::EmptyInput("median"));
    }
    let sorted = sorted(amounts);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// The most frequent value. Ties go to the value seen first.
pub fn mode(amounts: &[f64]) -> Result<f64> {
    if amounts.is_empty() {
        return Err(Error::EmptyInput("mode"));
    }

    // key -> (count, first index)
    let mut counts: HashMap<u64, (usize, usize)> = HashMap::new();
    for (i, &x) in amounts.iter().enumerate() {
        counts.entry(value_key(x)).or_insert((0, i)).0 += 1;
    }

    let (_, first) = counts
        .values()
        .copied()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .ok_or(Error::EmptyInput("mode"))?;
    Ok(amounts[first])
}

/// Sample standard deviation (n - 1 denominator). A single observation has
/// no spread and reports zero.
pub fn sample_std_dev(amounts: &[f64]) -> Result<f64> {
    let m = mean(amounts)?;
    if amounts.len() < 2 {
        return Ok(0.0);
    }
    let sum_sq: f64 = amounts.iter().map(|x| (x - m).powi(2)).sum();
    Ok((sum_sq / (amounts.len() - 1) as f64).sqrt())
}

/// Population skewness and Fisher (excess) kurtosis.
///
/// A series without variance has no defined shape and reports zero for both.
pub fn shape(amounts: &[f64]) -> Result<Shape> {
    if amounts.len() < 3 {
        return Err(Error::InsufficientData {
            required: 3,
            actual: amounts.len(),
        });
    }
    let n = amounts.len() as f64;
    let m = mean(amounts)?;
    let moment = |k: i32| amounts.iter().map(|x| (x - m).powi(k)).sum::<f64>() / n;
    let m2 = moment(2);
    if m2 <= f64::EPSILON * m.abs().max(1.0) {
        return Ok(Shape {
            skewness: 0.0,
            kurtosis: 0.0,
        });
    }
    Ok(Shape {
        skewness: moment(3) / m2.powf(1.5),
        kurtosis: moment(4) / (m2 * m2) - 3.0,
    })
}

/// The `p`th percentile, interpolating linearly between the two closest
/// ranks.
pub fn percentile(amounts: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(Error::InvalidRange {
            value: p,
            min: 0.0,
            max: 100.0,
        });
    }
    if amounts.is_empty() {
        return Err(Error::EmptyInput("percentile"));
    }
    let sorted = sorted(amounts);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// The 25th and 75th percentiles.
pub fn quartiles(amounts: &[f64]) -> Result<(f64, f64)> {
    Ok((percentile(amounts, 25.0)?, percentile(amounts, 75.0)?))
}

pub fn cumulative_sum(amounts: &[f64]) -> Vec<f64> {
    amounts
        .iter()
        .scan(0.0, |acc, &x| {
            *acc += x;
            Some(*acc)
        })
        .collect()
}

/// Total amount per category.
pub fn category_totals<'a, I>(transactions: I) -> HashMap<String, Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: HashMap<String, Decimal> = HashMap::new();
    for txn in transactions {
        *totals.entry(txn.category().to_string()).or_default() += txn.amount();
    }
    totals
}

/// Total amount per calendar month, oldest first.
pub fn monthly_totals<'a, I>(transactions: I) -> BTreeMap<YearMonth, Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for txn in transactions {
        *totals.entry(YearMonth::of(txn.date())).or_default() += txn.amount();
    }
    totals
}

/// Income and expenses per calendar month, oldest first.
pub fn monthly_cash_flow<'a, I>(transactions: I) -> BTreeMap<YearMonth, CashFlow>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut flows: BTreeMap<YearMonth, CashFlow> = BTreeMap::new();
    for txn in transactions {
        let flow = flows.entry(YearMonth::of(txn.date())).or_default();
        if txn.is_income() {
            flow.income += txn.amount();
        } else {
            flow.expenses += txn.abs_amount();
        }
    }
    flows
}

/// Share of total spending per category, as a percentage rounded to one
/// decimal place. Largest share first.
pub fn expense_share<'a, I>(transactions: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let totals = category_totals(transactions.into_iter().filter(|t| t.is_expense()));
    let grand: Decimal = totals.values().map(|v| v.abs()).sum();
    if grand.is_zero() {
        return Vec::new();
    }

    let mut shares: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(category, total)| {
            let pct = (total.abs() / grand * Decimal::ONE_HUNDRED).round_dp(1);
            (category, pct.to_f64().unwrap_or_default())
        })
        .collect();
    shares.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    shares
}

pub fn ledger_summary<'a, I>(transactions: I) -> LedgerSummary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut summary = LedgerSummary::default();
    for txn in transactions {
        if txn.is_income() {
            summary.total_income += txn.amount();
        } else {
            summary.total_expenses += txn.abs_amount();
        }
        summary.count += 1;
    }
    summary.net_balance = summary.total_income - summary.total_expenses;
    summary
}

fn min_max(amounts: &[f64]) -> Result<(f64, f64)> {
    let first = *amounts.first().ok_or(Error::EmptyInput("range"))?;
    Ok(amounts
        .iter()
        .fold((first, first), |(lo, hi), &x| (lo.min(x), hi.max(x))))
}

fn sorted(amounts: &[f64]) -> Vec<f64> {
    let mut v = amounts.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

// -0.0 and 0.0 count as the same value.
fn value_key(x: f64) -> u64 {
    if x == 0.0 {
        0.0f64.to_bits()
    } else {
        x.to_bits()
    }
}
