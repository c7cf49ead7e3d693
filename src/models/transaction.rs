use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_DESCRIPTION: &str = "No Description";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Decimal places kept on an amount. The store reads amounts back at this
/// scale.
pub const AMOUNT_SCALE: u32 = 6;

/// Amounts must stay below this magnitude so a REAL column holds them
/// exactly at [`AMOUNT_SCALE`].
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Whether a transaction brings money in or sends it out.
///
/// Derived from the sign of the amount; it is never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Positive amounts are income, everything else (including zero) is an
    /// expense.
    pub fn of(amount: Decimal) -> Self {
        if amount > Decimal::ZERO {
            Self::Income
        } else {
            Self::Expense
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An amount as it arrives from a form, the command line or a database row.
#[derive(Debug, Clone, Copy)]
pub enum RawAmount<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for RawAmount<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}

impl<'a> From<&'a String> for RawAmount<'a> {
    fn from(s: &'a String) -> Self {
        Self::Text(s.as_str())
    }
}

impl From<f64> for RawAmount<'_> {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl RawAmount<'_> {
    pub fn parse(self) -> Result<Decimal> {
        match self {
            Self::Text(s) => parse_amount(s),
            Self::Number(n) => amount_from_f64(n),
        }
    }
}

/// A single money movement.
///
/// Text fields are normalized on construction and the id can only be set
/// once, by the store, after the row has been written. Two transactions are
/// equal when their ids are equal.
#[derive(Debug, Clone)]
pub struct Transaction {
    id: Option<i64>,
    date: NaiveDate,
    description: String,
    amount: Decimal,
    category: String,
    label: Option<String>,
}

impl Transaction {
    /// Build an unsaved transaction from already-typed values.
    pub fn new(date: NaiveDate, description: &str, amount: Decimal, category: &str) -> Self {
        Self {
            id: None,
            date,
            description: normalize_text(description, DEFAULT_DESCRIPTION),
            amount,
            category: normalize_text(category, DEFAULT_CATEGORY),
            label: None,
        }
    }

    /// Build a transaction from raw field values, validating each one.
    ///
    /// `id` is `None` for a transaction that has not been stored yet.
    pub fn from_raw<'a>(
        id: Option<&str>,
        date: &str,
        description: &str,
        amount: impl Into<RawAmount<'a>>,
        category: &str,
    ) -> Result<Self> {
        let id = id.map(parse_id).transpose()?;
        let date = parse_date(date)?;
        let amount = amount.into().parse()?;
        let mut txn = Self::new(date, description, amount, category);
        txn.id = id;
        Ok(txn)
    }

    /// Attach the income source or expense merchant.
    pub fn with_label(mut self, label: &str) -> Self {
        let trimmed = label.trim();
        self.label = if trimmed.is_empty() {
            None
        } else {
            Some(title_case(trimmed))
        };
        self
    }

    /// Stamp the id assigned by the store. An id that is already set wins.
    pub(crate) fn with_id(mut self, id: i64) -> Self {
        if self.id.is_none() {
            self.id = Some(id);
        }
        self
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The amount as a float, for the statistics and forecasting code.
    pub fn amount_f64(&self) -> f64 {
        // Every Decimal converts to an f64.
        self.amount.to_f64().unwrap_or_default()
    }

    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> TransactionKind {
        TransactionKind::of(self.amount)
    }

    pub fn is_income(&self) -> bool {
        self.kind() == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind() == TransactionKind::Expense
    }

    /// Where an income came from. `None` for expenses.
    pub fn source(&self) -> Option<&str> {
        match self.kind() {
            TransactionKind::Income => self.label(),
            TransactionKind::Expense => None,
        }
    }

    /// Who an expense was paid to. `None` for income.
    pub fn merchant(&self) -> Option<&str> {
        match self.kind() {
            TransactionKind::Expense => self.label(),
            TransactionKind::Income => None,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "Transaction #{id}: ")?,
            None => write!(f, "Transaction #new: ")?,
        }
        write!(
            f,
            "{} {} {:.2} [{}]",
            self.date.format(DATE_FORMAT),
            self.description,
            round_to_cents(self.amount),
            self.category
        )
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Transaction {}

impl PartialOrd for Transaction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Transaction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

/// Parse a user-entered amount. Accepts an optional sign, a `$` and
/// thousands separators, e.g. `-$1,234.50`.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("amount", "amount is empty"));
    }
    let cleaned = trimmed.replace(['$', ','], "");
    let cleaned = cleaned.trim();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(cleaned);
    let value = Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .map_err(|_| Error::validation("amount", format!("{raw:?} is not a finite number")))?;
    checked_amount(value)
}

pub fn amount_from_f64(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(Error::validation(
            "amount",
            format!("{value} is not a finite number"),
        ));
    }
    let value = Decimal::from_f64(value)
        .ok_or_else(|| Error::validation("amount", format!("{value} is out of range")))?;
    checked_amount(value)
}

/// Round `value` to [`AMOUNT_SCALE`] places and check it fits the store.
///
/// A non-zero amount that would round to zero is rejected so its kind
/// cannot flip from income to expense.
pub fn checked_amount(value: Decimal) -> Result<Decimal> {
    if value.abs() >= MAX_AMOUNT {
        return Err(Error::validation(
            "amount",
            format!("{value} is not below {MAX_AMOUNT} in magnitude"),
        ));
    }
    let rounded =
        value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() && !value.is_zero() {
        return Err(Error::validation(
            "amount",
            format!("{value} is smaller than the smallest stored unit"),
        ));
    }
    if rounded.is_zero() {
        return Ok(Decimal::ZERO);
    }
    Ok(rounded.normalize())
}

/// `amount` rounded half away from zero to two places, for display.
pub fn round_to_cents(amount: Decimal) -> Decimal {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

pub fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::validation("id", format!("{raw:?} is not an integer")))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| Error::validation("date", format!("{raw:?} is not a YYYY-MM-DD date")))
}

/// Trim and title-case `raw`, falling back to `default` when nothing is left.
pub fn normalize_text(raw: &str, default: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        title_case(trimmed)
    }
}

/// Upper-case each letter that follows a non-letter and lower-case the rest.
///
/// A letter whose upper case is several characters keeps only the first one
/// upper-cased, so `ß` becomes `Ss`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                let mut upper = c.to_uppercase();
                if let Some(first) = upper.next() {
                    out.push(first);
                }
                out.extend(upper.flat_map(char::to_lowercase));
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
