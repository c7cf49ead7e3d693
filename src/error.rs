//! Errors raised by the transaction model, statistics and forecasting code.

/// The errors that may occur when building or analysing transactions.
///
/// Every variant is a rejected single operation. Callers can retry with
/// corrected input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Raw input could not be turned into a valid value, e.g. an amount that
    /// does not parse to a finite number or an id that is not an integer.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A statistic that needs at least one observation was given none.
    #[error("cannot compute {0} of an empty sequence")]
    EmptyInput(&'static str),

    /// Too few observations (or too few distinct time ordinals) to compute
    /// the requested result.
    #[error("need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A caller-supplied parameter is outside its accepted range.
    #[error("{value} is outside the accepted range {min}..={max}")]
    InvalidRange { value: f64, min: f64, max: f64 },
}

impl Error {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
