mod collection;
mod month;
mod transaction;

pub use collection::TransactionCollection;
pub use month::YearMonth;
pub use transaction::{
    amount_from_f64, checked_amount, normalize_text, parse_amount, parse_date, parse_id,
    round_to_cents, title_case, RawAmount, Transaction, TransactionKind, AMOUNT_SCALE,
    DATE_FORMAT, DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, MAX_AMOUNT,
};
