//! Demo data: a few months of salary, rent and everyday spending.
//!
//! The generator is deterministic so the same end date always produces the
//! same ledger.

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;

use crate::models::Transaction;

pub const DEFAULT_SEED_DAYS: u32 = 120;

/// Build demo transactions for the `days` days ending on `end`, oldest first.
pub fn demo_transactions(end: NaiveDate, days: u32) -> Vec<Transaction> {
    let start = end
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    let mut txns = Vec::new();

    for (i, date) in start.iter_days().take_while(|d| *d <= end).enumerate() {
        let i = i as i64;

        if date.day() == 15 || date.day() == 30 {
            txns.push(
                Transaction::new(date, "Salary", cents(250_000), "Salary").with_label("Employer"),
            );
        }
        if date.day() == 1 {
            txns.push(
                Transaction::new(date, "Rent Payment", cents(-120_000), "Rent")
                    .with_label("Landlord"),
            );
            txns.push(Transaction::new(date, "Internet Bill", cents(-6_000), "Utilities"));
        }

        if i % 10 < 7 {
            let amount = 1_000 + (i * 379) % 4_000;
            txns.push(Transaction::new(date, "Groceries/Lunch", cents(-amount), "Food"));
        }
        if i % 5 < 2 {
            let amount = 500 + (i * 211) % 1_500;
            txns.push(Transaction::new(date, "Uber/Gas", cents(-amount), "Transportation"));
        }
        if i % 5 == 4 {
            let amount = 2_000 + (i * 733) % 8_000;
            txns.push(Transaction::new(date, "Movies/Games", cents(-amount), "Entertainment"));
        }
        if i % 10 == 3 {
            let amount = 5_000 + (i * 1_117) % 15_000;
            txns.push(Transaction::new(date, "Online Shopping", cents(-amount), "Shopping"));
        }
        if i % 20 == 7 {
            let amount = 20_000 + (i * 2_341) % 60_000;
            txns.push(
                Transaction::new(date, "Freelance Job", cents(amount), "Freelance")
                    .with_label("Client"),
            );
        }
    }

    txns
}

fn cents(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use rust_decimal_macros::dec;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    #[test]
    fn test_demo_is_deterministic() {
        let a = demo_transactions(end(), DEFAULT_SEED_DAYS);
        let b = demo_transactions(end(), DEFAULT_SEED_DAYS);
        assert_eq!(a.len(), b.len());
        assert!(a
            .iter()
            .zip(&b)
            .all(|(x, y)| x.date() == y.date() && x.amount() == y.amount()));
    }

    #[test]
    fn test_demo_spans_requested_window() {
        let txns = demo_transactions(end(), 30);
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(txns.iter().all(|t| t.date() >= start && t.date() <= end()));
        assert!(txns.windows(2).all(|w| w[0].date() <= w[1].date()));
    }

    #[test]
    fn test_demo_recurring_entries() {
        let txns = demo_transactions(end(), 30);
        let salaries: Vec<_> = txns.iter().filter(|t| t.category() == "Salary").collect();
        assert_eq!(salaries.len(), 2);
        assert!(salaries.iter().all(|t| t.amount() == dec!(2500)));
        assert_eq!(salaries[0].source(), Some("Employer"));

        let rent: Vec<_> = txns.iter().filter(|t| t.category() == "Rent").collect();
        assert_eq!(rent.len(), 1);
        assert_eq!(rent[0].amount(), dec!(-1200));
        assert_eq!(rent[0].merchant(), Some("Landlord"));
    }

    #[test]
    fn test_demo_amount_ranges() {
        let txns = demo_transactions(end(), DEFAULT_SEED_DAYS);
        for t in txns.iter().filter(|t| t.category() == "Food") {
            assert!(t.amount() <= dec!(-10) && t.amount() > dec!(-50));
        }
        assert!(txns.iter().all(|t| t.id().is_none()));
    }
}
