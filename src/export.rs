use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::models::{round_to_cents, TransactionCollection, DATE_FORMAT};

const HEADER: [&str; 6] = ["id", "date", "description", "amount", "category", "kind"];

/// Write `txns` as CSV, in collection order. Returns the number of rows
/// written, not counting the header.
pub fn write_csv<W: Write>(txns: &TransactionCollection, writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;
    for txn in txns {
        let id = txn.id().map(|id| id.to_string()).unwrap_or_default();
        wtr.write_record([
            id,
            txn.date().format(DATE_FORMAT).to_string(),
            txn.description().to_string(),
            format!("{:.2}", round_to_cents(txn.amount())),
            txn.category().to_string(),
            txn.kind().to_string(),
        ])?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(txns.len())
}

pub fn export_to_path(txns: &TransactionCollection, path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let count = write_csv(txns, file)?;
    tracing::info!(count, path = %path.display(), "exported transactions");
    Ok(count)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::models::Transaction;

    fn sample() -> TransactionCollection {
        vec![
            Transaction::from_raw(Some("2"), "2025-01-05", "coffee, large", "-3.5", "food")
                .unwrap(),
            Transaction::from_raw(Some("1"), "2025-01-10", "salary", "2000", "income").unwrap(),
        ]
        .into()
    }

    #[test]
    fn test_write_csv_keeps_order() {
        let mut out = Vec::new();
        let count = write_csv(&sample(), &mut out).unwrap();
        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "id,date,description,amount,category,kind",
                "2,2025-01-05,\"Coffee, Large\",-3.50,Food,Expense",
                "1,2025-01-10,Salary,2000.00,Income,Income",
            ]
        );
    }

    #[test]
    fn test_write_csv_rounds_sub_cent_amounts() {
        let txns: TransactionCollection = vec![
            Transaction::from_raw(Some("1"), "2025-01-05", "fee", "-0.019", "bank").unwrap(),
            Transaction::from_raw(Some("2"), "2025-01-06", "interest", "1.239", "bank").unwrap(),
        ]
        .into();
        let mut out = Vec::new();
        write_csv(&txns, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "1,2025-01-05,Fee,-0.02,Bank,Expense");
        assert_eq!(lines[2], "2,2025-01-06,Interest,1.24,Bank,Income");
    }

    #[test]
    fn test_write_csv_empty() {
        let mut out = Vec::new();
        assert_eq!(write_csv(&TransactionCollection::new(), &mut out).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert_eq!(export_to_path(&sample(), &path).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
