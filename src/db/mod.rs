mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, Row};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::path::Path;

use crate::models::{
    amount_from_f64, checked_amount, normalize_text, Transaction, TransactionCollection,
    TransactionKind, YearMonth, AMOUNT_SCALE, DEFAULT_CATEGORY,
};
use crate::stats::LedgerSummary;

/// Which rows a query or aggregate covers. Every field left as `None`
/// matches all rows.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Category name, compared after the same normalization stored
    /// categories get.
    pub category: Option<String>,
    /// Literal substring of the description, ignoring ASCII case.
    pub search: Option<String>,
    pub month: Option<YearMonth>,
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(name: &str) -> Self {
        Self {
            category: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn kind(kind: TransactionKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    fn where_clause(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut sql = String::from(" WHERE 1=1");
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(c) = &self.category {
            values.push(Box::new(normalize_text(c, DEFAULT_CATEGORY)));
            sql.push_str(&format!(" AND category = ?{}", values.len()));
        }
        if let Some(s) = &self.search {
            values.push(Box::new(format!("%{}%", escape_like(s.trim()))));
            sql.push_str(&format!(" AND description LIKE ?{} ESCAPE '\\'", values.len()));
        }
        if let Some(m) = &self.month {
            values.push(Box::new(format!("{m}%")));
            sql.push_str(&format!(" AND date LIKE ?{}", values.len()));
        }
        match self.kind {
            Some(TransactionKind::Income) => sql.push_str(" AND amount > 0"),
            Some(TransactionKind::Expense) => sql.push_str(" AND amount <= 0"),
            None => {}
        }

        (sql, values)
    }
}

/// The transaction store. Opened once at start-up and passed to whatever
/// needs it.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let db = Self { conn };
        db.create_schema().context("Failed to create schema")?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA)?;
        Ok(())
    }

    // ── Writes ────────────────────────────────────────────────

    /// Store a new transaction and return the id assigned to it.
    pub fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        if let Some(id) = txn.id() {
            anyhow::bail!("Transaction #{id} is already stored");
        }
        insert_row(&self.conn, txn)?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "inserted transaction");
        Ok(id)
    }

    /// Store many transactions in one database transaction.
    pub fn insert_transactions_batch(&mut self, txns: &[Transaction]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for txn in txns {
            if let Some(id) = txn.id() {
                anyhow::bail!("Transaction #{id} is already stored");
            }
            insert_row(&tx, txn)?;
        }
        tx.commit()?;
        tracing::debug!(count = txns.len(), "inserted transaction batch");
        Ok(txns.len())
    }

    /// Replace every field of a stored transaction. Returns `false` when no
    /// row has the transaction's id.
    pub fn update_transaction(&self, txn: &Transaction) -> Result<bool> {
        let id = txn
            .id()
            .ok_or_else(|| anyhow::anyhow!("Cannot update a transaction that has no id"))?;
        let changed = self.conn.execute(
            "UPDATE transactions SET date = ?1, description = ?2, amount = ?3, category = ?4
             WHERE id = ?5",
            params![
                txn.date(),
                txn.description(),
                storable_amount(txn)?,
                txn.category(),
                id
            ],
        )?;
        tracing::debug!(id, changed, "updated transaction");
        Ok(changed > 0)
    }

    /// Returns `false` when there was nothing to delete.
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        tracing::debug!(id, changed, "deleted transaction");
        Ok(changed > 0)
    }

    pub fn clear_all(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM transactions", [])?;
        tracing::debug!(removed, "cleared transactions");
        Ok(removed)
    }

    // ── Reads ─────────────────────────────────────────────────

    /// Every transaction, oldest first.
    pub fn get_transactions(&self) -> Result<TransactionCollection> {
        self.search_transactions(&TransactionFilter::all())
    }

    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let sql = format!("{} WHERE id = ?1", schema::SELECT_COLUMNS);
        let result = self.conn.query_row(&sql, params![id], row_to_transaction);
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_transactions_by_category(&self, name: &str) -> Result<TransactionCollection> {
        self.search_transactions(&TransactionFilter::category(name))
    }

    /// Transactions matching `filter`, oldest first.
    pub fn search_transactions(&self, filter: &TransactionFilter) -> Result<TransactionCollection> {
        let (where_sql, values) = filter.where_clause();
        let sql = format!("{}{where_sql} ORDER BY date, id", schema::SELECT_COLUMNS);
        let params_ref: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), row_to_transaction)?;
        let txns = rows.collect::<std::result::Result<TransactionCollection, _>>()?;
        tracing::debug!(count = txns.len(), ?filter, "loaded transactions");
        Ok(txns)
    }

    pub fn get_transaction_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    /// Distinct category names, sorted.
    pub fn get_categories(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM transactions ORDER BY category")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<std::result::Result<BTreeSet<String>, _>>()?)
    }

    // ── Aggregates ────────────────────────────────────────────

    /// Sum of the amounts of every row matching `filter`.
    pub fn aggregate_sum(&self, filter: &TransactionFilter) -> Result<Decimal> {
        let (where_sql, values) = filter.where_clause();
        let sql = format!("SELECT TOTAL(amount) FROM transactions{where_sql}");
        let params_ref: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let total: f64 = self
            .conn
            .query_row(&sql, params_ref.as_slice(), |row| row.get(0))?;
        Ok(stored_amount(total))
    }

    /// Total per category for rows matching `filter`, smallest total first
    /// so the biggest spending comes out on top.
    pub fn get_category_totals(&self, filter: &TransactionFilter) -> Result<Vec<(String, Decimal)>> {
        let (where_sql, values) = filter.where_clause();
        let sql = format!(
            "SELECT category, TOTAL(amount) FROM transactions{where_sql}
             GROUP BY category
             ORDER BY TOTAL(amount) ASC, category"
        );
        let params_ref: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;
        rows.map(|row| {
            let (name, total) = row?;
            Ok((name, stored_amount(total)))
        })
        .collect()
    }

    pub fn get_summary(&self) -> Result<LedgerSummary> {
        let (income, expenses, count): (f64, f64, i64) = self.conn.query_row(
            "SELECT TOTAL(CASE WHEN amount > 0 THEN amount END),
                    TOTAL(CASE WHEN amount <= 0 THEN -amount END),
                    COUNT(*)
             FROM transactions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let total_income = stored_amount(income);
        let total_expenses = stored_amount(expenses);
        Ok(LedgerSummary {
            total_income,
            total_expenses,
            net_balance: total_income - total_expenses,
            count: usize::try_from(count)?,
        })
    }
}

fn insert_row(conn: &Connection, txn: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (date, description, amount, category) VALUES (?1, ?2, ?3, ?4)",
        params![
            txn.date(),
            txn.description(),
            storable_amount(txn)?,
            txn.category()
        ],
    )?;
    Ok(())
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let id: i64 = row.get(0)?;
    let date: NaiveDate = row.get(1)?;
    let description: String = row.get(2)?;
    let amount: f64 = row.get(3)?;
    let category: String = row.get(4)?;
    let amount = amount_from_f64(amount)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Real, Box::new(e)))?;
    Ok(Transaction::new(date, &description, amount, &category).with_id(id))
}

/// The amount as it goes into the REAL column. Amounts built with
/// [`Transaction::new`] skip parsing, so they are checked here.
fn storable_amount(txn: &Transaction) -> Result<f64> {
    let amount = checked_amount(txn.amount())?;
    if amount != txn.amount() {
        anyhow::bail!(
            "Amount {} has more than {AMOUNT_SCALE} decimal places",
            txn.amount()
        );
    }
    Ok(txn.amount_f64())
}

/// A summed REAL column as a decimal. Sums past the decimal range saturate.
fn stored_amount(value: f64) -> Decimal {
    match Decimal::from_f64(value) {
        Some(d) => d.round_dp(AMOUNT_SCALE).normalize(),
        None => {
            tracing::warn!(value, "sum outside the decimal range");
            if value.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        }
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
