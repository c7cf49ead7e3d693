use regex::Regex;
use rust_decimal::Decimal;

use super::Transaction;

/// Transactions in the order they were added.
///
/// There is no index; every query is a full scan, which is fine at the size
/// of a personal ledger.
#[derive(Debug, Clone, Default)]
pub struct TransactionCollection {
    transactions: Vec<Transaction>,
}

impl TransactionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, txn: Transaction) {
        self.transactions.push(txn);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn amounts(&self) -> Vec<f64> {
        self.transactions.iter().map(Transaction::amount_f64).collect()
    }

    pub fn total(&self) -> Decimal {
        self.transactions.iter().map(Transaction::amount).sum()
    }

    pub fn incomes(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_income())
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|t| t.is_expense())
    }

    /// Transactions whose category matches `name`, ignoring case.
    pub fn in_category<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Transaction> + 'a {
        let lower = name.trim().to_lowercase();
        self.transactions
            .iter()
            .filter(move |t| t.category().to_lowercase() == lower)
    }

    /// Transactions whose description matches `pattern`.
    pub fn matching<'a>(&'a self, pattern: &'a Regex) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |t| pattern.is_match(t.description()))
    }
}

impl From<Vec<Transaction>> for TransactionCollection {
    fn from(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }
}

impl FromIterator<Transaction> for TransactionCollection {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a Transaction> for TransactionCollection {
    fn from_iter<I: IntoIterator<Item = &'a Transaction>>(iter: I) -> Self {
        iter.into_iter().cloned().collect()
    }
}

impl IntoIterator for TransactionCollection {
    type Item = Transaction;
    type IntoIter = std::vec::IntoIter<Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.into_iter()
    }
}

impl<'a> IntoIterator for &'a TransactionCollection {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}
