#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;
use std::path::PathBuf;

use super::cli::{as_cli, take_db_flag};
use crate::config::Config;
use crate::db::Database;
use crate::forecast::ForecastConfig;

fn config() -> Config {
    Config {
        db_path: PathBuf::from(":memory:"),
        forecast: ForecastConfig::default(),
    }
}

fn run(db: &mut Database, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["fintrack".to_string()];
    full.extend(args.iter().map(|a| a.to_string()));
    as_cli(&full, db, &config())
}

fn seeded() -> Database {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["add", "2025-01-01", "Paycheck", "2500", "Salary", "--label", "acme"]).unwrap();
    run(&mut db, &["add", "2025-01-02", "Groceries", "-45.20", "Food"]).unwrap();
    run(&mut db, &["add", "2025-01-05", "Bus pass", "-30", "Transport"]).unwrap();
    run(&mut db, &["add", "2025-02-03", "Lunch", "-12.80", "Food"]).unwrap();
    db
}

// ── Dispatch ──────────────────────────────────────────────────

#[test]
fn test_no_command_shows_dashboard() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &[]).is_ok());
    let mut db = seeded();
    assert!(run(&mut db, &[]).is_ok());
}

#[test]
fn test_unknown_command() {
    let mut db = Database::open_in_memory().unwrap();
    let err = run(&mut db, &["frobnicate"]).unwrap_err();
    assert!(err.to_string().contains("Unknown command"));
}

#[test]
fn test_help_and_version() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["help"]).is_ok());
    assert!(run(&mut db, &["--version"]).is_ok());
}

// ── Writes ────────────────────────────────────────────────────

#[test]
fn test_add_stores_transaction() {
    let db = seeded();
    let txns = db.get_transactions().unwrap();
    assert_eq!(txns.len(), 4);
    let groceries = &txns.as_slice()[1];
    assert_eq!(groceries.description(), "Groceries");
    assert_eq!(groceries.amount(), dec!(-45.20));
    assert_eq!(groceries.category(), "Food");
}

#[test]
fn test_add_defaults_category() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["add", "2025-03-01", "Mystery", "-5"]).unwrap();
    let txns = db.get_transactions().unwrap();
    assert_eq!(txns.as_slice()[0].category(), "General");
}

#[test]
fn test_add_today() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["add", "today", "Coffee", "-3.50", "Food"]).unwrap();
    let txns = db.get_transactions().unwrap();
    assert_eq!(txns.as_slice()[0].date(), chrono::Local::now().date_naive());
}

#[test]
fn test_add_rejects_bad_input() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["add", "2025-13-01", "Bad", "-1"]).is_err());
    assert!(run(&mut db, &["add", "2025-01-01", "Bad", "abc"]).is_err());
    assert!(run(&mut db, &["add", "2025-01-01", "Bad"]).is_err());
    assert_eq!(db.get_transaction_count().unwrap(), 0);
}

#[test]
fn test_update_replaces_fields() {
    let mut db = seeded();
    run(&mut db, &["update", "2", "2025-01-03", "Market", "-50", "Groceries"]).unwrap();
    let txn = db.get_transaction(2).unwrap().unwrap();
    assert_eq!(txn.description(), "Market");
    assert_eq!(txn.amount(), dec!(-50));
    assert_eq!(txn.category(), "Groceries");
}

#[test]
fn test_update_unknown_id() {
    let mut db = seeded();
    let err = run(&mut db, &["update", "99", "2025-01-03", "Market", "-50"]).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_delete() {
    let mut db = seeded();
    run(&mut db, &["delete", "3"]).unwrap();
    assert_eq!(db.get_transaction_count().unwrap(), 3);
    assert!(db.get_transaction(3).unwrap().is_none());
    assert!(run(&mut db, &["rm", "3"]).is_err());
    assert!(run(&mut db, &["delete", "abc"]).is_err());
    assert!(run(&mut db, &["delete"]).is_err());
}

#[test]
fn test_clear_needs_confirmation() {
    let mut db = seeded();
    assert!(run(&mut db, &["clear"]).is_err());
    assert_eq!(db.get_transaction_count().unwrap(), 4);
    run(&mut db, &["clear", "--yes"]).unwrap();
    assert_eq!(db.get_transaction_count().unwrap(), 0);
}

#[test]
fn test_seed_replaces_contents() {
    let mut db = seeded();
    run(&mut db, &["seed"]).unwrap();
    let txns = db.get_transactions().unwrap();
    assert!(txns.len() > 4);
    assert!(txns.iter().all(|t| t.description() != "Bus Pass"));
}

// ── Reads ─────────────────────────────────────────────────────

#[test]
fn test_read_commands_succeed() {
    let mut db = seeded();
    for args in [
        vec!["list"],
        vec!["ls", "--category", "food"],
        vec!["list", "--month", "2025-01", "--expense"],
        vec!["list", "--search", "bus"],
        vec!["list", "--match", "^(Groc|Lun)"],
        vec!["categories"],
        vec!["stats"],
        vec!["stats", "--category", "Food"],
        vec!["monthly"],
        vec!["breakdown"],
        vec!["forecast"],
        vec!["forecast", "7", "--all"],
        vec!["forecast", "3", "--by-index"],
        vec!["dashboard"],
    ] {
        assert!(run(&mut db, &args).is_ok(), "{args:?} failed");
    }
}

#[test]
fn test_list_rejects_bad_filters() {
    let mut db = seeded();
    assert!(run(&mut db, &["list", "--month", "January"]).is_err());
    assert!(run(&mut db, &["list", "--income", "--expense"]).is_err());
    assert!(run(&mut db, &["list", "--match", "("]).is_err());
}

#[test]
fn test_stats_on_empty_store() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["stats"]).is_err());
}

#[test]
fn test_forecast_needs_history_and_valid_horizon() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["add", "2025-01-01", "Only", "-10"]).unwrap();
    assert!(run(&mut db, &["forecast"]).is_err());

    let mut db = seeded();
    assert!(run(&mut db, &["forecast", "0"]).is_err());
    assert!(run(&mut db, &["forecast", "366"]).is_err());
    assert!(run(&mut db, &["forecast", "ten"]).is_err());
}

#[test]
fn test_export_writes_file() {
    let mut db = seeded();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let path_str = path.to_str().unwrap();
    run(&mut db, &["export", path_str, "--month", "2025-01"]).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("id,date,description"));
}

// ── --db flag ─────────────────────────────────────────────────

#[test]
fn test_take_db_flag() {
    let mut args: Vec<String> = ["fintrack", "--db", "/tmp/x.db", "list"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let path = take_db_flag(&mut args).unwrap();
    assert_eq!(path, Some(PathBuf::from("/tmp/x.db")));
    assert_eq!(args, vec!["fintrack", "list"]);
}

#[test]
fn test_take_db_flag_absent_or_dangling() {
    let mut args = vec!["fintrack".to_string(), "list".to_string()];
    assert_eq!(take_db_flag(&mut args).unwrap(), None);

    let mut args = vec!["fintrack".to_string(), "--db".to_string()];
    assert!(take_db_flag(&mut args).is_err());
}
