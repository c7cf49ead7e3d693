use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use regex::Regex;
use std::path::{Path, PathBuf};

use super::util::{bar, format_amount, format_value, truncate};
use crate::config::Config;
use crate::db::{Database, TransactionFilter};
use crate::export;
use crate::forecast::{self, TrendPoint};
use crate::models::{parse_id, Transaction, TransactionCollection, TransactionKind, YearMonth};
use crate::seed;
use crate::stats;

/// Flags that consume the argument after them.
const VALUE_FLAGS: &[&str] = &["--category", "--search", "--month", "--match", "--label", "--db"];

const DEFAULT_HORIZON: u32 = 30;
const DASHBOARD_ROWS: usize = 5;

/// Run the command named by `args[1]`. With no command, print the dashboard.
pub fn as_cli(args: &[String], db: &mut Database, config: &Config) -> Result<()> {
    let Some(command) = args.get(1) else {
        return cli_dashboard(db);
    };
    let rest = &args[2..];
    match command.as_str() {
        "dashboard" | "d" => cli_dashboard(db),
        "add" => cli_add(rest, db),
        "update" => cli_update(rest, db),
        "delete" | "rm" => cli_delete(rest, db),
        "list" | "ls" => cli_list(rest, db),
        "categories" => cli_categories(db),
        "stats" => cli_stats(rest, db),
        "monthly" => cli_monthly(db),
        "breakdown" => cli_breakdown(db),
        "forecast" => cli_forecast(rest, db, config),
        "export" => cli_export(rest, db),
        "seed" => cli_seed(db),
        "clear" => cli_clear(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

/// Remove `--db <path>` from `args`, wherever it appears.
pub fn take_db_flag(args: &mut Vec<String>) -> Result<Option<PathBuf>> {
    let Some(pos) = args.iter().position(|a| a == "--db") else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        anyhow::bail!("--db needs a path");
    }
    let path = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(PathBuf::from(shellexpand(&path))))
}

fn print_usage() {
    println!("Fintrack - local-only personal finance tracker");
    println!();
    println!("Usage: fintrack [--db <path>] [command]");
    println!();
    println!("Commands:");
    println!("  (none), dashboard                 Show balance, top spending and recent activity");
    println!("  add <date> <desc> <amount> [cat]  Record a transaction (date may be 'today')");
    println!("    --label <name>                  Income source or expense merchant");
    println!("  update <id> <date> <desc> <amount> [cat]");
    println!("                                    Replace every field of a transaction");
    println!("  delete <id>                       Delete a transaction");
    println!("  list                              List transactions");
    println!("    --category <name>               Only this category");
    println!("    --search <text>                 Description contains text");
    println!("    --month <YYYY-MM>               Only this month");
    println!("    --income, --expense             Only one kind");
    println!("    --match <regex>                 Description matches a regular expression");
    println!("  categories                        List categories with totals");
    println!("  stats [--category <name>]         Descriptive statistics of amounts");
    println!("  monthly                           Income and expenses per month");
    println!("  breakdown                         Share of spending per category");
    println!("  forecast [N]                      Project spending N steps ahead (default 30)");
    println!("    --all                           Use every transaction, not just expenses");
    println!("    --by-index                      Use position in the series instead of days");
    println!("  export [path]                     Export transactions to CSV");
    println!("    --month <YYYY-MM>               Only this month");
    println!("  seed                              Replace all data with demo transactions");
    println!("  clear --yes                       Delete all transactions");
    println!("  --help, -h                        Show this help");
    println!("  --version, -V                     Show version");
    println!();
    println!("Environment: FINTRACK_DB, FINTRACK_LOG, FINTRACK_TREND_THRESHOLD");
}

// ── Overview ─────────────────────────────────────────────────

fn cli_dashboard(db: &Database) -> Result<()> {
    let summary = db.get_summary()?;
    println!("Fintrack");
    println!("{}", "─".repeat(40));
    println!("  Income:     {}", format_amount(summary.total_income));
    println!("  Expenses:   {}", format_amount(summary.total_expenses));
    println!("  Balance:    {}", format_amount(summary.net_balance));
    println!("  Total Txns: {}", summary.count);

    if summary.count == 0 {
        println!();
        println!("No transactions yet. Try `fintrack add` or `fintrack seed`.");
        return Ok(());
    }

    let spending = db.get_category_totals(&TransactionFilter::kind(TransactionKind::Expense))?;
    if !spending.is_empty() {
        println!();
        println!("Top Spending:");
        for (name, amount) in spending.iter().take(DASHBOARD_ROWS) {
            println!("  {:<24} {:>12}", truncate(name, 24), format_amount(amount.abs()));
        }
    }

    let txns = db.get_transactions()?;
    println!();
    println!("Recent:");
    for txn in txns.as_slice().iter().rev().take(DASHBOARD_ROWS) {
        println!(
            "  {}  {:<28} {:>12}",
            txn.date(),
            truncate(txn.description(), 28),
            format_amount(txn.amount())
        );
    }
    Ok(())
}

// ── Writes ───────────────────────────────────────────────────

fn cli_add(args: &[String], db: &Database) -> Result<()> {
    let pos = positionals(args);
    if pos.len() < 3 {
        anyhow::bail!(
            "Usage: fintrack add <date|today> <description> <amount> [category] [--label <name>]"
        );
    }

    let date = resolve_date(pos[0]);
    let category = pos.get(3).copied().unwrap_or("");
    let mut txn = Transaction::from_raw(None, &date, pos[1], pos[2], category)?;
    if let Some(label) = flag_value(args, "--label") {
        txn = txn.with_label(label);
    }

    let id = db.insert_transaction(&txn)?;
    tracing::info!(id, kind = %txn.kind(), "added transaction");
    println!("Added {}", txn_line(id, &txn));
    Ok(())
}

fn cli_update(args: &[String], db: &Database) -> Result<()> {
    let pos = positionals(args);
    if pos.len() < 4 {
        anyhow::bail!("Usage: fintrack update <id> <date|today> <description> <amount> [category]");
    }

    let date = resolve_date(pos[1]);
    let txn = Transaction::from_raw(
        Some(pos[0]),
        &date,
        pos[2],
        pos[3],
        pos.get(4).copied().unwrap_or(""),
    )?;
    if !db.update_transaction(&txn)? {
        anyhow::bail!("Transaction #{} not found", pos[0]);
    }
    tracing::info!(id = pos[0], "updated transaction");
    println!("Updated {txn}");
    Ok(())
}

fn cli_delete(args: &[String], db: &Database) -> Result<()> {
    let raw = positionals(args)
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Usage: fintrack delete <id>"))?;
    let id = parse_id(raw)?;
    if !db.delete_transaction(id)? {
        anyhow::bail!("Transaction #{id} not found");
    }
    tracing::info!(id, "deleted transaction");
    println!("Deleted transaction #{id}");
    Ok(())
}

fn cli_seed(db: &mut Database) -> Result<()> {
    let today = Local::now().date_naive();
    let txns = seed::demo_transactions(today, seed::DEFAULT_SEED_DAYS);
    let removed = db.clear_all()?;
    let count = db.insert_transactions_batch(&txns)?;
    tracing::info!(removed, count, "seeded demo data");
    println!("Replaced {removed} transactions with {count} demo transactions");
    Ok(())
}

fn cli_clear(args: &[String], db: &Database) -> Result<()> {
    if !has_flag(args, "--yes") {
        anyhow::bail!("This deletes every transaction. Re-run with --yes to confirm");
    }
    let removed = db.clear_all()?;
    tracing::info!(removed, "cleared transactions");
    println!("Deleted {removed} transactions");
    Ok(())
}

// ── Reads ────────────────────────────────────────────────────

fn cli_list(args: &[String], db: &Database) -> Result<()> {
    let filter = parse_filter(args)?;
    let mut txns = db.search_transactions(&filter)?;

    if let Some(pattern) = flag_value(args, "--match") {
        let re = Regex::new(pattern).with_context(|| format!("Invalid regex: {pattern}"))?;
        txns = txns.matching(&re).collect();
    }

    if txns.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    println!(
        "{:<5} {:<10}  {:<30} {:<16} {:>12}",
        "ID", "Date", "Description", "Category", "Amount"
    );
    println!("{}", "─".repeat(78));
    for txn in &txns {
        println!(
            "{:<5} {:<10}  {:<30} {:<16} {:>12}",
            txn.id().unwrap_or_default(),
            txn.date(),
            truncate(txn.description(), 30),
            truncate(txn.category(), 16),
            format_amount(txn.amount()),
        );
    }
    println!("{}", "─".repeat(78));
    println!("{} transactions, total {}", txns.len(), format_amount(txns.total()));
    Ok(())
}

fn cli_categories(db: &Database) -> Result<()> {
    let names = db.get_categories()?;
    if names.is_empty() {
        println!("No categories");
        return Ok(());
    }

    let totals = db.get_category_totals(&TransactionFilter::all())?;
    println!("{:<24} {:>12}", "Category", "Total");
    println!("{}", "─".repeat(37));
    for name in &names {
        let total = totals
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| *t)
            .unwrap_or_default();
        println!("{:<24} {:>12}", truncate(name, 24), format_amount(total));
    }
    Ok(())
}

fn cli_stats(args: &[String], db: &Database) -> Result<()> {
    let txns = match flag_value(args, "--category") {
        Some(name) => db.get_transactions_by_category(name)?,
        None => db.get_transactions()?,
    };
    let amounts = txns.amounts();
    let summary = stats::compute_stats(&amounts).context("No transactions to describe")?;
    let (q1, q3) = stats::quartiles(&amounts)?;

    println!("Count:      {}", summary.count);
    println!("Mean:       {}", format_value(summary.mean));
    println!("Median:     {}", format_value(summary.median));
    println!("Mode:       {}", format_value(summary.mode));
    println!("Std Dev:    {}", format_value(summary.std_dev));
    println!("Min:        {}", format_value(summary.min));
    println!("Max:        {}", format_value(summary.max));
    println!("Q1 / Q3:    {} / {}", format_value(q1), format_value(q3));
    match stats::shape(&amounts) {
        Ok(shape) => {
            println!("Skewness:   {:.4}", shape.skewness);
            println!("Kurtosis:   {:.4}", shape.kurtosis);
        }
        Err(e) => {
            println!("Skewness:   n/a");
            println!("Kurtosis:   n/a");
            tracing::debug!(error = %e, "skipped shape");
        }
    }
    Ok(())
}

fn cli_monthly(db: &Database) -> Result<()> {
    let txns = db.get_transactions()?;
    let flows = stats::monthly_cash_flow(&txns);
    if flows.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    println!("{:<8} {:>14} {:>14} {:>14}", "Month", "Income", "Expenses", "Net");
    println!("{}", "─".repeat(53));
    for (month, flow) in &flows {
        println!(
            "{:<8} {:>14} {:>14} {:>14}",
            month.to_string(),
            format_amount(flow.income),
            format_amount(flow.expenses),
            format_amount(flow.net()),
        );
    }
    Ok(())
}

fn cli_breakdown(db: &Database) -> Result<()> {
    let txns = db.get_transactions()?;
    let shares = stats::expense_share(&txns);
    if shares.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    for (name, pct) in &shares {
        println!("{:<20} {:>5.1}%  {}", truncate(name, 20), pct, bar(*pct, 30));
    }
    Ok(())
}

fn cli_forecast(args: &[String], db: &Database, config: &Config) -> Result<()> {
    let horizon = match positionals(args).first() {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("Invalid forecast horizon: {raw}"))?,
        None => DEFAULT_HORIZON,
    };
    let all = has_flag(args, "--all");
    let by_index = has_flag(args, "--by-index");

    let txns = db.get_transactions()?;
    let series: TransactionCollection = if all {
        txns
    } else {
        txns.expenses().collect()
    };

    let points = match (by_index, all) {
        (true, true) => forecast::points_by_index(&series.amounts()),
        (true, false) => {
            let spent: Vec<f64> = series.iter().map(|t| t.amount_f64().abs()).collect();
            forecast::points_by_index(&spent)
        }
        (false, true) => forecast::points_by_day(&series),
        (false, false) => forecast::expense_points_by_day(&series),
    };
    let origin = series.iter().map(Transaction::date).min();

    let result = forecast::forecast(&points, horizon, &config.forecast)
        .context("Not enough history to forecast")?;

    println!("Trend:      {}", result.direction);
    println!("Slope:      {:.4} per step", result.fit.slope);
    println!("Intercept:  {:.4}", result.fit.intercept);
    println!("R²:         {:.4}", result.fit.r_squared);
    println!("Points:     {}", result.fit.observations);
    println!();
    for point in &result.projections {
        println!(
            "  {:<12} {:>12}",
            step_label(point, origin, by_index),
            format_value(point.amount)
        );
    }
    tracing::info!(horizon, direction = %result.direction, "forecast complete");
    Ok(())
}

fn cli_export(args: &[String], db: &Database) -> Result<()> {
    let month = flag_value(args, "--month")
        .map(str::parse::<YearMonth>)
        .transpose()?;

    // Output path is the first non-flag argument
    let output_path = positionals(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            match month {
                Some(m) => format!("{home}/fintrack-export-{m}.csv"),
                None => format!("{home}/fintrack-export.csv"),
            }
        });

    let filter = TransactionFilter {
        month,
        ..TransactionFilter::default()
    };
    let txns = db.search_transactions(&filter)?;
    if txns.is_empty() {
        println!("No transactions to export");
        return Ok(());
    }
    let count = export::export_to_path(&txns, Path::new(&output_path))?;
    println!("Exported {count} transactions to {output_path}");
    Ok(())
}

// ── Argument helpers ─────────────────────────────────────────

fn parse_filter(args: &[String]) -> Result<TransactionFilter> {
    let kind = match (has_flag(args, "--income"), has_flag(args, "--expense")) {
        (true, true) => anyhow::bail!("Use either --income or --expense, not both"),
        (true, false) => Some(TransactionKind::Income),
        (false, true) => Some(TransactionKind::Expense),
        (false, false) => None,
    };
    Ok(TransactionFilter {
        category: flag_value(args, "--category").map(str::to_string),
        search: flag_value(args, "--search").map(str::to_string),
        month: flag_value(args, "--month")
            .map(str::parse::<YearMonth>)
            .transpose()?,
        kind,
    })
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Arguments that are not flags or flag values. Single-dash values such as
/// `-45.20` are positional.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn resolve_date(raw: &str) -> String {
    if raw.eq_ignore_ascii_case("today") {
        Local::now().date_naive().to_string()
    } else {
        raw.to_string()
    }
}

fn step_label(point: &TrendPoint, origin: Option<NaiveDate>, by_index: bool) -> String {
    match origin {
        Some(first) if !by_index => (first + Duration::days(point.ordinal)).to_string(),
        _ => format!("#{}", point.ordinal),
    }
}

fn txn_line(id: i64, txn: &Transaction) -> String {
    format!(
        "#{id}: {} {} {} [{}]",
        txn.date(),
        txn.description(),
        format_amount(txn.amount()),
        txn.category()
    )
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
