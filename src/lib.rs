//! A local-only personal finance tracker.
//!
//! Transactions live in a single SQLite table. On top of the store sit
//! descriptive statistics and a least-squares spending forecast.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod forecast;
pub mod logging;
pub mod models;
pub mod run;
pub mod seed;
pub mod stats;

pub use error::{Error, Result};
