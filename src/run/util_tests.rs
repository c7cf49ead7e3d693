#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_mixed_unicode() {
    assert_eq!(truncate("café résumé", 5), "café…");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_basic() {
    assert_eq!(format_amount(dec!(1234.56)), "$1,234.56");
}

#[test]
fn test_format_amount_zero() {
    assert_eq!(format_amount(dec!(0)), "$0.00");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-42.50)), "-$42.50");
}

#[test]
fn test_format_amount_negative_rounds_to_zero() {
    assert_eq!(format_amount(dec!(-0.001)), "$0.00");
}

#[test]
fn test_format_amount_rounds_sub_cent() {
    assert_eq!(format_amount(dec!(-0.019)), "-$0.02");
    assert_eq!(format_amount(dec!(1.235)), "$1.24");
}

#[test]
fn test_format_amount_large() {
    assert_eq!(format_amount(dec!(1234567.89)), "$1,234,567.89");
}

#[test]
fn test_format_amount_rounds_to_two_decimals() {
    assert_eq!(format_amount(dec!(1.5)), "$1.50");
}

// ── format_value ──────────────────────────────────────────────

#[test]
fn test_format_value() {
    assert_eq!(format_value(-1200.0), "-$1,200.00");
    assert_eq!(format_value(0.8165), "$0.82");
    assert_eq!(format_value(1.5e12), "$1,500,000,000,000.00");
    assert_eq!(format_value(f64::NAN), "n/a");
}

// ── bar ───────────────────────────────────────────────────────

#[test]
fn test_bar() {
    assert_eq!(bar(50.0, 10), "█████");
    assert_eq!(bar(0.0, 10), "");
    assert_eq!(bar(150.0, 4), "████");
}
