use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::models::round_to_cents;

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"1,234,567.89"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let rounded = round_to_cents(val);
    let abs = rounded.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if rounded < Decimal::ZERO {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Same as [`format_amount`] for computed values. Non-finite values print
/// as `n/a`.
pub(crate) fn format_value(val: f64) -> String {
    match Decimal::from_f64(val) {
        Some(d) => format_amount(d),
        None => "n/a".to_string(),
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// A horizontal bar `width` cells wide at 100%.
pub(crate) fn bar(percent: f64, width: usize) -> String {
    let cells = (percent.clamp(0.0, 100.0) / 100.0 * width as f64).round() as usize;
    "█".repeat(cells)
}
