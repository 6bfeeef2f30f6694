//! Derived, display-only summary types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One group of a group-by over transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub sum: f64,
}

/// Share of one category in the absolute total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySummaryEntry {
    /// Percent of total, one decimal place
    pub percent: f64,
    /// Formatted currency amount, e.g. `"1234.50 EUR"`
    pub amount: String,
}

/// Category label -> share, ordered by label
pub type CategorySummary = BTreeMap<String, CategorySummaryEntry>;

/// Round to `decimals` places, halves to the even neighbour.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Format as euros with thousands separators: `€12,345.67`
pub fn format_eur(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}€{grouped}.{frac_part}")
}
