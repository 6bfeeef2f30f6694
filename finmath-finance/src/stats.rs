//! Descriptive statistics for the overview section of the summary report

use chrono::NaiveDate;
use finmath_core::Transaction;
use serde::Serialize;

/// Distribution of the `amount` column
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; absent for fewer than two values
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Non-null count and value type of one column
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub non_null: usize,
    pub dtype: &'static str,
}

/// `None` for an empty record set.
pub fn describe(records: &[Transaction]) -> Option<Describe> {
    let first_date = records.iter().map(|t| t.booking_date).min()?;
    let last_date = records.iter().map(|t| t.booking_date).max()?;

    let mut amounts: Vec<f64> = records.iter().map(|t| t.amount).collect();
    amounts.sort_by(f64::total_cmp);

    let count = amounts.len();
    let mean = amounts.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let var = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    });

    Some(Describe {
        count,
        mean,
        std,
        min: amounts[0],
        q25: quantile(&amounts, 0.25),
        median: quantile(&amounts, 0.5),
        q75: quantile(&amounts, 0.75),
        max: amounts[count - 1],
        first_date,
        last_date,
    })
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn count_where(records: &[Transaction], pred: impl Fn(&Transaction) -> bool) -> usize {
    records.iter().filter(|t| pred(t)).count()
}

pub fn column_info(records: &[Transaction]) -> Vec<ColumnInfo> {
    vec![
        ColumnInfo { name: "booking_date", non_null: records.len(), dtype: "date" },
        ColumnInfo {
            name: "booking_text",
            non_null: count_where(records, |t| !t.booking_text.is_empty()),
            dtype: "text",
        },
        ColumnInfo { name: "amount", non_null: records.len(), dtype: "f64" },
        ColumnInfo {
            name: "transaction_type",
            non_null: count_where(records, |t| !t.transaction_type.is_empty()),
            dtype: "text",
        },
        ColumnInfo {
            name: "category",
            non_null: count_where(records, |t| t.category_label().is_some()),
            dtype: "text",
        },
        ColumnInfo {
            name: "vendor",
            non_null: count_where(records, |t| t.vendor.is_some()),
            dtype: "text",
        },
    ]
}
