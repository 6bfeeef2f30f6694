//! Load a bank export into typed transactions.
//!
//! The export is `;`-delimited with a decimal comma:
//! Booking Date;Booking Text;Amount;Transaction Type;Category
//! 15.03.25;Amazon EU // End-To-End ABC123;-23,99;Card payment;Online Shopping

use chrono::NaiveDate;
use finmath_core::Transaction;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::columns::ColumnIndex;
use crate::error::LoadError;

const DATE_FORMAT: &str = "%d.%m.%y";

/// Parse `DD.MM.YY`; two-digit years 00-68 land in 20xx.
pub fn parse_booking_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse a decimal-comma amount: `-1.234,56` -> `-1234.56`.
///
/// A `.` is only read as a thousands separator when a decimal comma is
/// present; otherwise it is the decimal point.
pub fn parse_amount(s: &str) -> Option<f64> {
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() {
        return None;
    }

    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Load and normalize an export file.
pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<Transaction>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let txns = read_transactions(file)?;
    info!(rows = txns.len(), path = %path.display(), "loaded transactions");
    Ok(txns)
}

/// Read an export from any reader. Fails on the first malformed row.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::from_headers(headers.iter())?;
    debug!(?headers, ?columns, "resolved export columns");

    let mut txns = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record.position().map_or(i as u64 + 2, |p| p.line());
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let date_raw = field(columns.booking_date);
        let booking_date = parse_booking_date(date_raw).ok_or_else(|| LoadError::InvalidDate {
            line,
            value: date_raw.to_string(),
        })?;

        let amount_raw = field(columns.amount);
        let amount = parse_amount(amount_raw).ok_or_else(|| LoadError::InvalidAmount {
            line,
            value: amount_raw.to_string(),
        })?;

        let category = Some(field(columns.category))
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        txns.push(Transaction::new(
            booking_date,
            field(columns.booking_text),
            amount,
            field(columns.transaction_type),
            category,
        ));
    }

    Ok(txns)
}
