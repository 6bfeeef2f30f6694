//! Write the back-filled dataset in the same dialect the loader reads:
//! `;`-delimited, `DD.MM.YY` dates, decimal-comma amounts.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::classifier::CategorizedTransaction;

const HEADER: [&str; 9] = [
    "booking_date",
    "booking_text",
    "amount",
    "transaction_type",
    "category",
    "vendor",
    "cluster",
    "suggested_category",
    "final_category",
];

pub fn write_categorized(path: &Path, rows: &[CategorizedTransaction]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_categorized_to(file, rows)?;
    info!(rows = rows.len(), path = %path.display(), "wrote categorized transactions");
    Ok(())
}

pub fn write_categorized_to<W: Write>(writer: W, rows: &[CategorizedTransaction]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    wtr.write_record(HEADER)?;

    for row in rows {
        let t = &row.transaction;
        let cluster = row.cluster.map(|c| c.to_string()).unwrap_or_default();
        wtr.write_record([
            t.booking_date.format("%d.%m.%y").to_string().as_str(),
            t.booking_text.as_str(),
            decimal_comma(t.amount).as_str(),
            t.transaction_type.as_str(),
            t.category.as_deref().unwrap_or(""),
            t.vendor.as_deref().unwrap_or(""),
            cluster.as_str(),
            row.suggested_category.as_deref().unwrap_or(""),
            row.final_category.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush().context("flush categorized csv")?;
    Ok(())
}

fn decimal_comma(amount: f64) -> String {
    format!("{amount:.2}").replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finmath_core::Transaction;

    fn rows() -> Vec<CategorizedTransaction> {
        let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let mut paid = Transaction::new(date, "Amazon EU // End-To-End 7", -1234.5, "Card payment", None);
        paid.vendor = Some("Amazon EU".into());
        let kept = Transaction::new(date, "Gehalt; Maerz", 2500.0, "Credit", Some("Income".into()));
        vec![
            CategorizedTransaction {
                transaction: paid,
                cluster: Some(3),
                suggested_category: Some("Online Shopping & Retail".into()),
                final_category: Some("Online Shopping & Retail".into()),
            },
            CategorizedTransaction {
                transaction: kept,
                cluster: None,
                suggested_category: None,
                final_category: Some("Income".into()),
            },
        ]
    }

    #[test]
    fn test_writes_loader_dialect() {
        let mut buf = Vec::new();
        write_categorized_to(&mut buf, &rows()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER.join(";"));
        assert_eq!(
            lines[1],
            "15.03.25;Amazon EU // End-To-End 7;-1234,50;Card payment;;Amazon EU;3;Online Shopping & Retail;Online Shopping & Retail"
        );
        // The embedded delimiter forces quoting.
        assert!(lines[2].starts_with("15.03.25;\"Gehalt; Maerz\";2500,00;Credit;Income;;;;Income"));
    }

    #[test]
    fn test_output_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categorized.csv");
        write_categorized(&path, &rows()).unwrap();

        let reloaded = finmath_ingest::load_transactions(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded[0].amount, -1234.5);
        assert_eq!(reloaded[1].booking_text, "Gehalt; Maerz");
        assert_eq!(reloaded[1].category.as_deref(), Some("Income"));
    }

    #[test]
    fn test_unwritable_path() {
        let err = write_categorized(Path::new("/nonexistent/dir/out.csv"), &rows()).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/out.csv"));
    }
}
