//! Console report for `summary` and `classify`.

use anyhow::{Context, Result};
use finmath_core::{CategorySummary, GroupSummary, Transaction};
use finmath_finance::{
    category_sums, category_summary, column_info, describe, final_category_counts, group_by,
    top_vendors, CategorizedTransaction, Classification, ClusterProfile, GroupKey,
};
use std::collections::BTreeMap;
use std::io::Write;

const TEXT_WIDTH: usize = 40;

pub struct SummaryOptions {
    pub head_rows: usize,
    pub top_vendors: usize,
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn section(out: &mut impl Write, title: &str) -> Result<()> {
    writeln!(out, "\n== {title} ==")?;
    Ok(())
}

pub fn write_head(out: &mut impl Write, records: &[Transaction], n: usize) -> Result<()> {
    section(out, &format!("First {} rows", n.min(records.len())))?;
    writeln!(
        out,
        "{:<10}  {:<TEXT_WIDTH$}  {:>10}  {:<16}  category",
        "date", "booking_text", "amount", "type"
    )?;
    for t in records.iter().take(n) {
        writeln!(
            out,
            "{:<10}  {:<TEXT_WIDTH$}  {:>10.2}  {:<16}  {}",
            t.booking_date.format("%Y-%m-%d").to_string(),
            truncate(&t.booking_text, TEXT_WIDTH),
            t.amount,
            truncate(&t.transaction_type, 16),
            t.category.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

pub fn write_info(out: &mut impl Write, records: &[Transaction]) -> Result<()> {
    section(out, "Columns")?;
    writeln!(out, "{} entries", records.len())?;
    writeln!(out, "{:<18}{:>10}  dtype", "column", "non-null")?;
    for c in column_info(records) {
        writeln!(out, "{:<18}{:>10}  {}", c.name, c.non_null, c.dtype)?;
    }
    Ok(())
}

pub fn write_describe(out: &mut impl Write, records: &[Transaction]) -> Result<()> {
    section(out, "Amount statistics")?;
    let Some(d) = describe(records) else {
        writeln!(out, "no records")?;
        return Ok(());
    };
    writeln!(out, "{:<8}{:>12}", "count", d.count)?;
    writeln!(out, "{:<8}{:>12.2}", "mean", d.mean)?;
    match d.std {
        Some(std) => writeln!(out, "{:<8}{:>12.2}", "std", std)?,
        None => writeln!(out, "{:<8}{:>12}", "std", "NaN")?,
    }
    for (name, value) in [
        ("min", d.min),
        ("25%", d.q25),
        ("50%", d.median),
        ("75%", d.q75),
        ("max", d.max),
    ] {
        writeln!(out, "{name:<8}{value:>12.2}")?;
    }
    writeln!(out, "dates   {} .. {}", d.first_date, d.last_date)?;
    Ok(())
}

pub fn write_groups(out: &mut impl Write, title: &str, rows: &[GroupSummary]) -> Result<()> {
    section(out, title)?;
    writeln!(out, "{:<TEXT_WIDTH$}  {:>6}  {:>12}", "key", "count", "sum")?;
    for r in rows {
        writeln!(
            out,
            "{:<TEXT_WIDTH$}  {:>6}  {:>12.2}",
            truncate(&r.key, TEXT_WIDTH),
            r.count,
            r.sum
        )?;
    }
    Ok(())
}

pub fn write_category_summary(out: &mut impl Write, summary: &CategorySummary) -> Result<()> {
    section(out, "Category summary")?;
    let json = serde_json::to_string_pretty(summary).context("serialize category summary")?;
    writeln!(out, "{json}")?;
    Ok(())
}

pub fn write_profiles(out: &mut impl Write, profiles: &[ClusterProfile]) -> Result<()> {
    section(out, "Clusters")?;
    for p in profiles {
        writeln!(out, "Cluster {} ({}), {} records", p.cluster, p.label, p.size)?;
        writeln!(out, "  top terms: {}", p.top_terms.join(", "))?;
        for s in &p.samples {
            writeln!(out, "  - {s}")?;
        }
    }
    Ok(())
}

pub fn write_backfill_counts(out: &mut impl Write, counts: &BTreeMap<String, usize>) -> Result<()> {
    section(out, "Categories after back-fill")?;
    for (category, n) in counts {
        writeln!(out, "{category:<TEXT_WIDTH$}  {n:>6}")?;
    }
    Ok(())
}

/// Everything `finmath summary` prints before the chart.
pub fn write_summary(out: &mut impl Write, records: &[Transaction], opts: &SummaryOptions) -> Result<()> {
    write_head(out, records, opts.head_rows)?;
    write_info(out, records)?;
    write_describe(out, records)?;
    write_groups(
        out,
        "Transaction types",
        &group_by(records, GroupKey::TransactionType),
    )?;
    write_groups(
        out,
        &format!("Top {} vendors", opts.top_vendors),
        &top_vendors(records, opts.top_vendors),
    )?;
    write_category_summary(out, &category_summary(&category_sums(records)))?;
    Ok(())
}

/// Everything `finmath classify` prints before the chart.
pub fn write_classification(
    out: &mut impl Write,
    classification: &Classification,
    categorized: &[CategorizedTransaction],
) -> Result<()> {
    if classification.used_fallback {
        writeln!(out, "All records already categorized; clustered the full dataset.")?;
    }
    write_profiles(out, &classification.profiles)?;
    write_backfill_counts(out, &final_category_counts(categorized))?;
    let filled = categorized
        .iter()
        .filter(|c| c.transaction.category_label().is_none() && c.final_category.is_some())
        .count();
    writeln!(out, "\nBack-filled {filled} of {} records", categorized.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finmath_finance::ClassifiedRow;

    fn records() -> Vec<Transaction> {
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let mut rs = vec![
            Transaction::new(d(2), "Amazon EU // End-To-End 1", -23.99, "Card payment", Some("Online Shopping & Retail".into())),
            Transaction::new(d(3), "REWE Markt Berlin", -54.37, "Card payment", None),
            Transaction::new(d(4), "Gehalt Januar", 3250.0, "Credit", Some("Income".into())),
        ];
        rs[0].vendor = Some("Amazon EU".into());
        rs[1].vendor = Some("REWE Markt Berlin".into());
        rs[2].vendor = Some("Gehalt Januar".into());
        rs
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_summary_sections() {
        let rs = records();
        let text = render(|out| {
            write_summary(out, &rs, &SummaryOptions { head_rows: 2, top_vendors: 2 })
        });
        assert!(text.contains("== First 2 rows =="));
        assert!(text.contains("3 entries"));
        assert!(text.contains("== Amount statistics =="));
        assert!(text.contains("dates   2025-01-02 .. 2025-01-04"));
        assert!(text.contains("== Transaction types =="));
        assert!(text.contains("== Top 2 vendors =="));
        assert!(text.contains("\"Income\": {"));
        assert!(text.contains("\"amount\": \"3250.00 EUR\""));
    }

    #[test]
    fn test_top_vendors_listed_ascending() {
        let rs = records();
        let text = render(|out| write_groups(out, "Top vendors", &top_vendors(&rs, 2)));
        let amazon = text.find("Amazon EU").unwrap();
        let gehalt = text.find("Gehalt Januar").unwrap();
        assert!(amazon < gehalt);
        assert!(!text.contains("REWE"));
    }

    #[test]
    fn test_describe_empty() {
        let text = render(|out| write_describe(out, &[]));
        assert!(text.contains("no records"));
    }

    #[test]
    fn test_classification_report() {
        let rs = records();
        let classification = Classification {
            rows: vec![ClassifiedRow {
                index: 1,
                cluster: 0,
                suggested_category: "Living Expenses".into(),
            }],
            profiles: vec![ClusterProfile {
                cluster: 0,
                label: "Living Expenses".into(),
                top_terms: vec!["rewe".into(), "markt".into()],
                samples: vec!["REWE Markt Berlin".into()],
                size: 1,
            }],
            used_fallback: false,
        };
        let categorized = finmath_finance::backfill(&rs, &classification);
        let text = render(|out| write_classification(out, &classification, &categorized));

        assert!(text.contains("Cluster 0 (Living Expenses), 1 records"));
        assert!(text.contains("  top terms: rewe, markt"));
        assert!(text.contains("  - REWE Markt Berlin"));
        assert!(text.contains("Back-filled 1 of 3 records"));
        assert!(!text.contains("already categorized"));
    }

    #[test]
    fn test_unknown_rows_not_counted_as_filled() {
        let mut rs = records();
        rs[1].category = Some("Unknown".into());
        let classification = Classification {
            rows: vec![ClassifiedRow {
                index: 1,
                cluster: 0,
                suggested_category: "Living Expenses".into(),
            }],
            profiles: Vec::new(),
            used_fallback: false,
        };
        let categorized = finmath_finance::backfill(&rs, &classification);
        let text = render(|out| write_classification(out, &classification, &categorized));

        assert!(text.contains("Unknown"));
        assert!(!text.contains("Living Expenses"));
        assert!(text.contains("Back-filled 0 of 3 records"));
    }
}
