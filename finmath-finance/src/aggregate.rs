//! Group-by aggregation over transactions.
//!
//! Records whose group key is absent are left out of a grouping, the same
//! way a null key never forms a group.

use finmath_core::{round_to, CategorySummary, CategorySummaryEntry, GroupSummary, Transaction};
use std::collections::BTreeMap;

use crate::classifier::ClassifiedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    TransactionType,
    Vendor,
    Category,
}

impl GroupKey {
    fn key_of<'a>(&self, txn: &'a Transaction) -> Option<&'a str> {
        match self {
            GroupKey::TransactionType => {
                Some(txn.transaction_type.as_str()).filter(|t| !t.is_empty())
            }
            GroupKey::Vendor => txn.vendor.as_deref(),
            GroupKey::Category => txn.category_label(),
        }
    }
}

/// Count and signed sum per key, ordered by key.
pub fn group_by(records: &[Transaction], key: GroupKey) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for txn in records {
        if let Some(k) = key.key_of(txn) {
            let entry = groups.entry(k).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += txn.amount;
        }
    }

    groups
        .into_iter()
        .map(|(key, (count, sum))| GroupSummary {
            key: key.to_string(),
            count,
            sum,
        })
        .collect()
}

/// The `n` vendors with the highest signed sum, in ascending order of sum.
pub fn top_vendors(records: &[Transaction], n: usize) -> Vec<GroupSummary> {
    let mut vendors = group_by(records, GroupKey::Vendor);
    vendors.sort_by(|a, b| a.sum.total_cmp(&b.sum));
    let skip = vendors.len().saturating_sub(n);
    vendors.split_off(skip)
}

/// Absolute amount per category. Each amount is made absolute before it is
/// added, so debits and credits in one category do not cancel out.
pub fn category_sums(records: &[Transaction]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for txn in records {
        if let Some(category) = txn.category_label() {
            *sums.entry(category.to_string()).or_insert(0.0) += txn.abs_amount();
        }
    }
    sums
}

pub fn total(sums: &BTreeMap<String, f64>) -> f64 {
    sums.values().sum()
}

/// Percent share (one decimal) and formatted amount per category.
pub fn category_summary(sums: &BTreeMap<String, f64>) -> CategorySummary {
    let total_sum = total(sums);
    sums.iter()
        .map(|(category, amount)| {
            let percent = if total_sum > 0.0 {
                round_to(amount.abs() / total_sum * 100.0, 1)
            } else {
                0.0
            };
            let entry = CategorySummaryEntry {
                percent,
                amount: format!("{:.2} EUR", round_to(*amount, 2)),
            };
            (category.clone(), entry)
        })
        .collect()
}

/// Absolute net amount per cluster over the classified rows.
pub fn cluster_sums(records: &[Transaction], rows: &[ClassifiedRow]) -> BTreeMap<usize, f64> {
    let mut sums: BTreeMap<usize, f64> = BTreeMap::new();
    for row in rows {
        if let Some(txn) = records.get(row.index) {
            *sums.entry(row.cluster).or_insert(0.0) += txn.amount;
        }
    }
    for sum in sums.values_mut() {
        *sum = sum.abs();
    }
    sums
}
