//! Transaction record loaded from a bank export

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category sentinel the bank uses for rows it could not categorize
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// One booking from the export, with the derived vendor column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub booking_date: NaiveDate,
    /// Free-text description, often carrying SEPA remittance metadata
    pub booking_text: String,
    /// Positive = credit, negative = debit
    pub amount: f64,
    pub transaction_type: String,
    pub category: Option<String>,
    /// Derived from `booking_text` by a vendor extractor
    #[serde(default)]
    pub vendor: Option<String>,
}

impl Transaction {
    pub fn new(
        booking_date: NaiveDate,
        booking_text: impl Into<String>,
        amount: f64,
        transaction_type: impl Into<String>,
        category: Option<String>,
    ) -> Self {
        Self {
            booking_date,
            booking_text: booking_text.into(),
            amount,
            transaction_type: transaction_type.into(),
            category,
            vendor: None,
        }
    }

    /// Category with surrounding whitespace removed; blank counts as absent
    pub fn category_label(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// True when the category is absent, blank, or the `Unknown` sentinel
    pub fn needs_category(&self) -> bool {
        match self.category_label() {
            None => true,
            Some(c) => c == UNKNOWN_CATEGORY,
        }
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}
