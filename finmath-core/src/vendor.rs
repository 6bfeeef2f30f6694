//! Vendor extraction from free-text booking descriptions.
//!
//! Extraction is a strategy: aggregation only sees `VendorExtractor`, so other
//! remittance formats can be added without touching it.

use anyhow::{Context, Result};
use regex::Regex;

use crate::transaction::Transaction;

/// Leading text up to `//`, a comma, `End-To-End`, `SEPA`, or end of text
pub const SEPA_VENDOR_PATTERN: &str = r"^(.*?)(//|,|End-To-End|SEPA|$)";

pub trait VendorExtractor {
    /// Short vendor label for a booking text, `None` when nothing usable matched
    fn extract(&self, booking_text: &str) -> Option<String>;
}

/// Takes the first capture group of a pattern as the vendor
#[derive(Debug, Clone)]
pub struct RegexVendorExtractor {
    pattern: Regex,
}

impl RegexVendorExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("compiling vendor pattern {pattern}"))?;
        Ok(Self { pattern })
    }

    /// The German SEPA remittance heuristic
    pub fn sepa() -> Result<Self> {
        Self::new(SEPA_VENDOR_PATTERN)
    }
}

impl VendorExtractor for RegexVendorExtractor {
    fn extract(&self, booking_text: &str) -> Option<String> {
        let caps = self.pattern.captures(booking_text)?;
        let vendor = caps.get(1)?.as_str().trim();
        if vendor.is_empty() {
            None
        } else {
            Some(vendor.to_string())
        }
    }
}

/// Fill the `vendor` column of every record.
pub fn assign_vendors(records: &mut [Transaction], extractor: &dyn VendorExtractor) {
    for record in records.iter_mut() {
        record.vendor = extractor.extract(&record.booking_text);
    }
}
