//! finmath-core: transaction record, summary types, and vendor extraction

pub mod summary;
pub mod transaction;
pub mod vendor;

pub use summary::{
    format_eur, round_to, CategorySummary, CategorySummaryEntry, GroupSummary,
};
pub use transaction::{Transaction, UNKNOWN_CATEGORY};
pub use vendor::{assign_vendors, RegexVendorExtractor, VendorExtractor, SEPA_VENDOR_PATTERN};
