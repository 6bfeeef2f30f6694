//! finmath-ingest: loader for semicolon-delimited, decimal-comma bank exports.

pub mod columns;
pub mod error;
pub mod loader;

pub use columns::{normalize_header, ColumnIndex, REQUIRED_COLUMNS};
pub use error::LoadError;
pub use loader::{load_transactions, parse_amount, parse_booking_date, read_transactions};
