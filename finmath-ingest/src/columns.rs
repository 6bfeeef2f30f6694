//! Header normalization and required-column lookup

use crate::error::LoadError;

/// Columns every export must carry after normalization
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "booking_date",
    "amount",
    "transaction_type",
    "category",
    "booking_text",
];

/// `" Booking Date "` -> `"booking_date"`. A leading byte-order mark is dropped.
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

/// Field positions of the required columns within a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub booking_date: usize,
    pub amount: usize,
    pub transaction_type: usize,
    pub category: usize,
    pub booking_text: usize,
}

impl ColumnIndex {
    /// Resolve positions from raw header names. The first match wins when a
    /// normalized name repeats.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, LoadError> {
        let normalized: Vec<String> = headers.into_iter().map(normalize_header).collect();
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = normalized
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))?;
        }

        let [booking_date, amount, transaction_type, category, booking_text] = positions;
        Ok(Self {
            booking_date,
            amount,
            transaction_type,
            category,
            booking_text,
        })
    }
}
