use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("opening {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("line {line}: booking_date {value:?} does not match DD.MM.YY")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}: amount {value:?} is not a decimal number")]
    InvalidAmount { line: u64, value: String },
}
