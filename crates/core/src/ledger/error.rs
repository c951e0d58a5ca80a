//! Ledger decoding errors.

use thiserror::Error;

/// Errors raised when a whole ledger file cannot be decoded.
///
/// Individual malformed cells never produce an error; they decode to `None`.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// CSV reader error.
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from the header row.
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    /// JSON payload is neither a record nor an array of records.
    #[error("unexpected JSON shape: expected an object or an array of objects")]
    UnexpectedShape,
}
