//! Ledger rows and their decoding from raw files.
//!
//! Ledger files come in two shapes: CSV with a header row, or JSON records
//! (an array of objects, possibly nested). Both decode into the same
//! [`LedgerRow`] sequence.

pub mod decode;
pub mod error;
pub mod row;

pub use decode::{decode, decode_csv, decode_json, parse_amount};
pub use error::DecodeError;
pub use row::{LedgerRow, ProjectId, columns};
