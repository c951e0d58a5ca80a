//! Balance-sheet statement generation.
//!
//! This module turns a ledger snapshot into a two-branch statement and
//! renders it:
//! - Mapping of ledger labels to categories
//! - Bottom-up rollup of totals
//! - Grid table rendering
//! - CSV export

pub mod builder;
pub mod export;
pub mod mapping;
pub mod presenter;
pub mod types;


pub use bilan_shared::DebtPolicy;
pub use builder::BilanBuilder;
pub use export::{ExportRow, flatten_side, format_amount_fr, to_csv};
pub use mapping::{Category, CategoryMapping, MatchStrategy, Subcategory};
pub use presenter::{SideCell, TableLayout, TableRow, render_table};
pub use types::*;
