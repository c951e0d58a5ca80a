//! Ledger row and project identifier types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Source column names as they appear in ledger files.
pub mod columns {
    /// Broad accounting bucket.
    pub const CATEGORY: &str = "Categorie";
    /// Specific line-item label.
    pub const DESIGNATION: &str = "Designation";
    /// Unit value amount.
    pub const UNIT_VALUE: &str = "Valeur unitaire";
    /// Total amount.
    pub const TOTAL: &str = "Total";
}

/// One ledger line.
///
/// Amount cells are `None` when the source cell is empty or cannot be parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Broad accounting bucket, e.g. "Immobilisations corporelles".
    pub category: String,
    /// Specific line-item label, e.g. "Batiments".
    pub designation: String,
    /// Unit value.
    pub unit_value: Option<Decimal>,
    /// Total amount.
    pub total: Option<Decimal>,
}

impl LedgerRow {
    /// Creates a row with no amounts.
    #[must_use]
    pub fn new(category: impl Into<String>, designation: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            designation: designation.into(),
            unit_value: None,
            total: None,
        }
    }

    /// Sets the unit value.
    #[must_use]
    pub fn with_unit_value(mut self, value: Decimal) -> Self {
        self.unit_value = Some(value);
        self
    }

    /// Sets the total.
    #[must_use]
    pub fn with_total(mut self, value: Decimal) -> Self {
        self.total = Some(value);
        self
    }
}

/// Identifier of the project whose ledger is loaded.
///
/// Accepts 1 to 64 ASCII alphanumeric characters, hyphens and underscores, so
/// it is always safe to embed in a storage path or URL segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Maximum identifier length.
    pub const MAX_LEN: usize = 64;

    /// Validates and wraps a project identifier.
    ///
    /// # Errors
    ///
    /// Returns the rejected input when it is empty, too long, or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let valid = !raw.is_empty()
            && raw.len() <= Self::MAX_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(raw.to_string())
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
