//! Spreadsheet-style CSV export.
//!
//! Both branches are flattened depth-first into `(label, amount)` rows and
//! written side by side under an `ACTIF,Montant,PASSIF,Montant` header.
//! Amounts use French formatting (`12 500,50`).

use rust_decimal::{Decimal, RoundingStrategy};

use super::types::{ASSET_SIDE, Entry, Group, LIABILITY_SIDE, Statement, TOTAL_KEY};

/// Thousands separator used by French number formatting (narrow no-break space).
const THOUSANDS_SEPARATOR: char = '\u{202F}';

/// A flattened export row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    /// Indented label.
    pub label: String,
    /// Formatted amount, empty for group headers.
    pub amount: String,
}

/// Formats an amount the French way with two fractional digits.
#[must_use]
pub fn format_amount_fr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((&digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{frac_part}")
}

/// Flattens one branch into export rows.
///
/// Each group yields a header row, its children one level deeper, then its
/// `TOTAL`. The branch total comes last.
#[must_use]
pub fn flatten_side(side: &Group) -> Vec<ExportRow> {
    let mut rows = Vec::new();
    flatten_entries(&side.entries, 0, &mut rows);
    rows.push(ExportRow {
        label: TOTAL_KEY.to_string(),
        amount: format_amount_fr(side.total),
    });
    rows
}

fn flatten_entries(entries: &[Entry], level: usize, rows: &mut Vec<ExportRow>) {
    let indent = "  ".repeat(level);
    for entry in entries {
        match entry {
            Entry::Group(group) => {
                rows.push(ExportRow {
                    label: format!("{indent}{}", group.name),
                    amount: String::new(),
                });
                flatten_entries(&group.entries, level + 1, rows);
                rows.push(ExportRow {
                    label: format!("{indent}{TOTAL_KEY}"),
                    amount: format_amount_fr(group.total),
                });
            }
            Entry::Item(item) => rows.push(ExportRow {
                label: format!("{indent}{}", item.name),
                amount: format_amount_fr(item.value),
            }),
        }
    }
}

/// Writes the statement as a four-column CSV sheet.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn to_csv(statement: &Statement) -> Result<Vec<u8>, csv::Error> {
    let asset = flatten_side(&statement.asset);
    let liability = flatten_side(&statement.liability);
    let len = asset.len().max(liability.len());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([ASSET_SIDE, "Montant", LIABILITY_SIDE, "Montant"])?;

    for idx in 0..len {
        let (asset_label, asset_amount) = cells(asset.get(idx));
        let (liability_label, liability_amount) = cells(liability.get(idx));
        writer.write_record([asset_label, asset_amount, liability_label, liability_amount])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn cells(row: Option<&ExportRow>) -> (&str, &str) {
    row.map_or(("", ""), |r| (r.label.as_str(), r.amount.as_str()))
}
