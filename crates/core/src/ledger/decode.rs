//! Decoding of raw ledger files into [`LedgerRow`]s.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::error::DecodeError;
use super::row::{LedgerRow, columns};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Cell contents treated as "no value".
const NULL_MARKERS: &[&str] = &["nan", "null", "none", "na", "n/a"];

/// Parses a numeric cell.
///
/// Returns `None` for empty cells, null markers (`NaN`, `null`, ...) and
/// anything that is not a plain or scientific decimal.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() || NULL_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return None;
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Decodes a ledger file, trying JSON first and falling back to CSV.
///
/// # Errors
///
/// Returns an error when the payload is valid JSON of the wrong shape, or
/// when it is not JSON and cannot be read as CSV with the required columns.
pub fn decode(bytes: &[u8]) -> Result<Vec<LedgerRow>, DecodeError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => decode_json(&value),
        Err(_) => decode_csv(bytes),
    }
}

/// Decodes a CSV ledger with a header row.
///
/// `Categorie` and `Designation` columns are required; missing amount
/// columns decode as `None`. Blank lines are skipped.
///
/// # Errors
///
/// Returns an error on malformed CSV or missing required columns.
pub fn decode_csv(bytes: &[u8]) -> Result<Vec<LedgerRow>, DecodeError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let category =
        position(columns::CATEGORY).ok_or(DecodeError::MissingColumn(columns::CATEGORY))?;
    let designation =
        position(columns::DESIGNATION).ok_or(DecodeError::MissingColumn(columns::DESIGNATION))?;
    let unit_value = position(columns::UNIT_VALUE);
    let total = position(columns::TOTAL);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).and_then(parse_amount);

        rows.push(LedgerRow {
            category: record.get(category).unwrap_or_default().to_string(),
            designation: record.get(designation).unwrap_or_default().to_string(),
            unit_value: cell(unit_value),
            total: cell(total),
        });
    }

    Ok(rows)
}

/// Decodes JSON ledger records.
///
/// Accepts a single object or an array of objects; nested objects are
/// flattened with `.`-joined keys. Array elements that are not objects are
/// ignored.
///
/// # Errors
///
/// Returns [`DecodeError::UnexpectedShape`] for scalars.
pub fn decode_json(value: &Value) -> Result<Vec<LedgerRow>, DecodeError> {
    let records: Vec<&Map<String, Value>> = match value {
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        Value::Object(record) => vec![record],
        _ => return Err(DecodeError::UnexpectedShape),
    };

    Ok(records
        .into_iter()
        .map(|record| {
            let mut flat = Map::new();
            flatten_into("", record, &mut flat);
            row_from_record(&flat)
        })
        .collect())
}

fn flatten_into(prefix: &str, record: &Map<String, Value>, out: &mut Map<String, Value>) {
    for (key, value) in record {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(nested) => flatten_into(&key, nested, out),
            other => {
                out.insert(key, other.clone());
            }
        }
    }
}

fn row_from_record(record: &Map<String, Value>) -> LedgerRow {
    LedgerRow {
        category: text(record.get(columns::CATEGORY)),
        designation: text(record.get(columns::DESIGNATION)),
        unit_value: record.get(columns::UNIT_VALUE).and_then(json_amount),
        total: record.get(columns::TOTAL).and_then(json_amount),
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn json_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_amount(&n.to_string()),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}
