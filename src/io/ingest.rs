//! CSV ingest and schema validation.
//!
//! This module turns a simulation-results CSV into an in-memory `SampleTable`
//! of named numeric columns that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Deterministic behavior** (rows keep file order, no hidden coercion)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::error::AppError;

/// An immutable table of named numeric columns loaded from one CSV.
#[derive(Debug, Clone)]
pub struct SampleTable {
    columns: Vec<(String, Vec<f64>)>,
    n_rows: usize,
}

impl SampleTable {
    /// Number of data rows (excluding the header).
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        let key = normalize_header_name(name);
        self.columns.iter().any(|(n, _)| *n == key)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Fetch a column by (case-insensitive) name.
    pub fn column(&self, name: &str) -> Result<&[f64], AppError> {
        let key = normalize_header_name(name);
        self.columns
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
    }
}

/// Load a CSV into a `SampleTable`, validating that `required` columns exist
/// and parse as numeric.
///
/// Non-required columns are kept when every cell parses as a number and
/// silently dropped otherwise (the analyses never read them; keeping the
/// clean ones makes the table useful for ad-hoc inspection).
pub fn load_table(path: &Path, required: &[&str]) -> Result<SampleTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(required, &header_map)?;

    let mut records: Vec<StringRecord> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header and CSV line numbers
        // are 1-based.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::new(2, format!("Line {line}: CSV parse error: {e}")))?;
        records.push(record);
    }

    let n_rows = records.len();
    let mut columns: Vec<(String, Vec<f64>)> = Vec::new();

    // Header order, required columns strict, the rest best-effort.
    let mut ordered: Vec<(&String, &usize)> = header_map.iter().collect();
    ordered.sort_by_key(|(_, idx)| **idx);

    for (name, &idx) in ordered {
        let strict = required
            .iter()
            .any(|r| normalize_header_name(r) == *name);
        match parse_column(&records, idx, name, strict)? {
            Some(values) => columns.push((name.clone(), values)),
            None => {} // non-numeric optional column, dropped
        }
    }

    Ok(SampleTable { columns, n_rows })
}

fn parse_column(
    records: &[StringRecord],
    idx: usize,
    name: &str,
    strict: bool,
) -> Result<Option<Vec<f64>>, AppError> {
    let mut values = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        let line = row + 2;
        let cell = record.get(idx).map(str::trim).unwrap_or("");
        match cell.parse::<f64>() {
            Ok(v) if v.is_finite() => values.push(v),
            _ if strict => {
                return Err(AppError::new(
                    2,
                    format!("Line {line}: invalid numeric value '{cell}' in column `{name}`."),
                ));
            }
            _ => return Ok(None),
        }
    }
    Ok(Some(values))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "\u{feff}initial_coop"). If we don't strip it, schema
    // validation will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(
    required: &[&str],
    header_map: &HashMap<String, usize>,
) -> Result<(), AppError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !header_map.contains_key(&normalize_header_name(name)))
        .map(|name| format!("`{name}`"))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(
            2,
            format!("Missing required column(s): {}", missing.join(", ")),
        ))
    }
}
