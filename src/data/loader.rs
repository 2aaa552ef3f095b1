use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use crate::error::{EdaError, Result};

use super::model::{columns, Dataset, Row, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with column names, one listing per record
/// * `.json` – records orientation, `[{ "Company_Name": "...", ... }, ...]`
///   (the default `df.to_json(orient='records')`)
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => Err(EdaError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).map_err(|source| EdaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file).map_err(|reason| malformed(path, reason))
}

/// Parse CSV from any reader.  Cell types are guessed per value; the
/// cleaning pass later enforces the numeric column contract.
fn read_csv<R: io::Read>(reader: R) -> std::result::Result<Dataset, String> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("reading CSV headers: {e}"))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("CSV row {row_no}: {e}"))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(col, cell)| (col.clone(), guess_value_type(cell)))
            .collect();
        rows.push(row);
    }

    Ok(Dataset::from_rows(headers, rows))
}

/// Guess a cell's type the way Pandas' CSV reader would.
fn guess_value_type(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("n/a")
        || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null")
    {
        return Value::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).map_err(|source| EdaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_json(&text).map_err(|reason| malformed(path, reason))
}

fn read_json(text: &str) -> std::result::Result<Dataset, String> {
    let root: JsonValue = serde_json::from_str(text).map_err(|e| format!("parsing JSON: {e}"))?;
    let records = root.as_array().ok_or("expected top-level JSON array")?;

    // Header order: first-seen key order across records.
    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| format!("row {i} is not a JSON object"))?;

        let mut row = Row::new();
        for (key, val) in obj {
            if !column_names.iter().any(|c| c == key) {
                column_names.push(key.clone());
            }
            row.insert(key.clone(), json_to_value(val, i, key)?);
        }
        rows.push(row);
    }

    Ok(Dataset::from_rows(column_names, rows))
}

fn json_to_value(val: &JsonValue, row: usize, col: &str) -> std::result::Result<Value, String> {
    match val {
        JsonValue::String(s) => Ok(guess_value_type(s)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(format!("row {row}, column {col}: unrepresentable number"))
            }
        }
        JsonValue::Null => Ok(Value::Missing),
        other => Err(format!(
            "row {row}, column {col}: expected scalar, got {other}"
        )),
    }
}

fn malformed(path: &Path, reason: String) -> EdaError {
    EdaError::Malformed {
        path: path.to_path_buf(),
        reason,
    }
}

// ---------------------------------------------------------------------------
// Cleaning pass
// ---------------------------------------------------------------------------

/// Derive the cleaned view of a raw dataset:
///
/// 1. coerce the designated numeric columns ([`columns::NUMERIC`]) so that
///    numeric-looking text becomes `Integer`/`Float` and unparseable text
///    becomes an explicit `Missing` marker.  No row is ever dropped for a
///    failed coercion;
/// 2. drop exact-duplicate rows, keeping the first occurrence.
///
/// Coercion runs first so rows that differ only in number formatting
/// ("350000" vs "3,50,000") deduplicate too.  Idempotent: cleaning an
/// already-clean dataset changes nothing.
pub fn clean(dataset: &Dataset) -> Dataset {
    let mut seen: BTreeSet<Row> = BTreeSet::new();
    let mut rows = Vec::with_capacity(dataset.rows.len());

    for row in &dataset.rows {
        let cleaned: Row = row
            .iter()
            .map(|(col, val)| {
                let val = if columns::NUMERIC.contains(&col.as_str()) {
                    coerce_numeric(val)
                } else {
                    val.clone()
                };
                (col.clone(), val)
            })
            .collect();
        if seen.insert(cleaned.clone()) {
            rows.push(cleaned);
        }
    }

    Dataset::from_rows(dataset.column_names.clone(), rows)
}

/// Coerce a single cell to a numeric value.  Text with grouping commas
/// ("1,25,000") parses; anything else unparseable becomes `Missing`.
fn coerce_numeric(val: &Value) -> Value {
    match val {
        Value::Integer(_) | Value::Float(_) | Value::Missing => val.clone(),
        Value::Text(s) => {
            let stripped: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            if let Ok(i) = stripped.parse::<i64>() {
                Value::Integer(i)
            } else if let Ok(f) = stripped.parse::<f64>() {
                Value::Float(f)
            } else {
                Value::Missing
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetRepository – process-lifetime cache of raw and cleaned views
// ---------------------------------------------------------------------------

/// Owns the source file path and caches both views for the lifetime of the
/// process.  Datasets are read-only after construction; source-file change
/// detection is out of scope.
pub struct DatasetRepository {
    path: PathBuf,
    raw: Option<Dataset>,
    cleaned: Option<Dataset>,
}

impl DatasetRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            raw: None,
            cleaned: None,
        }
    }

    /// Parse the source file, once.
    pub fn load_raw(&mut self) -> Result<&Dataset> {
        let dataset = match self.raw.take() {
            Some(ds) => ds,
            None => {
                log::debug!("loading raw dataset from {}", self.path.display());
                let ds = load_file(&self.path)?;
                log::info!(
                    "loaded {} rows x {} columns from {}",
                    ds.len(),
                    ds.column_names.len(),
                    self.path.display()
                );
                ds
            }
        };
        Ok(self.raw.insert(dataset))
    }

    /// Derive the cleaned view from raw, once.
    pub fn load_cleaned(&mut self) -> Result<&Dataset> {
        let dataset = match self.cleaned.take() {
            Some(ds) => ds,
            None => {
                let cleaned = clean(self.load_raw()?);
                log::debug!(
                    "cleaned dataset: {} rows after deduplication",
                    cleaned.len()
                );
                cleaned
            }
        };
        Ok(self.cleaned.insert(dataset))
    }
}
