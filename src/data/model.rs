use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Canonical column names
// ---------------------------------------------------------------------------

/// Column-name contract shared with the source CSV files.
///
/// `POWER` is the single canonical power column; historical exports that
/// wrote `Power_Value` are not recognised.
pub mod columns {
    pub const COMPANY_NAME: &str = "Company_Name";
    pub const PRICE: &str = "Price";
    pub const KILOMETERS_DRIVEN: &str = "Kilometers_Driven";
    pub const YEAR: &str = "Year";
    pub const FUEL_TYPE: &str = "Fuel_Type";
    pub const TRANSMISSION: &str = "Transmission";
    pub const POWER: &str = "Power";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";

    /// Columns the cleaning pass coerces to numeric.
    pub const NUMERIC: &[&str] = &[
        PRICE,
        KILOMETERS_DRIVEN,
        YEAR,
        POWER,
        LATITUDE,
        LONGITUDE,
    ];
}

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    /// Explicit missing marker; coercion failures become this, never a
    /// dropped row.
    Missing,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Missing => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Missing, Missing) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Missing => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Missing => write!(f, "<missing>"),
        }
    }
}

impl Value {
    /// Try to interpret the value as an `f64` for numeric analysis.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

// ---------------------------------------------------------------------------
// Row / Dataset
// ---------------------------------------------------------------------------

/// One listing (one row of the source table): column_name → value.
pub type Row = BTreeMap<String, Value>;

/// The full parsed table with pre-computed column indices.
///
/// `column_names` keeps the header order of the source file; insight
/// tie-breaking relies on that schema order.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    /// All listings (rows).
    pub rows: Vec<Row>,
    /// Column names in schema (header) order.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<Value>>,
}

impl Dataset {
    /// Build column indices from parsed rows.  `column_names` comes from the
    /// source header so schema order survives the `BTreeMap` rows.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Row>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<Value>> = BTreeMap::new();
        for name in &column_names {
            unique_values.entry(name.clone()).or_default();
        }
        for row in &rows {
            for (col, val) in row {
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        Dataset {
            rows,
            column_names,
            unique_values,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }

    /// All finite numeric values of a column, in row order.  Missing and
    /// non-numeric cells are skipped.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(column).and_then(Value::as_f64))
            .filter(|v| v.is_finite())
            .collect()
    }

    /// Project the dataset onto a subset of columns (schema order kept).
    pub fn project(&self, keep: &[String]) -> Dataset {
        let column_names: Vec<String> = self
            .column_names
            .iter()
            .filter(|c| keep.contains(c))
            .cloned()
            .collect();
        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|(col, _)| column_names.contains(col))
                    .map(|(col, val)| (col.clone(), val.clone()))
                    .collect()
            })
            .collect();
        Dataset::from_rows(column_names, rows)
    }
}
