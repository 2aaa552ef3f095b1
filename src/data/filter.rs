use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{EdaError, Result};

use super::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// FilterSpec – one categorical selection plus an inclusive year range
// ---------------------------------------------------------------------------

/// User-selected filter: keep rows whose `category_column` value is in
/// `selected` and whose `year_column` value lies within `year_range`
/// (inclusive on both ends).
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub category_column: String,
    pub selected: BTreeSet<Value>,
    pub year_column: String,
    pub year_range: (i64, i64),
}

impl FilterSpec {
    /// Validates the range up front so `apply` never sees min > max.
    pub fn new(
        category_column: impl Into<String>,
        selected: BTreeSet<Value>,
        year_column: impl Into<String>,
        year_range: (i64, i64),
    ) -> Result<Self> {
        let (min, max) = year_range;
        if min > max {
            return Err(EdaError::InvalidFilter(format!(
                "year range {min}..={max} has min > max"
            )));
        }
        Ok(Self {
            category_column: category_column.into(),
            selected,
            year_column: year_column.into(),
            year_range,
        })
    }

    /// Check the selection against a concrete dataset: every selected
    /// category must be among the column's distinct values.  `apply` does
    /// not re-check this; call `validate` when the selection comes from
    /// anywhere other than [`available_categories`].
    pub fn validate(&self, dataset: &Dataset) -> Result<()> {
        let available = available_categories(dataset, &self.category_column)?;
        let unknown: Vec<String> = self
            .selected
            .difference(&available)
            .map(|v| v.to_string())
            .collect();
        if !unknown.is_empty() {
            return Err(EdaError::InvalidFilter(format!(
                "selected categories not present in {}: {}",
                self.category_column,
                unknown.join(", ")
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Filter queries
// ---------------------------------------------------------------------------

/// Distinct non-missing values of a categorical column, for building the
/// selection widget.
pub fn available_categories(dataset: &Dataset, column: &str) -> Result<BTreeSet<Value>> {
    let values = dataset
        .unique_values
        .get(column)
        .ok_or_else(|| EdaError::UnknownColumn(column.to_string()))?;
    Ok(values
        .iter()
        .filter(|v| !v.is_missing())
        .cloned()
        .collect())
}

/// Inclusive (min, max) over a numeric column, for the range slider.
pub fn year_bounds(dataset: &Dataset, column: &str) -> Result<(i64, i64)> {
    if !dataset.has_column(column) {
        return Err(EdaError::UnknownColumn(column.to_string()));
    }
    let years = dataset.numeric_values(column);
    if years.is_empty() {
        return Err(EdaError::EmptyDataset);
    }
    let min = years.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = years.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Ok((min as i64, max as i64))
}

/// Apply a filter, producing a new row sequence.
///
/// Rows with a missing value in either filter column are excluded, never
/// ambiguously included.  An empty result is a valid empty dataset, not an
/// error; downstream statistics handle the empty case themselves.
///
/// Selected values absent from the dataset simply match nothing here; the
/// subset invariant is enforced by [`FilterSpec::validate`], not re-checked
/// per row.
pub fn apply(dataset: &Dataset, spec: &FilterSpec) -> Result<Dataset> {
    for col in [&spec.category_column, &spec.year_column] {
        if !dataset.has_column(col) {
            return Err(EdaError::UnknownColumn(col.clone()));
        }
    }

    let (min, max) = spec.year_range;
    let rows = dataset
        .rows
        .iter()
        .filter(|row| {
            let category_ok = match row.get(&spec.category_column) {
                Some(v) if !v.is_missing() => spec.selected.contains(v),
                _ => false,
            };
            let year_ok = match row.get(&spec.year_column).and_then(Value::as_f64) {
                Some(y) => y >= min as f64 && y <= max as f64,
                None => false,
            };
            category_ok && year_ok
        })
        .cloned()
        .collect();

    Ok(Dataset::from_rows(dataset.column_names.clone(), rows))
}

// ---------------------------------------------------------------------------
// Column-type partition
// ---------------------------------------------------------------------------

/// Disjoint split of the column set into numeric and categorical columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnTypePartition {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnTypePartition {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }
}

/// Classify every column as numeric or categorical by inspecting its values.
///
/// A column is numeric when it holds at least one non-missing value and all
/// non-missing values are numbers.  Mixed numeric/text columns and columns
/// with only missing values tie toward categorical.
pub fn partition_columns(dataset: &Dataset) -> ColumnTypePartition {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();

    for name in &dataset.column_names {
        let values = dataset
            .unique_values
            .get(name)
            .into_iter()
            .flatten()
            .filter(|v| !v.is_missing());

        let mut any = false;
        let mut all_numeric = true;
        for v in values {
            any = true;
            if v.as_f64().is_none() {
                all_numeric = false;
                break;
            }
        }

        if any && all_numeric {
            numeric.push(name.clone());
        } else {
            categorical.push(name.clone());
        }
    }

    ColumnTypePartition {
        numeric,
        categorical,
    }
}
