use serde::Serialize;

use crate::data::filter::partition_columns;
use crate::data::model::{columns, Dataset, Value};
use crate::error::{EdaError, Result};

use super::stats;

// ---------------------------------------------------------------------------
// Insights – the "Conclusions" payload
// ---------------------------------------------------------------------------

/// Precomputed headline facts for the conclusions view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub total_records: usize,
    pub highest_price_company: String,
    pub most_common_fuel_type: String,
    /// Numeric column (other than price) with the strongest correlation to
    /// price; `None` when no correlation is defined.  Explicitly
    /// "unavailable", never a silent default.
    pub strongest_price_correlate: Option<String>,
}

/// Compute the insight summary over the cleaned dataset.
pub fn summarize(dataset: &Dataset) -> Result<Insights> {
    if dataset.is_empty() {
        return Err(EdaError::InsufficientData(
            "cannot summarize an empty dataset".to_string(),
        ));
    }

    let partition = partition_columns(dataset);
    if !partition.is_numeric(columns::PRICE) {
        return Err(EdaError::InsufficientData(format!(
            "summary needs a numeric {} column",
            columns::PRICE
        )));
    }

    let missing: Vec<String> = [columns::COMPANY_NAME, columns::FUEL_TYPE]
        .iter()
        .filter(|c| !dataset.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EdaError::RequiredColumnsMissing(missing));
    }

    Ok(Insights {
        total_records: dataset.len(),
        highest_price_company: highest_price_company(dataset)?,
        most_common_fuel_type: most_common_fuel_type(dataset)?,
        strongest_price_correlate: strongest_price_correlate(dataset, &partition.numeric),
    })
}

/// Company of the listing with the maximum finite price.
fn highest_price_company(dataset: &Dataset) -> Result<String> {
    let mut best: Option<(f64, &Value)> = None;
    for row in &dataset.rows {
        let Some(price) = row.get(columns::PRICE).and_then(Value::as_f64) else {
            continue;
        };
        if !price.is_finite() {
            continue;
        }
        let Some(company) = row.get(columns::COMPANY_NAME) else {
            continue;
        };
        if company.is_missing() {
            continue;
        }
        if best.map_or(true, |(p, _)| price > p) {
            best = Some((price, company));
        }
    }
    best.map(|(_, company)| company.to_string()).ok_or_else(|| {
        EdaError::InsufficientData("no listing carries both a price and a company".to_string())
    })
}

/// Modal fuel type; ties resolve to the first-seen value, matching the
/// countplot ordering.
fn most_common_fuel_type(dataset: &Dataset) -> Result<String> {
    let mut counts: Vec<(&Value, usize)> = Vec::new();
    for row in &dataset.rows {
        let Some(fuel) = row.get(columns::FUEL_TYPE) else {
            continue;
        };
        if fuel.is_missing() {
            continue;
        }
        match counts.iter_mut().find(|(v, _)| *v == fuel) {
            Some((_, n)) => *n += 1,
            None => counts.push((fuel, 1)),
        }
    }
    let mut best: Option<(&Value, usize)> = None;
    for (v, n) in counts {
        // Strict comparison keeps the first-seen value on ties.
        if best.map_or(true, |(_, bn)| n > bn) {
            best = Some((v, n));
        }
    }
    best.map(|(v, _)| v.to_string()).ok_or_else(|| {
        EdaError::InsufficientData("no non-missing fuel type values".to_string())
    })
}

/// Numeric column with the maximum signed correlation to price, schema
/// order breaking ties.  Columns whose correlation with price is undefined
/// are skipped.
fn strongest_price_correlate(dataset: &Dataset, numeric: &[String]) -> Option<String> {
    let mut best: Option<(f64, &String)> = None;
    for column in numeric {
        if column == columns::PRICE {
            continue;
        }
        let pairs = stats::paired_values(dataset, columns::PRICE, column);
        let (prices, values): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let Ok(r) = stats::pearson(&prices, &values) else {
            continue;
        };
        // Strict comparison keeps the earlier (schema-order) column on ties.
        if best.map_or(true, |(br, _)| r > br) {
            best = Some((r, column));
        }
    }
    best.map(|(_, column)| column.clone())
}

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

/// Dashboard metric row.  Averages are rounded to 2 decimals; `None` means
/// the metric is unavailable for this view (column absent or no finite
/// values), one uniform policy instead of ad-hoc "N/A" fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_cars: usize,
    pub average_price: Option<f64>,
    pub average_km: Option<f64>,
    pub average_power: Option<f64>,
    pub company_count: Option<usize>,
}

/// Compute the metric row for any view (full or filtered).  Infallible:
/// an empty view simply reports every average as unavailable.
pub fn metrics(dataset: &Dataset) -> Metrics {
    let average = |column: &str| {
        stats::mean(&dataset.numeric_values(column)).map(|m| (m * 100.0).round() / 100.0)
    };
    let company_count = dataset.has_column(columns::COMPANY_NAME).then(|| {
        dataset
            .unique_values
            .get(columns::COMPANY_NAME)
            .map_or(0, |vals| vals.iter().filter(|v| !v.is_missing()).count())
    });

    Metrics {
        total_cars: dataset.len(),
        average_price: average(columns::PRICE),
        average_km: average(columns::KILOMETERS_DRIVEN),
        average_power: average(columns::POWER),
        company_count,
    }
}

// ---------------------------------------------------------------------------
// Location map
// ---------------------------------------------------------------------------

/// (latitude, longitude) pairs for the map view, or `None` when the dataset
/// has no coordinate columns at all.
pub fn map_points(dataset: &Dataset) -> Option<Vec<(f64, f64)>> {
    if !dataset.has_column(columns::LATITUDE) || !dataset.has_column(columns::LONGITUDE) {
        return None;
    }
    Some(stats::paired_values(
        dataset,
        columns::LATITUDE,
        columns::LONGITUDE,
    ))
}
