use serde::Serialize;

use crate::data::filter::ColumnTypePartition;
use crate::data::model::{columns, Dataset, Value};
use crate::error::{EdaError, Result};

use super::stats;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// How a numeric univariate distribution should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumericMode {
    Histogram,
    Kde,
    Boxplot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MultivariateMethod {
    Heatmap,
    Pairplot,
    GroupedBar,
}

/// One user interaction.  Constructed fresh per request, never persisted.
#[derive(Debug, Clone)]
pub enum AnalysisRequest {
    Univariate {
        column: String,
        /// Only consulted when `column` turns out to be numeric.
        numeric_mode: NumericMode,
    },
    Bivariate {
        x: String,
        y: String,
    },
    Multivariate(MultivariateMethod),
}

// ---------------------------------------------------------------------------
// Result payloads
// ---------------------------------------------------------------------------

/// What the renderer should draw.  The selector computes inputs only; it
/// never renders and never substitutes a different chart when a
/// precondition fails.
#[derive(Debug, Clone, Serialize)]
pub enum AnalysisResult {
    /// Countplot input: distinct value → row count, descending by count,
    /// ties in first-seen row order.
    CategoryCounts {
        column: String,
        counts: Vec<(Value, usize)>,
    },
    /// Histogram / KDE / boxplot input: the finite values of one column.
    NumericDistribution {
        column: String,
        values: Vec<f64>,
        mode: NumericMode,
    },
    ScatterWithCorrelation {
        x: String,
        y: String,
        points: Vec<(f64, f64)>,
        /// Pearson r rounded to 3 decimals.
        pearson_r: f64,
    },
    /// Boxplot of `value` per `group_by` category.  Which column lands on
    /// which role encodes the rendering orientation, so the mapping from
    /// the request's x/y must be preserved exactly.
    GroupedBoxplot {
        group_by: String,
        value: String,
        groups: Vec<(Value, Vec<f64>)>,
    },
    /// Hue-split countplot input: row count per (group, hue) pair.
    CrossCounts {
        group_by: String,
        hue: String,
        counts: Vec<((Value, Value), usize)>,
    },
    /// Pairwise Pearson matrix over the numeric columns; undefined cells
    /// are NaN.
    CorrelationHeatmap {
        columns: Vec<String>,
        matrix: Vec<Vec<f64>>,
    },
    /// The numeric sub-dataset, unchanged; the renderer owns the
    /// pairwise-scatter expansion.
    Pairplot {
        columns: Vec<String>,
        data: Dataset,
    },
    /// Mean price per fuel type, split by transmission when present.
    GroupedBar {
        group_by: String,
        hue: Option<String>,
        mean_price: Vec<(Value, Option<Value>, f64)>,
    },
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Decide which analysis applies and compute its inputs.
pub fn select(
    dataset: &Dataset,
    partition: &ColumnTypePartition,
    request: &AnalysisRequest,
) -> Result<AnalysisResult> {
    match request {
        AnalysisRequest::Univariate {
            column,
            numeric_mode,
        } => univariate(dataset, partition, column, *numeric_mode),
        AnalysisRequest::Bivariate { x, y } => bivariate(dataset, partition, x, y),
        AnalysisRequest::Multivariate(method) => multivariate(dataset, partition, *method),
    }
}

fn require_column(dataset: &Dataset, column: &str) -> Result<()> {
    if dataset.has_column(column) {
        Ok(())
    } else {
        Err(EdaError::UnknownColumn(column.to_string()))
    }
}

// ---- Univariate ----

fn univariate(
    dataset: &Dataset,
    partition: &ColumnTypePartition,
    column: &str,
    mode: NumericMode,
) -> Result<AnalysisResult> {
    require_column(dataset, column)?;

    if partition.is_categorical(column) {
        return Ok(AnalysisResult::CategoryCounts {
            column: column.to_string(),
            counts: category_counts(dataset, column),
        });
    }

    let values = dataset.numeric_values(column);
    let needed = match mode {
        // A histogram or density estimate over fewer than two points is
        // meaningless.
        NumericMode::Histogram | NumericMode::Kde => 2,
        NumericMode::Boxplot => 1,
    };
    if values.len() < needed {
        return Err(EdaError::InsufficientData(format!(
            "{mode:?} of {column} needs at least {needed} finite values, got {}",
            values.len()
        )));
    }

    Ok(AnalysisResult::NumericDistribution {
        column: column.to_string(),
        values,
        mode,
    })
}

/// Distinct non-missing value → count, descending; stable sort keeps the
/// first-seen order for ties.
fn category_counts(dataset: &Dataset, column: &str) -> Vec<(Value, usize)> {
    let mut counts: Vec<(Value, usize)> = Vec::new();
    for row in &dataset.rows {
        let Some(val) = row.get(column) else { continue };
        if val.is_missing() {
            continue;
        }
        match counts.iter_mut().find(|(v, _)| v == val) {
            Some((_, n)) => *n += 1,
            None => counts.push((val.clone(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

// ---- Bivariate ----

fn bivariate(
    dataset: &Dataset,
    partition: &ColumnTypePartition,
    x: &str,
    y: &str,
) -> Result<AnalysisResult> {
    require_column(dataset, x)?;
    require_column(dataset, y)?;

    match (partition.is_numeric(x), partition.is_numeric(y)) {
        (true, true) => {
            let points = stats::paired_values(dataset, x, y);
            let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().cloned().unzip();
            let r = stats::pearson(&xs, &ys)?;
            Ok(AnalysisResult::ScatterWithCorrelation {
                x: x.to_string(),
                y: y.to_string(),
                points,
                pearson_r: stats::round3(r),
            })
        }
        (true, false) => Ok(AnalysisResult::GroupedBoxplot {
            group_by: y.to_string(),
            value: x.to_string(),
            groups: grouped_values(dataset, y, x),
        }),
        (false, true) => Ok(AnalysisResult::GroupedBoxplot {
            group_by: x.to_string(),
            value: y.to_string(),
            groups: grouped_values(dataset, x, y),
        }),
        (false, false) => Ok(AnalysisResult::CrossCounts {
            group_by: x.to_string(),
            hue: y.to_string(),
            counts: cross_counts(dataset, x, y),
        }),
    }
}

/// Numeric values of `value_col` per category of `group_col`, groups in
/// first-seen row order.  Rows with a missing group value are skipped;
/// rows with a missing numeric value still establish their group.
fn grouped_values(dataset: &Dataset, group_col: &str, value_col: &str) -> Vec<(Value, Vec<f64>)> {
    let mut groups: Vec<(Value, Vec<f64>)> = Vec::new();
    for row in &dataset.rows {
        let Some(group) = row.get(group_col) else { continue };
        if group.is_missing() {
            continue;
        }
        let idx = match groups.iter().position(|(g, _)| g == group) {
            Some(i) => i,
            None => {
                groups.push((group.clone(), Vec::new()));
                groups.len() - 1
            }
        };
        if let Some(v) = row.get(value_col).and_then(Value::as_f64) {
            if v.is_finite() {
                groups[idx].1.push(v);
            }
        }
    }
    groups
}

/// Row count per (x, y) category pair, first-seen order; rows missing
/// either side are skipped.
fn cross_counts(dataset: &Dataset, x: &str, y: &str) -> Vec<((Value, Value), usize)> {
    let mut counts: Vec<((Value, Value), usize)> = Vec::new();
    for row in &dataset.rows {
        let (Some(xv), Some(yv)) = (row.get(x), row.get(y)) else {
            continue;
        };
        if xv.is_missing() || yv.is_missing() {
            continue;
        }
        match counts
            .iter_mut()
            .find(|((a, b), _)| a == xv && b == yv)
        {
            Some((_, n)) => *n += 1,
            None => counts.push(((xv.clone(), yv.clone()), 1)),
        }
    }
    counts
}

// ---- Multivariate ----

fn multivariate(
    dataset: &Dataset,
    partition: &ColumnTypePartition,
    method: MultivariateMethod,
) -> Result<AnalysisResult> {
    match method {
        MultivariateMethod::Heatmap => {
            let numeric = require_numeric_columns(partition)?;
            let matrix = stats::correlation_matrix(dataset, &numeric);
            Ok(AnalysisResult::CorrelationHeatmap {
                columns: numeric,
                matrix,
            })
        }
        MultivariateMethod::Pairplot => {
            let numeric = require_numeric_columns(partition)?;
            let data = dataset.project(&numeric);
            Ok(AnalysisResult::Pairplot {
                columns: numeric,
                data,
            })
        }
        MultivariateMethod::GroupedBar => grouped_bar(dataset),
    }
}

fn require_numeric_columns(partition: &ColumnTypePartition) -> Result<Vec<String>> {
    if partition.numeric.len() < 2 {
        return Err(EdaError::InsufficientColumns(partition.numeric.len()));
    }
    Ok(partition.numeric.clone())
}

/// Mean price per fuel type, with a transmission hue when the column
/// exists.  Groups whose price values are all missing are omitted rather
/// than reported as zero.
fn grouped_bar(dataset: &Dataset) -> Result<AnalysisResult> {
    let missing: Vec<String> = [columns::FUEL_TYPE, columns::PRICE]
        .iter()
        .filter(|c| !dataset.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EdaError::RequiredColumnsMissing(missing));
    }

    let hue = dataset
        .has_column(columns::TRANSMISSION)
        .then(|| columns::TRANSMISSION.to_string());

    let mut groups: Vec<((Value, Option<Value>), Vec<f64>)> = Vec::new();
    for row in &dataset.rows {
        let Some(fuel) = row.get(columns::FUEL_TYPE) else {
            continue;
        };
        if fuel.is_missing() {
            continue;
        }
        let hue_val = match &hue {
            Some(col) => match row.get(col.as_str()) {
                Some(v) if !v.is_missing() => Some(v.clone()),
                _ => continue,
            },
            None => None,
        };
        let key = (fuel.clone(), hue_val);
        let idx = match groups.iter().position(|(k, _)| *k == key) {
            Some(i) => i,
            None => {
                groups.push((key, Vec::new()));
                groups.len() - 1
            }
        };
        if let Some(p) = row.get(columns::PRICE).and_then(Value::as_f64) {
            if p.is_finite() {
                groups[idx].1.push(p);
            }
        }
    }

    let mean_price = groups
        .into_iter()
        .filter_map(|((fuel, hue_val), prices)| {
            stats::mean(&prices).map(|m| (fuel, hue_val, m))
        })
        .collect();

    Ok(AnalysisResult::GroupedBar {
        group_by: columns::FUEL_TYPE.to_string(),
        hue,
        mean_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::partition_columns;
    use crate::data::model::Row;
    use approx::assert_abs_diff_eq;

    fn listing(company: &str, fuel: &str, trans: &str, price: i64, km: i64) -> Row {
        Row::from([
            ("Company_Name".to_string(), Value::Text(company.into())),
            ("Fuel_Type".to_string(), Value::Text(fuel.into())),
            ("Transmission".to_string(), Value::Text(trans.into())),
            ("Price".to_string(), Value::Integer(price)),
            ("Kilometers_Driven".to_string(), Value::Integer(km)),
        ])
    }

    fn cars() -> Dataset {
        Dataset::from_rows(
            vec![
                "Company_Name".into(),
                "Fuel_Type".into(),
                "Transmission".into(),
                "Price".into(),
                "Kilometers_Driven".into(),
            ],
            vec![
                listing("Honda", "Petrol", "Manual", 10, 100),
                listing("BMW", "Diesel", "Automatic", 20, 200),
                listing("Honda", "Petrol", "Manual", 30, 300),
            ],
        )
    }

    fn run(ds: &Dataset, request: AnalysisRequest) -> Result<AnalysisResult> {
        let partition = partition_columns(ds);
        select(ds, &partition, &request)
    }

    #[test]
    fn univariate_categorical_counts_descending() {
        let result = run(
            &cars(),
            AnalysisRequest::Univariate {
                column: "Fuel_Type".into(),
                numeric_mode: NumericMode::Histogram,
            },
        )
        .unwrap();
        let AnalysisResult::CategoryCounts { counts, .. } = result else {
            panic!("expected CategoryCounts, got {result:?}");
        };
        assert_eq!(
            counts,
            vec![
                (Value::Text("Petrol".into()), 2),
                (Value::Text("Diesel".into()), 1),
            ]
        );
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, cars().len());
    }

    #[test]
    fn category_count_ties_keep_first_seen_order() {
        // Petrol appears first in the rows but sorts after Diesel; on equal
        // counts the row order must win, with the larger CNG group ahead.
        let rows = ["CNG", "Petrol", "Diesel", "CNG", "Petrol", "CNG", "Diesel"]
            .iter()
            .map(|fuel| Row::from([("Fuel_Type".to_string(), Value::Text(fuel.to_string()))]))
            .collect();
        let ds = Dataset::from_rows(vec!["Fuel_Type".into()], rows);

        let result = run(
            &ds,
            AnalysisRequest::Univariate {
                column: "Fuel_Type".into(),
                numeric_mode: NumericMode::Histogram,
            },
        )
        .unwrap();
        let AnalysisResult::CategoryCounts { counts, .. } = result else {
            panic!("expected CategoryCounts, got {result:?}");
        };
        assert_eq!(
            counts,
            vec![
                (Value::Text("CNG".into()), 3),
                (Value::Text("Petrol".into()), 2),
                (Value::Text("Diesel".into()), 2),
            ]
        );
    }

    #[test]
    fn univariate_numeric_returns_distribution() {
        let result = run(
            &cars(),
            AnalysisRequest::Univariate {
                column: "Price".into(),
                numeric_mode: NumericMode::Kde,
            },
        )
        .unwrap();
        let AnalysisResult::NumericDistribution { values, mode, .. } = result else {
            panic!("expected NumericDistribution, got {result:?}");
        };
        assert_eq!(values, vec![10.0, 20.0, 30.0]);
        assert_eq!(mode, NumericMode::Kde);
    }

    #[test]
    fn histogram_of_single_value_fails() {
        let ds = Dataset::from_rows(
            vec!["Price".into()],
            vec![Row::from([("Price".to_string(), Value::Integer(5))])],
        );
        let err = run(
            &ds,
            AnalysisRequest::Univariate {
                column: "Price".into(),
                numeric_mode: NumericMode::Histogram,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EdaError::InsufficientData(_)));
    }

    #[test]
    fn boxplot_of_single_value_is_fine() {
        let ds = Dataset::from_rows(
            vec!["Price".into()],
            vec![Row::from([("Price".to_string(), Value::Integer(5))])],
        );
        assert!(run(
            &ds,
            AnalysisRequest::Univariate {
                column: "Price".into(),
                numeric_mode: NumericMode::Boxplot,
            },
        )
        .is_ok());
    }

    #[test]
    fn unknown_column_is_an_error() {
        let err = run(
            &cars(),
            AnalysisRequest::Univariate {
                column: "Mileage".into(),
                numeric_mode: NumericMode::Histogram,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EdaError::UnknownColumn(c) if c == "Mileage"));
    }

    #[test]
    fn bivariate_numeric_numeric_scatter_with_r() {
        let result = run(
            &cars(),
            AnalysisRequest::Bivariate {
                x: "Price".into(),
                y: "Kilometers_Driven".into(),
            },
        )
        .unwrap();
        let AnalysisResult::ScatterWithCorrelation {
            points, pearson_r, ..
        } = result
        else {
            panic!("expected ScatterWithCorrelation, got {result:?}");
        };
        assert_eq!(points.len(), 3);
        assert_abs_diff_eq!(pearson_r, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn bivariate_orientation_is_preserved() {
        // numeric x, categorical y: the categorical side groups.
        let result = run(
            &cars(),
            AnalysisRequest::Bivariate {
                x: "Price".into(),
                y: "Fuel_Type".into(),
            },
        )
        .unwrap();
        let AnalysisResult::GroupedBoxplot {
            group_by, value, ..
        } = &result
        else {
            panic!("expected GroupedBoxplot, got {result:?}");
        };
        assert_eq!(group_by, "Fuel_Type");
        assert_eq!(value, "Price");

        // Swapped request: same roles, so the renderer flips the axes.
        let swapped = run(
            &cars(),
            AnalysisRequest::Bivariate {
                x: "Fuel_Type".into(),
                y: "Price".into(),
            },
        )
        .unwrap();
        let AnalysisResult::GroupedBoxplot {
            group_by, value, groups,
        } = swapped
        else {
            panic!("expected GroupedBoxplot");
        };
        assert_eq!(group_by, "Fuel_Type");
        assert_eq!(value, "Price");
        assert_eq!(
            groups,
            vec![
                (Value::Text("Petrol".into()), vec![10.0, 30.0]),
                (Value::Text("Diesel".into()), vec![20.0]),
            ]
        );
    }

    #[test]
    fn bivariate_categorical_categorical_cross_counts() {
        let result = run(
            &cars(),
            AnalysisRequest::Bivariate {
                x: "Company_Name".into(),
                y: "Fuel_Type".into(),
            },
        )
        .unwrap();
        let AnalysisResult::CrossCounts { counts, .. } = result else {
            panic!("expected CrossCounts, got {result:?}");
        };
        assert_eq!(
            counts,
            vec![
                (
                    (Value::Text("Honda".into()), Value::Text("Petrol".into())),
                    2
                ),
                (
                    (Value::Text("BMW".into()), Value::Text("Diesel".into())),
                    1
                ),
            ]
        );
    }

    #[test]
    fn scatter_on_zero_variance_axis_fails() {
        let rows = vec![
            Row::from([
                ("A".to_string(), Value::Integer(1)),
                ("B".to_string(), Value::Integer(7)),
            ]),
            Row::from([
                ("A".to_string(), Value::Integer(2)),
                ("B".to_string(), Value::Integer(7)),
            ]),
        ];
        let ds = Dataset::from_rows(vec!["A".into(), "B".into()], rows);
        let err = run(
            &ds,
            AnalysisRequest::Bivariate {
                x: "A".into(),
                y: "B".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EdaError::InsufficientData(_)));
    }

    #[test]
    fn heatmap_over_perfectly_correlated_columns() {
        let result = run(
            &cars(),
            AnalysisRequest::Multivariate(MultivariateMethod::Heatmap),
        )
        .unwrap();
        let AnalysisResult::CorrelationHeatmap { columns, matrix } = result else {
            panic!("expected CorrelationHeatmap, got {result:?}");
        };
        assert_eq!(columns, vec!["Price", "Kilometers_Driven"]);
        assert_abs_diff_eq!(matrix[0][0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix[1][1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix[0][1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn heatmap_needs_two_numeric_columns() {
        let ds = Dataset::from_rows(
            vec!["Fuel_Type".into(), "Price".into()],
            vec![Row::from([
                ("Fuel_Type".to_string(), Value::Text("Petrol".into())),
                ("Price".to_string(), Value::Integer(10)),
            ])],
        );
        let err = run(&ds, AnalysisRequest::Multivariate(MultivariateMethod::Heatmap))
            .unwrap_err();
        assert!(matches!(err, EdaError::InsufficientColumns(1)));
    }

    #[test]
    fn pairplot_passes_numeric_subset_through() {
        let result = run(
            &cars(),
            AnalysisRequest::Multivariate(MultivariateMethod::Pairplot),
        )
        .unwrap();
        let AnalysisResult::Pairplot { columns, data } = result else {
            panic!("expected Pairplot, got {result:?}");
        };
        assert_eq!(columns, vec!["Price", "Kilometers_Driven"]);
        assert_eq!(data.len(), 3);
        assert_eq!(data.column_names, columns);
    }

    #[test]
    fn grouped_bar_splits_by_transmission() {
        let result = run(
            &cars(),
            AnalysisRequest::Multivariate(MultivariateMethod::GroupedBar),
        )
        .unwrap();
        let AnalysisResult::GroupedBar {
            hue, mean_price, ..
        } = result
        else {
            panic!("expected GroupedBar, got {result:?}");
        };
        assert_eq!(hue.as_deref(), Some("Transmission"));
        assert_eq!(
            mean_price,
            vec![
                (
                    Value::Text("Petrol".into()),
                    Some(Value::Text("Manual".into())),
                    20.0
                ),
                (
                    Value::Text("Diesel".into()),
                    Some(Value::Text("Automatic".into())),
                    20.0
                ),
            ]
        );
    }

    #[test]
    fn grouped_bar_without_required_columns_fails() {
        let ds = Dataset::from_rows(
            vec!["Company_Name".into()],
            vec![Row::from([(
                "Company_Name".to_string(),
                Value::Text("Honda".into()),
            )])],
        );
        let err = run(&ds, AnalysisRequest::Multivariate(MultivariateMethod::GroupedBar))
            .unwrap_err();
        let EdaError::RequiredColumnsMissing(missing) = err else {
            panic!("expected RequiredColumnsMissing, got {err:?}");
        };
        assert_eq!(missing, vec!["Fuel_Type", "Price"]);
    }

    #[test]
    fn empty_filtered_view_yields_empty_counts() {
        let ds = Dataset::from_rows(
            vec!["Fuel_Type".into(), "Price".into()],
            vec![],
        );
        let result = run(
            &ds,
            AnalysisRequest::Univariate {
                column: "Fuel_Type".into(),
                numeric_mode: NumericMode::Histogram,
            },
        )
        .unwrap();
        let AnalysisResult::CategoryCounts { counts, .. } = result else {
            panic!("expected CategoryCounts");
        };
        assert!(counts.is_empty());
    }
}
