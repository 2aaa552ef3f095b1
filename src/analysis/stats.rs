use crate::data::model::{Dataset, Value};
use crate::error::{EdaError, Result};

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Arithmetic mean; `None` for an empty slice (mean of zero rows is
/// undefined, never zero).
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Round to three decimals, the precision the dashboard displays
/// correlations at.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Pearson correlation coefficient over paired observations.
///
/// Fails with `InsufficientData` below 2 pairs or when either axis has zero
/// variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n < 2 {
        return Err(EdaError::InsufficientData(format!(
            "Pearson correlation needs at least 2 paired observations, got {n}"
        )));
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    if sum_sq_x == 0.0 || sum_sq_y == 0.0 {
        return Err(EdaError::InsufficientData(
            "Pearson correlation undefined for zero-variance input".to_string(),
        ));
    }

    Ok(numerator / (sum_sq_x * sum_sq_y).sqrt())
}

/// Rows where both columns hold finite numbers, as paired points.
pub fn paired_values(dataset: &Dataset, x: &str, y: &str) -> Vec<(f64, f64)> {
    dataset
        .rows
        .iter()
        .filter_map(|row| {
            let xv = row.get(x).and_then(Value::as_f64)?;
            let yv = row.get(y).and_then(Value::as_f64)?;
            (xv.is_finite() && yv.is_finite()).then_some((xv, yv))
        })
        .collect()
}

/// Full pairwise Pearson matrix over the given columns.
///
/// Mirrors Pandas' `DataFrame.corr()`: the diagonal is 1.0 and cells whose
/// correlation is undefined (too few pairs, zero variance) are `NaN` rather
/// than an error, so one degenerate column cannot sink the whole heatmap.
pub fn correlation_matrix(dataset: &Dataset, columns: &[String]) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let pairs = paired_values(dataset, &columns[i], &columns[j]);
            let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
            let r = pearson(&xs, &ys).unwrap_or(f64::NAN);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    matrix
}
