//! Penalised linear least squares.
//!
//! Minimises `|Xβ - y|² + Σ λ_j β_j²` by stacking `sqrt(λ_j)` rows under
//! the design matrix and solving the augmented ordinary least squares
//! problem with an SVD. A per-column penalty lets unpenalised columns
//! (intercept, slope) sit next to heavily shrunk ones (changepoint deltas).

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Singular values below this fraction of the largest mark a rank-deficient
/// system
const RANK_TOLERANCE: f64 = 1e-10;

/// Fit coefficients for the row-major `design` matrix against `target`.
///
/// `penalties` holds one non-negative ridge weight per column.
pub fn penalized_least_squares(
    design: &[Vec<f64>],
    target: &[f64],
    penalties: &[f64],
) -> Result<Vec<f64>> {
    if design.is_empty() {
        return Err(MathError::InsufficientData(
            "Design matrix has no rows".to_string(),
        ));
    }
    if design.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design matrix has {} rows but target has {} values",
            design.len(),
            target.len()
        )));
    }

    let p = design[0].len();
    if p == 0 {
        return Ok(Vec::new());
    }
    if penalties.len() != p {
        return Err(MathError::InvalidInput(format!(
            "Expected {} penalties, got {}",
            p,
            penalties.len()
        )));
    }
    if penalties.iter().any(|&l| l < 0.0 || !l.is_finite()) {
        return Err(MathError::InvalidInput(
            "Penalties must be finite and non-negative".to_string(),
        ));
    }
    if let Some(row) = design.iter().position(|r| r.len() != p) {
        return Err(MathError::InvalidInput(format!(
            "Row {} has {} columns, expected {}",
            row,
            design[row].len(),
            p
        )));
    }

    let n = design.len();
    let rows = n + p;
    let mut x = DMatrix::<f64>::zeros(rows, p);
    let mut y = DVector::<f64>::zeros(rows);
    for (i, (row, &value)) in design.iter().zip(target).enumerate() {
        for (j, &cell) in row.iter().enumerate() {
            x[(i, j)] = cell;
        }
        y[i] = value;
    }
    for (j, &lambda) in penalties.iter().enumerate() {
        x[(n + j, j)] = lambda.sqrt();
    }

    let svd = x.svd(true, true);
    let largest = svd.singular_values.max();
    let smallest = svd.singular_values.min();
    if !(largest > 0.0) || smallest <= RANK_TOLERANCE * largest {
        return Err(MathError::CalculationError(format!(
            "Singular system: condition ratio {:e}",
            if largest > 0.0 { smallest / largest } else { 0.0 }
        )));
    }

    let beta = svd
        .solve(&y, RANK_TOLERANCE * largest)
        .map_err(|e| MathError::CalculationError(e.to_string()))?;
    if beta.iter().any(|v| !v.is_finite()) {
        return Err(MathError::CalculationError(
            "Least squares solution is not finite".to_string(),
        ));
    }
    Ok(beta.iter().copied().collect())
}
