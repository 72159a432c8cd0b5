//! Penalized (ridge) least squares
//!
//! Solves `min_b sum_i (y_i - x_i . b)^2 + sum_j lambda_j b_j^2`
//! through the normal equations and nalgebra's Cholesky factorisation. A per-column
//! penalty lets callers express a Gaussian prior with a different scale for
//! every coefficient group (trend, change points, seasonalities).

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Largest number of diagonal jitter retries before giving up
const MAX_JITTER_ATTEMPTS: usize = 6;

/// Penalized least-squares solver with one penalty per column
#[derive(Debug, Clone)]
pub struct PenalizedLeastSquares {
    penalties: Vec<f64>,
}

impl PenalizedLeastSquares {
    /// Create a new solver from per-column penalties (each must be finite and non-negative)
    pub fn new(penalties: Vec<f64>) -> Result<Self> {
        if penalties.is_empty() {
            return Err(MathError::InvalidInput(
                "At least one column is required".to_string(),
            ));
        }
        if let Some(bad) = penalties.iter().find(|p| !(p.is_finite() && **p >= 0.0)) {
            return Err(MathError::InvalidInput(format!(
                "Penalty must be finite and non-negative, got {}",
                bad
            )));
        }

        Ok(Self { penalties })
    }

    /// Solve for the coefficient vector of `design * b ~ targets`
    pub fn solve(&self, design: &DMatrix<f64>, targets: &DVector<f64>) -> Result<DVector<f64>> {
        let p = self.penalties.len();

        if design.nrows() == 0 {
            return Err(MathError::InsufficientData(
                "Design matrix has no rows".to_string(),
            ));
        }
        if design.nrows() != targets.len() {
            return Err(MathError::InvalidInput(format!(
                "Design has {} rows but {} targets were given",
                design.nrows(),
                targets.len()
            )));
        }
        if design.ncols() != p {
            return Err(MathError::InvalidInput(format!(
                "Design has {} columns, expected {}",
                design.ncols(),
                p
            )));
        }

        let transposed = design.transpose();
        let mut normal = &transposed * design;
        for (i, penalty) in self.penalties.iter().enumerate() {
            normal[(i, i)] += penalty;
        }
        let rhs = transposed * targets;

        solve_with_jitter(normal, &rhs)
    }
}

/// Solve a symmetric system, adding growing diagonal jitter when it is only
/// positive semi-definite.
fn solve_with_jitter(matrix: DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
    let n = matrix.nrows();
    let trace: f64 = matrix.diagonal().iter().map(|v| v.abs()).sum();
    let base = (trace / n.max(1) as f64).max(1.0) * 1e-10;

    for attempt in 0..=MAX_JITTER_ATTEMPTS {
        let mut m = matrix.clone();
        if attempt > 0 {
            let jitter = base * 10f64.powi(attempt as i32);
            for i in 0..n {
                m[(i, i)] += jitter;
            }
        }
        if let Some(solution) = cholesky_solve(m, rhs) {
            return Ok(solution);
        }
    }

    Err(MathError::CalculationError(format!(
        "Normal equations are not positive definite after {} jitter attempts",
        MAX_JITTER_ATTEMPTS
    )))
}

/// Solve `A x = b` for a symmetric positive-definite `A`.
/// `None` when the factorisation fails or the solution is not finite.
fn cholesky_solve(matrix: DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    let solution = matrix.cholesky()?.solve(rhs);
    solution.iter().all(|v| v.is_finite()).then_some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn design(rows: &[&[f64]]) -> DMatrix<f64> {
        DMatrix::from_fn(rows.len(), rows[0].len(), |i, j| rows[i][j])
    }

    fn column(values: impl IntoIterator<Item = f64>) -> DVector<f64> {
        DVector::from_vec(values.into_iter().collect())
    }

    #[test]
    fn test_cholesky_solves_spd_system() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 2.0, 2.0, 3.0]);
        let x = cholesky_solve(a, &column([2.0, 1.0])).unwrap();

        // 4x + 2y = 2, 2x + 3y = 1  =>  x = 0.5, y = 0
        assert_abs_diff_eq!(x[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(cholesky_solve(a, &column([1.0, 1.0])).is_none());
    }

    #[test]
    fn test_unpenalized_fit_recovers_line() {
        // y = 3 + 2x
        let x = DMatrix::from_fn(10, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let y = column((0..10).map(|x| 3.0 + 2.0 * x as f64));

        let solver = PenalizedLeastSquares::new(vec![0.0, 0.0]).unwrap();
        let beta = solver.solve(&x, &y).unwrap();

        assert_abs_diff_eq!(beta[0], 3.0, epsilon = 1e-8);
        assert_abs_diff_eq!(beta[1], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn test_penalty_shrinks_towards_zero() {
        let x = DMatrix::from_fn(5, 1, |i, _| i as f64);
        let y = column((0..5).map(|x| 2.0 * x as f64));

        let loose = PenalizedLeastSquares::new(vec![0.0]).unwrap();
        let tight = PenalizedLeastSquares::new(vec![100.0]).unwrap();

        let b_loose = loose.solve(&x, &y).unwrap()[0];
        let b_tight = tight.solve(&x, &y).unwrap()[0];

        assert_abs_diff_eq!(b_loose, 2.0, epsilon = 1e-9);
        assert!(b_tight > 0.0 && b_tight < b_loose);
    }

    #[test]
    fn test_collinear_columns_still_solve_with_penalty() {
        // Second column duplicates the first; the penalty keeps the system definite
        let x = DMatrix::from_fn(6, 2, |i, _| i as f64);
        let y = column((0..6).map(|x| x as f64));

        let solver = PenalizedLeastSquares::new(vec![0.01, 0.01]).unwrap();
        let beta = solver.solve(&x, &y).unwrap();

        assert_abs_diff_eq!(beta[0], beta[1], epsilon = 1e-9);
        assert_abs_diff_eq!(beta[0] + beta[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_singular_system_is_rescued_by_jitter() {
        // Unpenalized duplicate columns: X'X = [[4, 4], [4, 4]] has a zero pivot
        let x = design(&[&[1.0, 1.0], &[1.0, 1.0], &[1.0, 1.0], &[1.0, 1.0]]);
        let y = column([3.0; 4]);

        let solver = PenalizedLeastSquares::new(vec![0.0, 0.0]).unwrap();
        let beta = solver.solve(&x, &y).unwrap();

        assert_abs_diff_eq!(beta[0], beta[1], epsilon = 1e-9);
        assert_abs_diff_eq!(beta[0] + beta[1], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_shape_validation() {
        let solver = PenalizedLeastSquares::new(vec![0.0, 0.0]).unwrap();
        let x = design(&[&[1.0, 0.0], &[1.0, 1.0]]);

        assert!(solver.solve(&x, &column([1.0])).is_err());
        assert!(solver
            .solve(&design(&[&[1.0]]), &column([1.0]))
            .is_err());
        assert!(solver
            .solve(&DMatrix::zeros(0, 2), &column([]))
            .is_err());
        assert!(PenalizedLeastSquares::new(vec![-1.0]).is_err());
        assert!(PenalizedLeastSquares::new(Vec::new()).is_err());
    }
}
