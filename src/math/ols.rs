//! Least squares solver.
//!
//! All model families here are linear in their amplitude parameters once the
//! shape parameters (center, width, rate, steepness) are fixed, so the fitter
//! repeatedly solves small regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - SVD also handles rank-deficient systems by returning the minimum-norm
//!   solution. That is what lets a degree-6 polynomial fit exactly 6 points,
//!   the same way `np.polyfit` does.
//! - Parameter dimensions are tiny (1–7 columns), so SVD performance is a
//!   non-issue even inside the shape grid search.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails. Near-singular
    // design matrices show up routinely during the shape grid search (e.g., a
    // sigmoid with extreme steepness makes the logistic column nearly constant).
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_handles_rank_deficient_system() {
        // Two identical columns: the minimum-norm solution splits the weight.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[2.0, 4.0, 6.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        // Fitted values must still reproduce y exactly.
        for i in 0..3 {
            let fit = beta[0] * x[(i, 0)] + beta[1] * x[(i, 1)];
            assert!((fit - y[i]).abs() < 1e-9);
        }
    }
}
