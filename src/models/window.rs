//! Data-driven search windows for the nonlinear shape parameters.
//!
//! These play the role of the initial parameter guesses the analyses start
//! from: instead of a single point estimate handed to a black-box solver, each
//! family gets a deterministic window per shape dimension that the fitter
//! grid-searches and then zooms.
//!
//! The windows are deliberately generous. Centers span the observed x-range;
//! rates and steepnesses span several orders of magnitude around `1/span`,
//! where `span` is the observed x-range width, so the same window works
//! whether x is a velocity in [0, 4] or a percentage in [0, 100].

use crate::domain::ModelFamily;
use crate::error::AppError;

/// Axis scale for a shape dimension's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeScale {
    Linear,
    Log,
}

/// Search window for one shape dimension.
#[derive(Debug, Clone, Copy)]
pub struct ShapeDim {
    pub min: f64,
    pub max: f64,
    pub scale: ShapeScale,
}

/// Derive the initial shape window for a family from the observed x values.
///
/// Returns an empty vector for purely linear families (polynomials), which
/// skip the grid search entirely.
pub fn shape_window(family: ModelFamily, x: &[f64]) -> Result<Vec<ShapeDim>, AppError> {
    if family.shape_len() == 0 {
        return Ok(Vec::new());
    }

    let (x_min, x_max) = bounds(x);
    let span = x_max - x_min;
    if !(span.is_finite() && span > 0.0) {
        return Err(AppError::new(
            crate::error::FIT_FAILURE_CODE,
            format!(
                "Cannot fit {}: x values have no spread.",
                family.display_name()
            ),
        ));
    }

    let window = match family {
        ModelFamily::Polynomial { .. } => unreachable!("handled above"),
        ModelFamily::Gaussian => vec![
            // center
            ShapeDim {
                min: x_min,
                max: x_max,
                scale: ShapeScale::Linear,
            },
            // width
            ShapeDim {
                min: span / 100.0,
                max: span * 2.0,
                scale: ShapeScale::Log,
            },
        ],
        ModelFamily::ExpDecay | ModelFamily::InvDecay => vec![
            // decay rate
            ShapeDim {
                min: 0.01 / span,
                max: 100.0 / span,
                scale: ShapeScale::Log,
            },
        ],
        ModelFamily::Sigmoid | ModelFamily::SigmoidBaseline => vec![
            // steepness
            ShapeDim {
                min: 0.1 / span,
                max: 500.0 / span,
                scale: ShapeScale::Log,
            },
            // center
            ShapeDim {
                min: x_min,
                max: x_max,
                scale: ShapeScale::Linear,
            },
        ],
    };

    Ok(window)
}

fn bounds(x: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in x {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_window_spans_x_range() {
        let x = [0.5, 1.0, 2.0, 3.0, 4.0];
        let dims = shape_window(ModelFamily::Gaussian, &x).unwrap();
        assert_eq!(dims.len(), 2);
        assert_eq!(dims[0].scale, ShapeScale::Linear);
        assert!((dims[0].min - 0.5).abs() < 1e-12);
        assert!((dims[0].max - 4.0).abs() < 1e-12);
        assert_eq!(dims[1].scale, ShapeScale::Log);
        assert!(dims[1].min > 0.0);
    }

    #[test]
    fn polynomial_has_no_shape_window() {
        let x = [0.0, 1.0, 2.0];
        let dims = shape_window(ModelFamily::Polynomial { degree: 3 }, &x).unwrap();
        assert!(dims.is_empty());
    }

    #[test]
    fn constant_x_is_a_fit_failure() {
        let x = [2.0, 2.0, 2.0];
        let err = shape_window(ModelFamily::Sigmoid, &x).unwrap_err();
        assert!(err.is_fit_failure());
    }
}
