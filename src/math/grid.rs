//! Grid spacing helpers for the fitter's deterministic shape-parameter
//! search: linear spacing for centers, log spacing for rates and widths that
//! live on a ratio scale.

use crate::error::AppError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid grid range: min={min}, max={max} (must be finite and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + step * i as f64).collect())
}

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid grid range: min={min}, max={max} (must be finite, >0, and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Grid steps must be >= 2."));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    Ok((0..steps).map(|i| (ln_min + step * i as f64).exp()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(0.0, 100.0, 300).unwrap();
        assert_eq!(v.len(), 300);
        assert!((v[0] - 0.0).abs() < 1e-12);
        assert!((v[299] - 100.0).abs() < 1e-12);
    }

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_degenerate_ranges() {
        assert!(lin_space(1.0, 1.0, 10).is_err());
        assert!(log_space(-1.0, 1.0, 10).is_err());
        assert!(lin_space(0.0, 1.0, 1).is_err());
    }
}
