//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted curve:
//! - model family + canonical parameters
//! - fit quality
//! - plot labels
//! - a precomputed dense grid for quick re-plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveFile, CurveGrid, FitResult, FittedModel};
use crate::error::AppError;
use crate::models::predict;

/// Evaluate a fitted model on `n` evenly spaced points over `[x_min, x_max]`.
pub fn build_curve_grid(model: &FittedModel, x_min: f64, x_max: f64, n: usize) -> CurveGrid {
    let n = n.max(2);
    let mut x0 = x_min;
    let mut x1 = x_max;
    if !(x0.is_finite() && x1.is_finite()) || x1 < x0 {
        x0 = 0.0;
        x1 = 1.0;
    }
    if (x1 - x0).abs() < 1e-9 {
        x0 -= 0.5;
        x1 += 0.5;
    }

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let xi = x0 + u * (x1 - x0);
        x.push(xi);
        y.push(predict(model.family, xi, &model.params));
    }

    CurveGrid { x, y }
}

/// Write a curve JSON file.
pub fn write_curve_json(
    path: &Path,
    fit: &FitResult,
    grid: &CurveGrid,
    title: &str,
    x_label: &str,
    y_label: &str,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display()))
    })?;

    let curve = CurveFile {
        tool: "coop".to_string(),
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        model: fit.model.clone(),
        fit_quality: fit.quality.clone(),
        grid: grid.clone(),
    };

    serde_json::to_writer_pretty(file, &curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display()))
    })?;
    let curve: CurveFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}
