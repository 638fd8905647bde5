//! Plain-text run reporting.
//!
//! All user-visible progress is printed to stdout as plain text: a dataset
//! summary, one block per fitted curve, and the resolved marker if any.

use std::path::Path;

use crate::domain::{FitResult, MarkerLine};
use crate::models::param_names;

/// Summarize the loaded dataset.
pub fn format_dataset_summary(path: &Path, n_rows: usize, x: &[f64]) -> String {
    let (lo, hi) = bounds(x);
    format!(
        "Loaded {} rows from '{}' (x range {:.4} .. {:.4})",
        n_rows,
        path.display(),
        lo,
        hi
    )
}

/// Summarize one fitted curve: family, named parameters, quality.
pub fn format_fit_summary(label: &str, fit: &FitResult) -> String {
    let names = param_names(fit.model.family);
    let params: Vec<String> = names
        .iter()
        .zip(fit.model.params.iter())
        .map(|(name, value)| format!("{name}={value:.6}"))
        .collect();

    format!(
        "{label}: {} [{}]  rmse={:.4} sse={:.4} n={}",
        fit.model.family.display_name(),
        params.join(", "),
        fit.quality.rmse,
        fit.quality.sse,
        fit.quality.n
    )
}

pub fn format_marker(marker: &MarkerLine) -> String {
    format!("Marker: {} at x={:.4}", marker.label, marker.x)
}

fn bounds(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if lo.is_finite() { (lo, hi) } else { (0.0, 0.0) }
}
