//! Vertical marker derivation.
//!
//! Markers highlight one x position on the primary curve:
//! - the steepest-descent point of the fitted curve (numerical gradient over
//!   the dense grid, then argmin)
//! - the peak (the center parameter for a Gaussian, the grid argmax otherwise)
//! - a manually specified jump location (hand-tuned per dataset, not derived)

use crate::domain::{CurveGrid, FittedModel, MarkerLine, MarkerSpec, ModelFamily};
use crate::models::predict;

/// Resolve a marker spec against a fitted model and its dense grid.
pub fn derive_marker(
    spec: MarkerSpec,
    model: &FittedModel,
    grid: &CurveGrid,
) -> Option<MarkerLine> {
    match spec {
        MarkerSpec::None => None,
        MarkerSpec::SteepestDrop => {
            let deriv = gradient(&grid.x, &grid.y);
            let idx = argmin(&deriv)?;
            let x = grid.x[idx];
            Some(MarkerLine {
                x,
                y: grid.y[idx],
                label: format!("Steep Drop: {x:.2}"),
            })
        }
        MarkerSpec::Peak => {
            // For a Gaussian the analytic peak is the center parameter; other
            // families fall back to the grid maximum.
            let x = match model.family {
                ModelFamily::Gaussian => model.params[1],
                _ => grid.x[argmax(&grid.y)?],
            };
            Some(MarkerLine {
                x,
                y: predict(model.family, x, &model.params),
                label: format!("Critical Point : {x:.2}"),
            })
        }
        MarkerSpec::Jump(x) => Some(MarkerLine {
            x,
            // Anchor the annotation mid-axis; the jump x is what matters.
            y: 50.0,
            label: format!("Jump @ {x:.0}%"),
        }),
    }
}

/// Central-difference gradient with one-sided stencils at the ends.
fn gradient(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = Vec::with_capacity(n);
    out.push((y[1] - y[0]) / (x[1] - x[0]));
    for i in 1..n - 1 {
        out.push((y[i + 1] - y[i - 1]) / (x[i + 1] - x[i - 1]));
    }
    out.push((y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]));
    out
}

fn argmin(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::build_curve_grid;

    #[test]
    fn steepest_drop_lands_at_sigmoid_center() {
        // A falling inverse-decay-like shape: drop is steepest at the start,
        // so use a descending sigmoid instead for a mid-range drop.
        let model = FittedModel {
            family: ModelFamily::SigmoidBaseline,
            // [l, x0, k, b] with negative steepness: falls through x0 = 2.0
            params: vec![100.0, 2.0, -3.0, 0.0],
        };
        let grid = build_curve_grid(&model, 0.0, 4.0, 300);
        let marker = derive_marker(MarkerSpec::SteepestDrop, &model, &grid).unwrap();
        assert!((marker.x - 2.0).abs() < 0.05, "marker at {}", marker.x);
        assert!(marker.label.starts_with("Steep Drop:"));
    }

    #[test]
    fn peak_marker_uses_gaussian_center() {
        let model = FittedModel {
            family: ModelFamily::Gaussian,
            params: vec![80.0, 3.5, 1.2],
        };
        let grid = build_curve_grid(&model, 0.0, 7.0, 300);
        let marker = derive_marker(MarkerSpec::Peak, &model, &grid).unwrap();
        assert!((marker.x - 3.5).abs() < 1e-12);
        assert!((marker.y - 80.0).abs() < 1e-9);
    }

    #[test]
    fn jump_marker_is_verbatim() {
        let model = FittedModel {
            family: ModelFamily::Sigmoid,
            params: vec![100.0, 0.3, 22.0],
        };
        let grid = build_curve_grid(&model, 15.0, 30.0, 100);
        let marker = derive_marker(MarkerSpec::Jump(22.0), &model, &grid).unwrap();
        assert_eq!(marker.x, 22.0);
        assert_eq!(marker.label, "Jump @ 22%");
    }
}
