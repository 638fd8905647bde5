//! Model evaluation for the curve families.
//!
//! The fitter relies on three primitive operations:
//! - build a design row for a given x and fixed shape parameters (for OLS)
//! - assemble the canonical parameter vector from amplitudes + shapes
//! - predict y(x) given the canonical parameters (for residuals/plots)

use crate::domain::ModelFamily;

/// Logistic kernel used by both sigmoid variants.
fn logistic(x: f64, k: f64, x0: f64) -> f64 {
    1.0 / (1.0 + (-k * (x - x0)).exp())
}

/// Gaussian kernel with unit amplitude.
fn gauss_kernel(x: f64, mu: f64, sigma: f64) -> f64 {
    let d = x - mu;
    (-(d * d) / (2.0 * sigma * sigma)).exp()
}

/// Fill a design row (one column per amplitude parameter) for the given
/// family at `x`, with the shape parameters fixed.
///
/// # Panics
/// Panics if `out` does not have length `family.amp_len()` or `shapes` does
/// not have length `family.shape_len()`. Callers should size these correctly.
pub fn fill_design_row(family: ModelFamily, x: f64, shapes: &[f64], out: &mut [f64]) {
    match family {
        ModelFamily::Polynomial { degree } => {
            let mut pow = 1.0;
            for j in 0..=degree {
                out[j] = pow;
                pow *= x;
            }
        }
        ModelFamily::Gaussian => {
            out[0] = gauss_kernel(x, shapes[0], shapes[1]);
        }
        ModelFamily::ExpDecay => {
            out[0] = (-shapes[0] * x).exp();
            out[1] = 1.0;
        }
        ModelFamily::InvDecay => {
            out[0] = 1.0 / (1.0 + shapes[0] * x);
            out[1] = 1.0;
        }
        ModelFamily::Sigmoid => {
            out[0] = logistic(x, shapes[0], shapes[1]);
        }
        ModelFamily::SigmoidBaseline => {
            out[0] = logistic(x, shapes[0], shapes[1]);
            out[1] = 1.0;
        }
    }
}

/// Assemble the canonical parameter vector from fitted amplitudes and the
/// shape tuple that produced them.
pub fn assemble_params(family: ModelFamily, amps: &[f64], shapes: &[f64]) -> Vec<f64> {
    match family {
        ModelFamily::Polynomial { .. } => amps.to_vec(),
        // [a, mu, sigma]
        ModelFamily::Gaussian => vec![amps[0], shapes[0], shapes[1]],
        // [a, b, c]
        ModelFamily::ExpDecay | ModelFamily::InvDecay => vec![amps[0], shapes[0], amps[1]],
        // [l, k, x0]
        ModelFamily::Sigmoid => vec![amps[0], shapes[0], shapes[1]],
        // [l, x0, k, b]
        ModelFamily::SigmoidBaseline => vec![amps[0], shapes[1], shapes[0], amps[1]],
    }
}

/// Predict `y(x)` for the given family and canonical parameters.
pub fn predict(family: ModelFamily, x: f64, params: &[f64]) -> f64 {
    match family {
        ModelFamily::Polynomial { degree } => {
            // Horner evaluation of ascending coefficients.
            let mut acc = params[degree];
            for j in (0..degree).rev() {
                acc = acc * x + params[j];
            }
            acc
        }
        ModelFamily::Gaussian => params[0] * gauss_kernel(x, params[1], params[2]),
        ModelFamily::ExpDecay => params[0] * (-params[1] * x).exp() + params[2],
        ModelFamily::InvDecay => params[0] / (1.0 + params[1] * x) + params[2],
        ModelFamily::Sigmoid => params[0] * logistic(x, params[1], params[2]),
        ModelFamily::SigmoidBaseline => params[0] * logistic(x, params[2], params[1]) + params[3],
    }
}

/// Parameter names in canonical order (for terminal reports).
pub fn param_names(family: ModelFamily) -> Vec<String> {
    match family {
        ModelFamily::Polynomial { degree } => (0..=degree).map(|j| format!("c{j}")).collect(),
        ModelFamily::Gaussian => ["a", "mu", "sigma"].map(String::from).to_vec(),
        ModelFamily::ExpDecay | ModelFamily::InvDecay => ["a", "b", "c"].map(String::from).to_vec(),
        ModelFamily::Sigmoid => ["L", "k", "x0"].map(String::from).to_vec(),
        ModelFamily::SigmoidBaseline => ["L", "x0", "k", "b"].map(String::from).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_polynomial_matches_horner() {
        // y = 1 + 2x + 3x^2 at x = 2 -> 17
        let params = [1.0, 2.0, 3.0];
        let y = predict(ModelFamily::Polynomial { degree: 2 }, 2.0, &params);
        assert!((y - 17.0).abs() < 1e-12);
    }

    #[test]
    fn predict_gaussian_peaks_at_center() {
        let params = [80.0, 3.5, 1.2];
        let at_center = predict(ModelFamily::Gaussian, 3.5, &params);
        assert!((at_center - 80.0).abs() < 1e-12);
        assert!(predict(ModelFamily::Gaussian, 5.0, &params) < at_center);
    }

    #[test]
    fn sigmoid_baseline_layout_round_trips() {
        // amps [L, b], shapes [k, x0] -> canonical [l, x0, k, b]
        let params = assemble_params(ModelFamily::SigmoidBaseline, &[90.0, 5.0], &[0.4, 22.0]);
        assert_eq!(params, vec![90.0, 22.0, 0.4, 5.0]);

        // Far right of the transition the sigmoid saturates at L + b.
        let y = predict(ModelFamily::SigmoidBaseline, 1e6, &params);
        assert!((y - 95.0).abs() < 1e-9);
    }

    #[test]
    fn design_row_agrees_with_predict() {
        let families = [
            (ModelFamily::Gaussian, vec![3.0, 1.0]),
            (ModelFamily::ExpDecay, vec![0.7]),
            (ModelFamily::InvDecay, vec![0.5]),
            (ModelFamily::Sigmoid, vec![0.3, 20.0]),
            (ModelFamily::SigmoidBaseline, vec![0.3, 20.0]),
        ];
        for (family, shapes) in families {
            let amps: Vec<f64> = (0..family.amp_len()).map(|j| 2.0 + j as f64).collect();
            let params = assemble_params(family, &amps, &shapes);
            for &x in &[0.0, 1.5, 10.0, 25.0] {
                let mut row = vec![0.0; family.amp_len()];
                fill_design_row(family, x, &shapes, &mut row);
                let via_row: f64 = row.iter().zip(amps.iter()).map(|(r, a)| r * a).sum();
                let via_predict = predict(family, x, &params);
                assert!(
                    (via_row - via_predict).abs() < 1e-9,
                    "{family:?} at x={x}: {via_row} vs {via_predict}"
                );
            }
        }
    }
}
