//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - reloaded later for re-plotting

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A parametric curve family.
///
/// Each family is linear in its *amplitude* parameters once its *shape*
/// parameters are fixed, which is what the fitter's grid-search-plus-OLS
/// strategy relies on:
///
/// - polynomial: all parameters are amplitudes (coefficients)
/// - gaussian `a·exp(-(x-µ)²/(2σ²))`: amplitude `a`; shapes `µ`, `σ`
/// - exp decay `a·exp(-b·x) + c`: amplitudes `a`, `c`; shape `b`
/// - inverse decay `a/(1 + b·x) + c`: amplitudes `a`, `c`; shape `b`
/// - sigmoid `L/(1 + exp(-k(x-x₀)))`: amplitude `L`; shapes `k`, `x₀`
/// - sigmoid + baseline: adds amplitude `b`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ModelFamily {
    Polynomial { degree: usize },
    Gaussian,
    ExpDecay,
    InvDecay,
    Sigmoid,
    SigmoidBaseline,
}

impl ModelFamily {
    /// Human-readable label for terminal output and legends.
    pub fn display_name(self) -> String {
        match self {
            ModelFamily::Polynomial { degree } => format!("Polynomial (deg={degree})"),
            ModelFamily::Gaussian => "Gaussian".to_string(),
            ModelFamily::ExpDecay => "Exponential Decay".to_string(),
            ModelFamily::InvDecay => "Inverse Decay".to_string(),
            ModelFamily::Sigmoid => "Logistic Sigmoid".to_string(),
            ModelFamily::SigmoidBaseline => "Logistic Sigmoid (with baseline)".to_string(),
        }
    }

    /// Number of amplitude (linear) parameters.
    pub fn amp_len(self) -> usize {
        match self {
            ModelFamily::Polynomial { degree } => degree + 1,
            ModelFamily::Gaussian | ModelFamily::Sigmoid => 1,
            ModelFamily::ExpDecay | ModelFamily::InvDecay | ModelFamily::SigmoidBaseline => 2,
        }
    }

    /// Number of shape (nonlinear) parameters.
    pub fn shape_len(self) -> usize {
        match self {
            ModelFamily::Polynomial { .. } => 0,
            ModelFamily::ExpDecay | ModelFamily::InvDecay => 1,
            ModelFamily::Gaussian | ModelFamily::Sigmoid | ModelFamily::SigmoidBaseline => 2,
        }
    }

    /// Total parameter count (amplitudes + shapes).
    pub fn param_count(self) -> usize {
        self.amp_len() + self.shape_len()
    }

    /// Whether the family has nonlinear shape parameters.
    pub fn is_nonlinear(self) -> bool {
        self.shape_len() > 0
    }
}

/// Fitted parameters for a model family, in the family's canonical order.
///
/// Canonical layouts:
/// - polynomial: ascending coefficients `c0..=cd`
/// - gaussian: `[a, mu, sigma]`
/// - exp decay / inverse decay: `[a, b, c]`
/// - sigmoid: `[l, k, x0]`
/// - sigmoid + baseline: `[l, x0, k, b]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    pub family: ModelFamily,
    pub params: Vec<f64>,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Fit output for a single series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: FittedModel,
    pub quality: FitQuality,
}

/// A fitted curve evaluated on a dense x grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl CurveGrid {
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.x.iter().copied().zip(self.y.iter().copied()).collect()
    }
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub model: FittedModel,
    pub fit_quality: FitQuality,
    pub grid: CurveGrid,
}

/// Which vertical marker (if any) to derive for a plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerSpec {
    /// No marker.
    None,
    /// Mark the steepest-descent point of the fitted primary curve.
    SteepestDrop,
    /// Mark the peak of the fitted primary curve (the center for a Gaussian).
    Peak,
    /// Mark a manually specified x position.
    ///
    /// These values are hand-tuned per dataset (e.g. a known phase-transition
    /// location); they are not derived from the fit.
    Jump(f64),
}

/// A resolved vertical marker: position plus annotation text.
#[derive(Debug, Clone)]
pub struct MarkerLine {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// Configuration for a single-series analysis (one fit, one y-axis).
#[derive(Debug, Clone)]
pub struct SingleConfig {
    pub csv_path: PathBuf,
    pub x_col: String,
    pub y_col: String,
    pub family: ModelFamily,
    /// Multiply x by 100 before fitting (fraction -> percentage inputs).
    pub scale_x: bool,
    /// Number of points in the dense evaluation grid.
    pub grid_points: usize,
    pub marker: MarkerSpec,

    pub x_label: String,
    pub y_label: String,
    pub title: String,
    pub data_label: String,
    pub curve_label: String,
    /// Fixed primary y-axis limits (e.g. 0–100 for cooperation percentages).
    pub y_limits: Option<(f64, f64)>,

    pub output_dir: PathBuf,
    pub output_filename: String,
    pub export_curve: Option<PathBuf>,
}

/// Configuration for a dual-axis analysis (cooperation + clusters).
#[derive(Debug, Clone)]
pub struct DualConfig {
    pub csv_path: PathBuf,
    pub x_col: String,
    pub coop_col: String,
    pub cluster_col: String,
    pub coop_family: ModelFamily,
    pub cluster_family: ModelFamily,
    pub scale_x: bool,
    pub grid_points: usize,
    /// Marker derived from the fitted cooperation curve.
    pub marker: MarkerSpec,

    pub x_label: String,
    pub y1_label: String,
    pub y2_label: String,
    pub title: String,
    pub coop_data_label: String,
    pub coop_curve_label: String,
    pub cluster_data_label: String,
    pub cluster_curve_label: String,
    pub y1_limits: Option<(f64, f64)>,
    /// Place the combined legend at the upper right instead of the upper left.
    pub legend_upper_right: bool,

    pub output_dir: PathBuf,
    pub output_filename: String,
}
