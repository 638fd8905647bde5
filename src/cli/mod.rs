//! Command-line parsing for the cooperation-dynamics analysis tool.
//!
//! One subcommand per analysis. The original studies ran each analysis with a
//! fixed configuration; those values are the defaults here, so `coop decay`
//! with no flags reproduces the temptation study byte for byte while every
//! knob stays overridable.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "coop",
    version,
    about = "Curve fitting and plotting for cooperation-dynamics simulation results"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Polynomial regression of final vs. initial cooperation.
    Regression(RegressionArgs),
    /// Sigmoid fit of the cooperation phase transition, with a manually
    /// placed jump marker.
    Transition(TransitionArgs),
    /// Dual-axis parameter sweep: sigmoid cooperation trend + Gaussian
    /// cluster trend.
    Sweep(SweepArgs),
    /// Dual-axis temptation sweep: inverse-decay cooperation trend +
    /// exponential-decay cluster trend, steepest-drop marker.
    Decay(DecayArgs),
    /// Dual-axis velocity sweep: Gaussian cooperation trend +
    /// exponential-decay cluster trend, peak marker.
    Peak(PeakArgs),
    /// Re-render a previously exported curve JSON to PNG.
    Plot(PlotArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct RegressionArgs {
    /// Input CSV with simulation results.
    #[arg(long, default_value = "results.csv")]
    pub csv: PathBuf,

    /// Column holding the input parameter.
    #[arg(long, default_value = "initial_coop")]
    pub x_col: String,

    /// Column holding the outcome to fit.
    #[arg(long, default_value = "final_coop")]
    pub y_col: String,

    /// Polynomial degree.
    #[arg(long, default_value_t = 6)]
    pub degree: usize,

    /// Points in the dense fitted-curve grid.
    #[arg(long, default_value_t = 300)]
    pub points: usize,

    #[arg(long, default_value = "Initial Cooperation (%)")]
    pub x_label: String,

    #[arg(long, default_value = "Final Cooperation (%)")]
    pub y_label: String,

    #[arg(long, default_value = "Initial vs Final Cooperation with Regression Curve")]
    pub title: String,

    /// Output filename (created under --out-dir).
    #[arg(long, default_value = "coop_vs_init_regression.png")]
    pub out: String,

    /// Output directory (created if absent).
    #[arg(long, default_value = "images")]
    pub out_dir: PathBuf,

    /// Export the fitted curve (model + params + grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct TransitionArgs {
    /// Input CSV with simulation results.
    #[arg(long, default_value = "data_csv/varying_cooperation_15_30.csv")]
    pub csv: PathBuf,

    /// Column holding the varied parameter.
    #[arg(long, default_value = "varying_param")]
    pub x_col: String,

    /// Column holding the final cooperation percentage.
    #[arg(long, default_value = "final_coop")]
    pub y_col: String,

    /// Manually placed jump location (x position of the vertical marker).
    ///
    /// Hand-tuned per dataset; not derived from the fit.
    #[arg(long, default_value_t = 22.0)]
    pub jump_x: f64,

    /// Multiply x by 100 before fitting (fractions -> percentages; enabled
    /// by default).
    #[arg(long, default_value_t = true)]
    pub scale_x: bool,

    /// Disable x scaling.
    #[arg(long)]
    pub no_scale_x: bool,

    /// Points in the dense fitted-curve grid.
    #[arg(long, default_value_t = 500)]
    pub points: usize,

    #[arg(long, default_value = "Initial Cooperation (%)")]
    pub x_label: String,

    #[arg(long, default_value = "Final Cooperation (%)")]
    pub y_label: String,

    #[arg(long, default_value = "Final Cooperation Curve with Phase Transition")]
    pub title: String,

    /// Output filename (created under --out-dir).
    #[arg(long, default_value = "cooperation_results_manual_jump.png")]
    pub out: String,

    /// Output directory (created if absent).
    #[arg(long, default_value = "images")]
    pub out_dir: PathBuf,

    /// Export the fitted curve (model + params + grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Shared options for the dual-axis sweeps.
#[derive(Debug, Parser, Clone)]
pub struct DualAxisArgs {
    /// Column holding the varied parameter.
    #[arg(long, default_value = "varying_param")]
    pub x_col: String,

    /// Column holding the final cooperation percentage.
    #[arg(long, default_value = "final_coop")]
    pub coop_col: String,

    /// Column holding the final cluster count.
    #[arg(long, default_value = "final_clusters")]
    pub cluster_col: String,

    /// Points in the dense fitted-curve grid.
    #[arg(long, default_value_t = 300)]
    pub points: usize,

    #[arg(long, default_value = "Final Cooperation (%)")]
    pub y1_label: String,

    #[arg(long, default_value = "Final Clusters")]
    pub y2_label: String,

    /// Output directory (created if absent).
    #[arg(long, default_value = "images")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct SweepArgs {
    /// Input CSV with simulation results.
    #[arg(long, default_value = "data_csv/varying_cooperation_coop.csv")]
    pub csv: PathBuf,

    /// Multiply x by 100 before fitting (enabled by default for this sweep,
    /// whose varied parameter is a fraction).
    #[arg(long, default_value_t = true)]
    pub scale_x: bool,

    /// Disable x scaling.
    #[arg(long)]
    pub no_scale_x: bool,

    #[arg(long, default_value = "Initial Cooperation (%)")]
    pub x_label: String,

    #[arg(
        long,
        default_value = "Final Cooperation & Cluster Count vs Initial Cooperation | Coop : 6"
    )]
    pub title: String,

    /// Output filename (created under --out-dir).
    #[arg(long, default_value = "cooperation_results_coop.png")]
    pub out: String,

    #[command(flatten)]
    pub dual: DualAxisArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct DecayArgs {
    /// Input CSV with simulation results.
    #[arg(long, default_value = "data_csv/varying_temptation.csv")]
    pub csv: PathBuf,

    #[arg(long, default_value = "Temptation (T)")]
    pub x_label: String,

    #[arg(long, default_value = "Final Cooperation & Cluster Count vs Temptation")]
    pub title: String,

    /// Output filename (created under --out-dir).
    #[arg(long, default_value = "temptation_results.png")]
    pub out: String,

    #[command(flatten)]
    pub dual: DualAxisArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct PeakArgs {
    /// Input CSV with simulation results.
    #[arg(long, default_value = "data_csv/varying_velocity.csv")]
    pub csv: PathBuf,

    #[arg(long, default_value = "Velocity")]
    pub x_label: String,

    #[arg(long, default_value = "Final Cooperation & Cluster Count vs Velocity")]
    pub title: String,

    /// Output filename (created under --out-dir).
    #[arg(long, default_value = "velocity_results.png")]
    pub out: String,

    #[command(flatten)]
    pub dual: DualAxisArgs,
}

#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `--export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Output filename (created under --out-dir).
    #[arg(long, default_value = "curve.png")]
    pub out: String,

    /// Output directory (created if absent).
    #[arg(long, default_value = "images")]
    pub out_dir: PathBuf,
}
