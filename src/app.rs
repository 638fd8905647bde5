//! Command dispatch.
//!
//! Each subcommand maps to a `SingleConfig` or `DualConfig`, runs its
//! pipeline, prints a summary, and renders the PNG. Fit non-convergence is
//! recoverable at this layer: the message is printed, the plot is skipped,
//! and the run still exits 0. Everything else propagates to `main`.

pub mod pipeline;

use clap::Parser;
use plotters::style::RGBColor;

use crate::cli::{
    Cli, Command, DecayArgs, PeakArgs, PlotArgs, RegressionArgs, SweepArgs, TransitionArgs,
};
use crate::domain::{DualConfig, MarkerSpec, ModelFamily, SingleConfig};
use crate::error::AppError;
use crate::io::{read_curve_json, write_curve_json};
use crate::plot::{render_png, AxisSeries, PlotSpec, SecondaryAxis, TAB_BLUE, TAB_RED};
use crate::report;

/// Presentation knobs that vary per single-series analysis but are not part
/// of the analysis itself.
struct SingleStyle {
    scatter_alpha: f64,
    curve_color: Option<RGBColor>,
    marker_color: Option<RGBColor>,
}

pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Regression(args) => handle_single(
            regression_config(&args),
            SingleStyle {
                scatter_alpha: 1.0,
                curve_color: Some(TAB_RED),
                marker_color: None,
            },
        ),
        Command::Transition(args) => handle_single(
            transition_config(&args),
            SingleStyle {
                scatter_alpha: 0.3,
                curve_color: None,
                marker_color: Some(TAB_BLUE),
            },
        ),
        Command::Sweep(args) => handle_dual(sweep_config(&args)),
        Command::Decay(args) => handle_dual(decay_config(&args)),
        Command::Peak(args) => handle_dual(peak_config(&args)),
        Command::Plot(args) => handle_plot(&args),
    }
}

fn handle_single(cfg: SingleConfig, style: SingleStyle) -> Result<(), AppError> {
    let run = match pipeline::run_single(&cfg) {
        Ok(run) => run,
        Err(e) if e.is_fit_failure() => {
            println!("{e} Skipping plot.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    println!(
        "{}",
        report::format_dataset_summary(&cfg.csv_path, run.n_rows, &run.x)
    );
    println!("{}", report::format_fit_summary("Fit", &run.fit));
    if let Some(marker) = &run.marker {
        println!("{}", report::format_marker(marker));
    }

    let out_path = cfg.output_dir.join(&cfg.output_filename);
    let spec = PlotSpec {
        title: cfg.title.clone(),
        x_label: cfg.x_label.clone(),
        y_label: cfg.y_label.clone(),
        primary: AxisSeries {
            points: run.x.iter().copied().zip(run.y.iter().copied()).collect(),
            curve: run.grid.points(),
            data_label: cfg.data_label.clone(),
            curve_label: cfg.curve_label.clone(),
        },
        secondary: None,
        marker: run.marker.clone(),
        y_limits: cfg.y_limits,
        scatter_alpha: style.scatter_alpha,
        curve_color: style.curve_color,
        marker_color: style.marker_color,
        legend_upper_right: false,
        out_path: out_path.clone(),
    };
    render_png(&spec)?;
    println!("Saved to: {}", out_path.display());

    if let Some(path) = &cfg.export_curve {
        write_curve_json(path, &run.fit, &run.grid, &cfg.title, &cfg.x_label, &cfg.y_label)?;
        println!("Curve exported to: {}", path.display());
    }

    Ok(())
}

fn handle_dual(cfg: DualConfig) -> Result<(), AppError> {
    let run = match pipeline::run_dual(&cfg) {
        Ok(run) => run,
        Err(e) if e.is_fit_failure() => {
            println!("{e} Skipping plot.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    println!(
        "{}",
        report::format_dataset_summary(&cfg.csv_path, run.n_rows, &run.x)
    );
    println!("{}", report::format_fit_summary("Cooperation", &run.coop));
    println!("{}", report::format_fit_summary("Clusters", &run.cluster));
    if let Some(marker) = &run.marker {
        println!("{}", report::format_marker(marker));
    }

    let out_path = cfg.output_dir.join(&cfg.output_filename);
    let spec = PlotSpec {
        title: cfg.title.clone(),
        x_label: cfg.x_label.clone(),
        y_label: cfg.y1_label.clone(),
        primary: AxisSeries {
            points: run
                .x
                .iter()
                .copied()
                .zip(run.y_coop.iter().copied())
                .collect(),
            curve: run.coop_grid.points(),
            data_label: cfg.coop_data_label.clone(),
            curve_label: cfg.coop_curve_label.clone(),
        },
        secondary: Some(SecondaryAxis {
            series: AxisSeries {
                points: run
                    .x
                    .iter()
                    .copied()
                    .zip(run.y_cluster.iter().copied())
                    .collect(),
                curve: run.cluster_grid.points(),
                data_label: cfg.cluster_data_label.clone(),
                curve_label: cfg.cluster_curve_label.clone(),
            },
            y_label: cfg.y2_label.clone(),
        }),
        marker: run.marker.clone(),
        y_limits: cfg.y1_limits,
        scatter_alpha: 0.3,
        curve_color: None,
        marker_color: None,
        legend_upper_right: cfg.legend_upper_right,
        out_path: out_path.clone(),
    };
    render_png(&spec)?;
    println!("Saved to: {}", out_path.display());

    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let curve = read_curve_json(&args.curve)?;

    let out_path = args.out_dir.join(&args.out);
    let spec = PlotSpec {
        title: curve.title.clone(),
        x_label: curve.x_label.clone(),
        y_label: curve.y_label.clone(),
        primary: AxisSeries {
            points: Vec::new(),
            curve: curve.grid.points(),
            data_label: String::new(),
            curve_label: curve.model.family.display_name(),
        },
        secondary: None,
        marker: None,
        y_limits: None,
        scatter_alpha: 1.0,
        curve_color: None,
        marker_color: None,
        legend_upper_right: false,
        out_path: out_path.clone(),
    };
    render_png(&spec)?;
    println!("Saved to: {}", out_path.display());

    Ok(())
}

fn regression_config(args: &RegressionArgs) -> SingleConfig {
    SingleConfig {
        csv_path: args.csv.clone(),
        x_col: args.x_col.clone(),
        y_col: args.y_col.clone(),
        family: ModelFamily::Polynomial {
            degree: args.degree,
        },
        scale_x: false,
        grid_points: args.points,
        marker: MarkerSpec::None,
        x_label: args.x_label.clone(),
        y_label: args.y_label.clone(),
        title: args.title.clone(),
        data_label: "Simulation Data".to_string(),
        curve_label: format!("Polynomial Regression (deg={})", args.degree),
        y_limits: None,
        output_dir: args.out_dir.clone(),
        output_filename: args.out.clone(),
        export_curve: args.export_curve.clone(),
    }
}

fn transition_config(args: &TransitionArgs) -> SingleConfig {
    SingleConfig {
        csv_path: args.csv.clone(),
        x_col: args.x_col.clone(),
        y_col: args.y_col.clone(),
        family: ModelFamily::SigmoidBaseline,
        scale_x: args.scale_x && !args.no_scale_x,
        grid_points: args.points,
        marker: MarkerSpec::Jump(args.jump_x),
        x_label: args.x_label.clone(),
        y_label: args.y_label.clone(),
        title: args.title.clone(),
        data_label: "Cooperation Data".to_string(),
        curve_label: "Sigmoid Fit".to_string(),
        y_limits: Some((0.0, 100.0)),
        output_dir: args.out_dir.clone(),
        output_filename: args.out.clone(),
        export_curve: args.export_curve.clone(),
    }
}

fn sweep_config(args: &SweepArgs) -> DualConfig {
    DualConfig {
        csv_path: args.csv.clone(),
        x_col: args.dual.x_col.clone(),
        coop_col: args.dual.coop_col.clone(),
        cluster_col: args.dual.cluster_col.clone(),
        coop_family: ModelFamily::Sigmoid,
        cluster_family: ModelFamily::Gaussian,
        scale_x: args.scale_x && !args.no_scale_x,
        grid_points: args.dual.points,
        marker: MarkerSpec::None,
        x_label: args.x_label.clone(),
        y1_label: args.dual.y1_label.clone(),
        y2_label: args.dual.y2_label.clone(),
        title: args.title.clone(),
        coop_data_label: "Cooperation Data".to_string(),
        coop_curve_label: "Coop Trend".to_string(),
        cluster_data_label: "Cluster Data".to_string(),
        cluster_curve_label: "Cluster Trend".to_string(),
        y1_limits: Some((0.0, 100.0)),
        legend_upper_right: false,
        output_dir: args.dual.out_dir.clone(),
        output_filename: args.out.clone(),
    }
}

fn decay_config(args: &DecayArgs) -> DualConfig {
    DualConfig {
        csv_path: args.csv.clone(),
        x_col: args.dual.x_col.clone(),
        coop_col: args.dual.coop_col.clone(),
        cluster_col: args.dual.cluster_col.clone(),
        coop_family: ModelFamily::InvDecay,
        cluster_family: ModelFamily::ExpDecay,
        scale_x: false,
        grid_points: args.dual.points,
        marker: MarkerSpec::SteepestDrop,
        x_label: args.x_label.clone(),
        y1_label: args.dual.y1_label.clone(),
        y2_label: args.dual.y2_label.clone(),
        title: args.title.clone(),
        coop_data_label: "Cooperation Data".to_string(),
        coop_curve_label: "Coop Trend (Decay)".to_string(),
        cluster_data_label: "Cluster Data".to_string(),
        cluster_curve_label: "Cluster Trend (Exp Decay)".to_string(),
        y1_limits: Some((0.0, 100.0)),
        legend_upper_right: true,
        output_dir: args.dual.out_dir.clone(),
        output_filename: args.out.clone(),
    }
}

fn peak_config(args: &PeakArgs) -> DualConfig {
    DualConfig {
        csv_path: args.csv.clone(),
        x_col: args.dual.x_col.clone(),
        coop_col: args.dual.coop_col.clone(),
        cluster_col: args.dual.cluster_col.clone(),
        coop_family: ModelFamily::Gaussian,
        cluster_family: ModelFamily::ExpDecay,
        scale_x: false,
        grid_points: args.dual.points,
        marker: MarkerSpec::Peak,
        x_label: args.x_label.clone(),
        y1_label: args.dual.y1_label.clone(),
        y2_label: args.dual.y2_label.clone(),
        title: args.title.clone(),
        coop_data_label: "Cooperation Data".to_string(),
        coop_curve_label: "Coop Trend (Gaussian)".to_string(),
        cluster_data_label: "Cluster Data".to_string(),
        cluster_curve_label: "Cluster Trend (Exp Decay)".to_string(),
        y1_limits: Some((0.0, 100.0)),
        legend_upper_right: false,
        output_dir: args.dual.out_dir.clone(),
        output_filename: args.out.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_defaults_match_the_temptation_study() {
        let cli = Cli::try_parse_from(["coop", "decay"]).unwrap();
        let Command::Decay(args) = cli.command else {
            panic!("expected decay");
        };
        let cfg = decay_config(&args);

        assert_eq!(cfg.csv_path.to_str().unwrap(), "data_csv/varying_temptation.csv");
        assert_eq!(cfg.coop_family, ModelFamily::InvDecay);
        assert_eq!(cfg.cluster_family, ModelFamily::ExpDecay);
        assert_eq!(cfg.marker, MarkerSpec::SteepestDrop);
        assert!(cfg.legend_upper_right);
        assert!(!cfg.scale_x);
        assert_eq!(cfg.output_filename, "temptation_results.png");
        assert_eq!(cfg.coop_data_label, "Cooperation Data");
        assert_eq!(cfg.coop_curve_label, "Coop Trend (Decay)");
        assert_eq!(cfg.cluster_data_label, "Cluster Data");
    }

    #[test]
    fn dual_primary_axis_is_clamped_to_percentages() {
        // Every dual-axis analysis pins the cooperation axis to 0..100.
        for argv in [["coop", "sweep"], ["coop", "decay"], ["coop", "peak"]] {
            let cli = Cli::try_parse_from(argv).unwrap();
            let cfg = match cli.command {
                Command::Sweep(args) => sweep_config(&args),
                Command::Decay(args) => decay_config(&args),
                Command::Peak(args) => peak_config(&args),
                _ => unreachable!(),
            };
            assert_eq!(cfg.y1_limits, Some((0.0, 100.0)), "{}", argv[1]);
        }
    }

    #[test]
    fn no_scale_x_overrides_the_transition_default() {
        let cli = Cli::try_parse_from(["coop", "transition", "--no-scale-x"]).unwrap();
        let Command::Transition(args) = cli.command else {
            panic!("expected transition");
        };
        let cfg = transition_config(&args);

        assert!(!cfg.scale_x);
        assert_eq!(cfg.marker, MarkerSpec::Jump(22.0));
        assert_eq!(cfg.y_limits, Some((0.0, 100.0)));
    }

    #[test]
    fn regression_curve_label_tracks_the_degree() {
        let cli = Cli::try_parse_from(["coop", "regression", "--degree", "3"]).unwrap();
        let Command::Regression(args) = cli.command else {
            panic!("expected regression");
        };
        let cfg = regression_config(&args);

        assert_eq!(cfg.family, ModelFamily::Polynomial { degree: 3 });
        assert_eq!(cfg.curve_label, "Polynomial Regression (deg=3)");
        assert_eq!(cfg.grid_points, 300);
    }
}
