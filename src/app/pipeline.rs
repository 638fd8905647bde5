//! Analysis pipelines.
//!
//! A pipeline run is everything between "here is a config" and "here is what
//! to draw": load the CSV, extract and prepare the series, fit, evaluate the
//! dense curve grid, resolve the marker. Rendering and terminal output stay
//! in the dispatch layer so these functions are testable without producing
//! PNGs.

use crate::domain::{CurveGrid, DualConfig, FitResult, MarkerLine, SingleConfig};
use crate::error::AppError;
use crate::fit::{fit_model, FitOptions};
use crate::io::{build_curve_grid, load_table, SampleTable};
use crate::plot::derive_marker;

/// Everything produced by a single-series analysis.
#[derive(Debug, Clone)]
pub struct SingleRun {
    pub n_rows: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub fit: FitResult,
    pub grid: CurveGrid,
    pub marker: Option<MarkerLine>,
}

/// Everything produced by a dual-axis analysis.
#[derive(Debug, Clone)]
pub struct DualRun {
    pub n_rows: usize,
    pub x: Vec<f64>,
    pub y_coop: Vec<f64>,
    pub y_cluster: Vec<f64>,
    pub coop: FitResult,
    pub cluster: FitResult,
    pub coop_grid: CurveGrid,
    pub cluster_grid: CurveGrid,
    pub marker: Option<MarkerLine>,
}

/// Run a single-series analysis: one fit, one y-axis.
pub fn run_single(cfg: &SingleConfig) -> Result<SingleRun, AppError> {
    let table = load_table(&cfg.csv_path, &[cfg.x_col.as_str(), cfg.y_col.as_str()])?;
    let (x, y) = extract_series(&table, &cfg.x_col, &cfg.y_col, cfg.scale_x)?;

    let fit = fit_model(cfg.family, &x, &y, &FitOptions::default())?;
    let grid = dense_grid(&fit, &x, cfg.grid_points);
    let marker = derive_marker(cfg.marker, &fit.model, &grid);

    Ok(SingleRun {
        n_rows: table.n_rows(),
        x,
        y,
        fit,
        grid,
        marker,
    })
}

/// Run a dual-axis analysis: cooperation on the left axis, clusters on the
/// right, independent fits over the same x column.
pub fn run_dual(cfg: &DualConfig) -> Result<DualRun, AppError> {
    let table = load_table(
        &cfg.csv_path,
        &[
            cfg.x_col.as_str(),
            cfg.coop_col.as_str(),
            cfg.cluster_col.as_str(),
        ],
    )?;

    let (x, y_coop) = extract_series(&table, &cfg.x_col, &cfg.coop_col, cfg.scale_x)?;
    let (_, y_cluster) = extract_series(&table, &cfg.x_col, &cfg.cluster_col, cfg.scale_x)?;

    let coop = fit_model(cfg.coop_family, &x, &y_coop, &FitOptions::default())
        .map_err(|e| e.prefixed("Cooperation fit failed"))?;
    let cluster = fit_model(cfg.cluster_family, &x, &y_cluster, &FitOptions::default())
        .map_err(|e| e.prefixed("Cluster fit failed"))?;

    let coop_grid = dense_grid(&coop, &x, cfg.grid_points);
    let cluster_grid = dense_grid(&cluster, &x, cfg.grid_points);
    // Markers are always anchored to the cooperation curve.
    let marker = derive_marker(cfg.marker, &coop.model, &coop_grid);

    Ok(DualRun {
        n_rows: table.n_rows(),
        x,
        y_coop,
        y_cluster,
        coop,
        cluster,
        coop_grid,
        cluster_grid,
        marker,
    })
}

/// Pull one `(x, y)` series out of the table, apply x scaling, and sort by x.
///
/// Sorting happens here, at extraction, so every downstream consumer (fitting,
/// gradient-based markers, line drawing) sees monotone x.
fn extract_series(
    table: &SampleTable,
    x_col: &str,
    y_col: &str,
    scale_x: bool,
) -> Result<(Vec<f64>, Vec<f64>), AppError> {
    let mut x = table.column(x_col)?.to_vec();
    let y = table.column(y_col)?.to_vec();

    if scale_x {
        for v in &mut x {
            *v *= 100.0;
        }
    }

    let mut pairs: Vec<(f64, f64)> = x.into_iter().zip(y).collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    Ok(pairs.into_iter().unzip())
}

/// Dense evaluation grid spanning the observed x range.
fn dense_grid(fit: &FitResult, x: &[f64], points: usize) -> CurveGrid {
    // x is sorted and non-empty by the time a fit has succeeded.
    let (x_min, x_max) = (x[0], x[x.len() - 1]);
    build_curve_grid(&fit.model, x_min, x_max, points)
}
