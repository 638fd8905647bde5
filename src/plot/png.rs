//! Static chart rendering to PNG.
//!
//! One figure per invocation: scatter of raw samples plus the fitted curve on
//! a dense grid, optionally a secondary y-axis with its own scatter/curve
//! pair, optionally a single vertical marker with annotation text.
//!
//! Conventions:
//! - 3600×2100 px output (12×7 in at 300 DPI)
//! - primary series in tab:blue, secondary in tab:red, markers gray unless
//!   overridden
//! - the output directory is created if absent; existing files are
//!   overwritten without warning

use std::path::PathBuf;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::FontStyle;

use crate::domain::MarkerLine;
use crate::error::AppError;

/// 12×7 in at 300 DPI.
const IMG_SIZE: (u32, u32) = (3600, 2100);

const FONT: &str = "sans-serif";
const TITLE_PX: i32 = 58;
const AXIS_DESC_PX: i32 = 50;
const TICK_PX: i32 = 44;
const LEGEND_PX: i32 = 46;
const ANNOT_PX: i32 = 42;

/// matplotlib's `tab:blue`.
pub const TAB_BLUE: RGBColor = RGBColor(31, 119, 180);
/// matplotlib's `tab:red`.
pub const TAB_RED: RGBColor = RGBColor(214, 39, 40);
/// Marker/annotation gray.
pub const GRAY: RGBColor = RGBColor(127, 127, 127);

/// One scatter + fitted-curve pair bound to a y-axis.
#[derive(Debug, Clone)]
pub struct AxisSeries {
    pub points: Vec<(f64, f64)>,
    pub curve: Vec<(f64, f64)>,
    pub data_label: String,
    pub curve_label: String,
}

/// A secondary (right) y-axis with its own series pair.
#[derive(Debug, Clone)]
pub struct SecondaryAxis {
    pub series: AxisSeries,
    pub y_label: String,
}

/// Everything needed to draw one figure.
#[derive(Debug, Clone)]
pub struct PlotSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub primary: AxisSeries,
    pub secondary: Option<SecondaryAxis>,
    pub marker: Option<MarkerLine>,
    /// Fixed primary y-axis limits; data-driven with padding when absent.
    pub y_limits: Option<(f64, f64)>,
    /// Scatter opacity (the sweep analyses use 0.3 to show overplotting).
    pub scatter_alpha: f64,
    /// Curve color override for the primary axis (regression draws it red).
    pub curve_color: Option<RGBColor>,
    /// Marker line/annotation color (defaults to gray).
    pub marker_color: Option<RGBColor>,
    pub legend_upper_right: bool,
    pub out_path: PathBuf,
}

fn draw_err(e: impl std::fmt::Display) -> AppError {
    AppError::new(2, format!("Failed to render chart: {e}"))
}

/// Render the figure described by `spec` to its output path.
pub fn render_png(spec: &PlotSpec) -> Result<(), AppError> {
    if let Some(parent) = spec.out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::new(
                    2,
                    format!("Failed to create output directory '{}': {e}", parent.display()),
                )
            })?;
        }
    }

    let root = BitMapBackend::new(&spec.out_path, IMG_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let (x0, x1) = x_bounds(spec);
    let (y0, y1) = match spec.y_limits {
        Some(limits) => limits,
        None => padded_y_bounds(&spec.primary),
    };

    match &spec.secondary {
        None => render_single(&root, spec, x0, x1, y0, y1)?,
        Some(sec) => render_dual(&root, spec, sec, x0, x1, y0, y1)?,
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

fn render_single(
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    spec: &PlotSpec,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
) -> Result<(), AppError> {
    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, (FONT, TITLE_PX).into_font().style(FontStyle::Bold))
        .margin(40)
        .set_label_area_size(LabelAreaPosition::Left, 170)
        .set_label_area_size(LabelAreaPosition::Bottom, 140)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .axis_desc_style((FONT, AXIS_DESC_PX))
        .label_style((FONT, TICK_PX))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(TRANSPARENT)
        .draw()
        .map_err(draw_err)?;

    let color = TAB_BLUE;
    let curve_color = spec.curve_color.unwrap_or(color);

    draw_scatter(&mut chart, &spec.primary, color, spec.scatter_alpha)?;
    draw_curve(&mut chart, &spec.primary, curve_color)?;
    draw_marker(&mut chart, spec, x0, x1, y0, y1)?;

    draw_legend(&mut chart, spec.legend_upper_right)
}

fn render_dual(
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    spec: &PlotSpec,
    sec: &SecondaryAxis,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
) -> Result<(), AppError> {
    let (y2_0, y2_1) = padded_y_bounds(&sec.series);

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, (FONT, TITLE_PX).into_font().style(FontStyle::Bold))
        .margin(40)
        .set_label_area_size(LabelAreaPosition::Left, 170)
        .set_label_area_size(LabelAreaPosition::Bottom, 140)
        .set_label_area_size(LabelAreaPosition::Right, 170)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(draw_err)?
        .set_secondary_coord(x0..x1, y2_0..y2_1);

    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .axis_desc_style((FONT, AXIS_DESC_PX))
        .label_style((FONT, TICK_PX))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(TRANSPARENT)
        .draw()
        .map_err(draw_err)?;

    chart
        .configure_secondary_axes()
        .y_desc(&sec.y_label)
        .axis_desc_style((FONT, AXIS_DESC_PX))
        .label_style((FONT, TICK_PX))
        .draw()
        .map_err(draw_err)?;

    // Primary (cooperation) series in blue. The dual-coord context derefs to
    // the primary chart context, but the generic helpers need the target type
    // spelled out, hence `&mut *chart`.
    draw_scatter(&mut *chart, &spec.primary, TAB_BLUE, spec.scatter_alpha)?;
    draw_curve(&mut *chart, &spec.primary, TAB_BLUE)?;

    // Secondary (clusters) series in red, dashed trend.
    let s_style = ShapeStyle::from(TAB_RED.mix(spec.scatter_alpha)).filled();
    chart
        .draw_secondary_series(
            sec.series
                .points
                .iter()
                .map(|&(x, y)| TriangleMarker::new((x, y), 12, s_style)),
        )
        .map_err(draw_err)?
        .label(&sec.series.data_label)
        .legend(|(x, y)| TriangleMarker::new((x + 20, y), 10, ShapeStyle::from(TAB_RED).filled()));

    let s_line = ShapeStyle::from(TAB_RED).stroke_width(5);
    chart
        .draw_secondary_series(DashedLineSeries::new(
            sec.series.curve.iter().copied(),
            18,
            12,
            s_line,
        ))
        .map_err(draw_err)?
        .label(&sec.series.curve_label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], s_line));

    draw_marker(&mut *chart, spec, x0, x1, y0, y1)?;

    draw_legend(&mut *chart, spec.legend_upper_right)
}

fn draw_scatter<DB, CT>(
    chart: &mut ChartContext<DB, CT>,
    series: &AxisSeries,
    color: RGBColor,
    alpha: f64,
) -> Result<(), AppError>
where
    DB: DrawingBackend,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let style = ShapeStyle::from(color.mix(alpha)).filled();
    let anno = chart
        .draw_series(
            series
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 12, style)),
        )
        .map_err(draw_err)?;
    // Replotting a saved curve has no raw samples; an unlabeled empty series
    // must not leave a blank legend row.
    if !series.data_label.is_empty() {
        anno.label(&series.data_label)
            .legend(move |(x, y)| Circle::new((x + 20, y), 10, ShapeStyle::from(color).filled()));
    }
    Ok(())
}

// The secondary curve is dashed, but it goes through `draw_secondary_series`
// in `render_dual`; this helper only ever draws solid primary curves.
fn draw_curve<DB, CT>(
    chart: &mut ChartContext<DB, CT>,
    series: &AxisSeries,
    color: RGBColor,
) -> Result<(), AppError>
where
    DB: DrawingBackend,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let style = ShapeStyle::from(color).stroke_width(5);
    let anno = chart
        .draw_series(LineSeries::new(series.curve.iter().copied(), style))
        .map_err(draw_err)?;
    if !series.curve_label.is_empty() {
        anno.label(&series.curve_label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], style));
    }
    Ok(())
}

fn draw_marker<DB, CT>(
    chart: &mut ChartContext<DB, CT>,
    spec: &PlotSpec,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
) -> Result<(), AppError>
where
    DB: DrawingBackend,
    CT: CoordTranslate<From = (f64, f64)>,
{
    let Some(marker) = &spec.marker else {
        return Ok(());
    };

    let color = spec.marker_color.unwrap_or(GRAY);
    let style = ShapeStyle::from(color).stroke_width(4);

    chart
        .draw_series(DashedLineSeries::new(
            [(marker.x, y0), (marker.x, y1)],
            18,
            12,
            style,
        ))
        .map_err(draw_err)?;

    // Annotation text slightly up and to the right of the marked point.
    let tx = marker.x + 0.02 * (x1 - x0);
    let ty = (marker.y + 0.05 * (y1 - y0)).min(y1 - 0.02 * (y1 - y0));
    chart
        .draw_series(std::iter::once(Text::new(
            marker.label.clone(),
            (tx, ty),
            (FONT, ANNOT_PX).into_font().color(&color),
        )))
        .map_err(draw_err)?;

    Ok(())
}

// Unlike the other helpers, configuring series labels requires the backend to
// outlive the chart context, so the lifetime has to be spelled out.
fn draw_legend<'a, DB, CT>(
    chart: &mut ChartContext<'a, DB, CT>,
    upper_right: bool,
) -> Result<(), AppError>
where
    DB: DrawingBackend + 'a,
    CT: CoordTranslate<From = (f64, f64)>,
{
    chart
        .configure_series_labels()
        .position(if upper_right {
            SeriesLabelPosition::UpperRight
        } else {
            SeriesLabelPosition::UpperLeft
        })
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((FONT, LEGEND_PX))
        .draw()
        .map_err(draw_err)?;
    Ok(())
}

fn x_bounds(spec: &PlotSpec) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let mut scan = |pts: &[(f64, f64)]| {
        for &(x, _) in pts {
            if x.is_finite() {
                lo = lo.min(x);
                hi = hi.max(x);
            }
        }
    };
    scan(&spec.primary.points);
    scan(&spec.primary.curve);
    if let Some(sec) = &spec.secondary {
        scan(&sec.series.points);
        scan(&sec.series.curve);
    }
    widen_if_degenerate(lo, hi)
}

fn padded_y_bounds(series: &AxisSeries) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &(_, y) in series.points.iter().chain(series.curve.iter()) {
        if y.is_finite() {
            lo = lo.min(y);
            hi = hi.max(y);
        }
    }
    let (lo, hi) = widen_if_degenerate(lo, hi);
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn widen_if_degenerate(lo: f64, hi: f64) -> (f64, f64) {
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < 1e-9 {
        return (lo - 0.5, hi + 0.5);
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_single_axis_figure() {
        let xs: Vec<f64> = (0..=10).map(|i| i as f64 * 10.0).collect();
        let points: Vec<(f64, f64)> = xs.iter().map(|&x| (x, x * 0.9)).collect();
        let curve: Vec<(f64, f64)> = (0..300)
            .map(|i| {
                let x = i as f64 / 299.0 * 100.0;
                (x, x * 0.9)
            })
            .collect();

        let out = std::env::temp_dir()
            .join("coop-curves-plot-test")
            .join("single.png");
        let spec = PlotSpec {
            title: "Test".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            primary: AxisSeries {
                points,
                curve,
                data_label: "Data".to_string(),
                curve_label: "Fit".to_string(),
            },
            secondary: None,
            marker: Some(MarkerLine {
                x: 50.0,
                y: 45.0,
                label: "Jump @ 50%".to_string(),
            }),
            y_limits: Some((0.0, 100.0)),
            scatter_alpha: 0.3,
            curve_color: None,
            marker_color: None,
            legend_upper_right: false,
            out_path: out.clone(),
        };

        render_png(&spec).unwrap();
        let meta = std::fs::metadata(&out).unwrap();
        assert!(meta.len() > 0);
    }

    #[test]
    fn renders_a_dual_axis_figure_with_legend() {
        let xs: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let coop: Vec<(f64, f64)> = xs.iter().map(|&x| (x, 100.0 / x)).collect();
        let clusters: Vec<(f64, f64)> = xs.iter().map(|&x| (x, 40.0 - 3.0 * x)).collect();

        let out = std::env::temp_dir()
            .join("coop-curves-plot-test")
            .join("dual.png");
        let spec = PlotSpec {
            title: "Test".to_string(),
            x_label: "x".to_string(),
            y_label: "y1".to_string(),
            primary: AxisSeries {
                points: coop.clone(),
                curve: coop,
                data_label: "Cooperation Data".to_string(),
                curve_label: "Coop Trend".to_string(),
            },
            secondary: Some(SecondaryAxis {
                series: AxisSeries {
                    points: clusters.clone(),
                    curve: clusters,
                    data_label: "Cluster Data".to_string(),
                    curve_label: "Cluster Trend".to_string(),
                },
                y_label: "y2".to_string(),
            }),
            marker: None,
            y_limits: Some((0.0, 100.0)),
            scatter_alpha: 0.3,
            curve_color: None,
            marker_color: None,
            legend_upper_right: true,
            out_path: out.clone(),
        };

        render_png(&spec).unwrap();
        let meta = std::fs::metadata(&out).unwrap();
        assert!(meta.len() > 0);
    }
}
