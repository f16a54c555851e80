use std::error::Error;
use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::figure::{CurveFigure, DeviationFigure, ErrorPoint, Figure, MapFigure};
use crate::color::{plot_color, MEASURED_HUE, THEORY_HUE};

type DrawResult = Result<(), Box<dyn Error>>;
type XyChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const CURVE_SIZE: (u32, u32) = (1000, 700);
const MAP_PANEL_SIZE: (u32, u32) = (450, 340);

/// Pixel size of the file written for a figure.
pub fn figure_size(figure: Figure<'_>) -> (u32, u32) {
    match figure {
        Figure::Maps(maps) => (
            MAP_PANEL_SIZE.0 * 2,
            MAP_PANEL_SIZE.1 * maps.rows.len().max(1) as u32,
        ),
        Figure::Curve(_) | Figure::Deviation(_) => CURVE_SIZE,
    }
}

/// `.svg` goes through the SVG backend, anything else is rasterised.
pub fn draw_to_file(figure: Figure<'_>, path: &Path) -> DrawResult {
    let size = figure_size(figure);
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if is_svg {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_figure(figure, &root)
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw_figure(figure, &root)
    }
}

pub fn draw_figure<DB: DrawingBackend>(
    figure: Figure<'_>,
    root: &DrawingArea<DB, Shift>,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    match figure {
        Figure::Maps(maps) => draw_maps(maps, root)?,
        Figure::Curve(curve) => draw_curve(curve, root)?,
        Figure::Deviation(deviation) => draw_deviation(deviation, root)?,
    }
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

fn draw_maps<DB: DrawingBackend>(maps: &MapFigure, root: &DrawingArea<DB, Shift>) -> DrawResult
where
    DB::ErrorType: 'static,
{
    if maps.rows.is_empty() {
        return Ok(());
    }
    let panels = root.split_evenly((maps.rows.len(), 2));
    for (row, areas) in maps.rows.iter().zip(panels.chunks(2)) {
        draw_pixels(
            &areas[0],
            &row.raw_title,
            row.raw.width(),
            row.raw.height(),
            |x, y| {
                let [r, g, b] = row.raw.get_pixel(x, y).0;
                RGBColor(r, g, b)
            },
        )?;
        draw_pixels(
            &areas[1],
            &row.intensity_title,
            row.intensity.width(),
            row.intensity.height(),
            |x, y| {
                let v = row.intensity.get_pixel(x, y).0[0];
                RGBColor(v, v, v)
            },
        )?;
    }
    Ok(())
}

/// One cell per pixel, row 0 at the top like an image viewer.
fn draw_pixels<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    width: u32,
    height: u32,
    pixel: impl Fn(u32, u32) -> RGBColor,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18))
        .margin(8)
        .build_cartesian_2d(0.0..width.max(1) as f64, 0.0..height.max(1) as f64)?;

    chart.draw_series(
        (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let top = (height - y) as f64;
                Rectangle::new(
                    [(x as f64, top), (x as f64 + 1.0, top - 1.0)],
                    pixel(x, y).filled(),
                )
            }),
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Error-bar charts
// ---------------------------------------------------------------------------

/// Bounds of all `(low, high)` pairs, widened by 5 %.
fn padded_range(bounds: impl IntoIterator<Item = (f64, f64)>) -> (f64, f64) {
    let (lo, hi) = bounds
        .into_iter()
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| {
            (lo.min(a), hi.max(b))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        lo.abs().max(1.0) * 0.1
    };
    (lo - pad, hi + pad)
}

fn x_bounds(points: &[ErrorPoint]) -> impl Iterator<Item = (f64, f64)> + '_ {
    points.iter().map(|p| (p.x - p.x_err, p.x + p.x_err))
}

fn y_bounds(points: &[ErrorPoint]) -> impl Iterator<Item = (f64, f64)> + '_ {
    points.iter().map(|p| (p.y - p.y_err, p.y + p.y_err))
}

fn build_chart<'a, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    title: &str,
    x_label: &str,
    y_label: &str,
    x_range: (f64, f64),
    y_range: (f64, f64),
) -> Result<XyChart<'a, DB>, Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 30))
        .margin(15)
        .x_label_area_size(55)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .label_style(("sans-serif", 18))
        .draw()?;
    Ok(chart)
}

fn draw_error_bars<DB: DrawingBackend>(
    chart: &mut XyChart<'_, DB>,
    points: &[ErrorPoint],
    color: RGBColor,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    chart.draw_series(points.iter().map(|p| {
        ErrorBar::new_vertical(p.x, p.y - p.y_err, p.y, p.y + p.y_err, color.stroke_width(1), 8)
    }))?;
    chart.draw_series(points.iter().map(|p| {
        ErrorBar::new_horizontal(p.y, p.x - p.x_err, p.x, p.x + p.x_err, color.stroke_width(1), 8)
    }))?;
    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new((p.x, p.y), 3, color.filled())),
    )?;
    Ok(())
}

fn draw_curve<DB: DrawingBackend>(
    curve: &CurveFigure,
    root: &DrawingArea<DB, Shift>,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    let theory = curve.theory.as_deref().unwrap_or(&[]);
    let x_range = padded_range(x_bounds(&curve.points));
    let y_range =
        padded_range(y_bounds(&curve.points).chain(theory.iter().map(|&(_, y)| (y, y))));
    let mut chart = build_chart(
        root,
        &curve.title,
        &curve.x_label,
        &curve.y_label,
        x_range,
        y_range,
    )?;

    let measured = plot_color(MEASURED_HUE);
    draw_error_bars(&mut chart, &curve.points, measured)?;
    chart
        .draw_series(LineSeries::new(
            curve.points.iter().map(|p| (p.x, p.y)),
            measured.stroke_width(2),
        ))?
        .label("measured")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], measured.stroke_width(2))
        });

    if !theory.is_empty() {
        let predicted = plot_color(THEORY_HUE);
        chart
            .draw_series(LineSeries::new(theory.iter().copied(), predicted.stroke_width(2)))?
            .label("cos²(θ)")
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], predicted.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn draw_deviation<DB: DrawingBackend>(
    deviation: &DeviationFigure,
    root: &DrawingArea<DB, Shift>,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    let x_range = padded_range(x_bounds(&deviation.points));
    // Keep the zero line in view.
    let y_range =
        padded_range(y_bounds(&deviation.points).chain(std::iter::once((0.0, 0.0))));
    let mut chart = build_chart(
        root,
        &deviation.title,
        &deviation.x_label,
        &deviation.y_label,
        x_range,
        y_range,
    )?;

    chart.draw_series(LineSeries::new(
        vec![(x_range.0, 0.0), (x_range.1, 0.0)],
        BLACK.mix(0.4).stroke_width(1),
    ))?;
    draw_error_bars(&mut chart, &deviation.points, plot_color(MEASURED_HUE))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::figure::MapRow;
    use image::{GrayImage, RgbImage};

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = padded_range([(2.0, 2.0)]);
        assert!(lo < 2.0 && hi > 2.0);
        let (lo, hi) = padded_range([(0.0, 10.0), (f64::NAN, 3.0)]);
        approx::assert_relative_eq!(lo, -0.5, epsilon = 1e-12);
        approx::assert_relative_eq!(hi, 10.5, epsilon = 1e-12);
    }

    #[test]
    fn bounds_include_error_bars() {
        let points = [
            ErrorPoint {
                x: 0.0,
                y: 1.0,
                x_err: 0.5,
                y_err: 0.25,
            },
            ErrorPoint {
                x: 90.0,
                y: 0.0,
                x_err: 2.0,
                y_err: 0.125,
            },
        ];
        let xs: Vec<_> = x_bounds(&points).collect();
        assert_eq!(xs, vec![(-0.5, 0.5), (88.0, 92.0)]);
        let ys: Vec<_> = y_bounds(&points).collect();
        assert_eq!(ys, vec![(0.75, 1.25), (-0.125, 0.125)]);
    }

    #[test]
    fn map_figure_grows_with_rows() {
        let row = MapRow {
            raw_title: "a.png".into(),
            intensity_title: "a.png intensity".into(),
            raw: RgbImage::new(6, 4),
            intensity: GrayImage::new(6, 4),
        };
        let maps = MapFigure {
            rows: vec![row.clone(), row.clone(), row],
        };
        assert_eq!(
            figure_size(Figure::Maps(&maps)),
            (MAP_PANEL_SIZE.0 * 2, MAP_PANEL_SIZE.1 * 3)
        );
        let empty = MapFigure { rows: Vec::new() };
        assert_eq!(figure_size(Figure::Maps(&empty)).1, MAP_PANEL_SIZE.1);
    }
}
