use image::{imageops, GrayImage, RgbImage};

use crate::data::malus;
use crate::data::model::{Analysis, Entry, ImageSample, Measurement};
use crate::data::normalize::Normalization;

/// Longest side, in cells, of an image panel after block averaging.
pub const MAP_CELLS: u32 = 96;

/// Number of samples of the theoretical curve.
pub const THEORY_SAMPLES: usize = 500;

// ---------------------------------------------------------------------------
// Map figure
// ---------------------------------------------------------------------------

/// One row of the map figure: the raw frame next to its intensity map.
#[derive(Debug, Clone)]
pub struct MapRow {
    pub raw_title: String,
    pub intensity_title: String,
    pub raw: RgbImage,
    pub intensity: GrayImage,
}

impl MapRow {
    pub fn new(entry: &Entry, sample: &ImageSample) -> Self {
        let name = entry.display_name();
        Self {
            intensity_title: format!("{name} intensity"),
            raw_title: name,
            raw: shrink_rgb(&sample.raw),
            intensity: shrink_gray(&sample.intensity),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapFigure {
    pub rows: Vec<MapRow>,
}

fn fit_within(width: u32, height: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= MAP_CELLS {
        return None;
    }
    let scale = MAP_CELLS as f64 / longest as f64;
    Some((
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    ))
}

fn shrink_rgb(img: &RgbImage) -> RgbImage {
    match fit_within(img.width(), img.height()) {
        Some((w, h)) => imageops::thumbnail(img, w, h),
        None => img.clone(),
    }
}

fn shrink_gray(img: &GrayImage) -> GrayImage {
    match fit_within(img.width(), img.height()) {
        Some((w, h)) => imageops::thumbnail(img, w, h),
        None => img.clone(),
    }
}

// ---------------------------------------------------------------------------
// Error-bar figures
// ---------------------------------------------------------------------------

/// A data point with error bars on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorPoint {
    pub x: f64,
    pub y: f64,
    pub x_err: f64,
    pub y_err: f64,
}

impl ErrorPoint {
    fn from_entry(entry: &Entry, m: &Measurement) -> Self {
        Self {
            x: entry.rotation,
            y: m.value,
            x_err: entry.rotation_err,
            y_err: m.error,
        }
    }
}

/// Relative intensity against rotation, optionally with the prediction.
#[derive(Debug, Clone)]
pub struct CurveFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ErrorPoint>,
    pub theory: Option<Vec<(f64, f64)>>,
}

/// Residuals against the prediction.
#[derive(Debug, Clone)]
pub struct DeviationFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ErrorPoint>,
}

// ---------------------------------------------------------------------------
// Figure set
// ---------------------------------------------------------------------------

/// A borrowed view of any figure, as handed to the file writer.
#[derive(Debug, Clone, Copy)]
pub enum Figure<'a> {
    Maps(&'a MapFigure),
    Curve(&'a CurveFigure),
    Deviation(&'a DeviationFigure),
}

/// All figures of one run.
#[derive(Debug, Clone)]
pub struct FigureSet {
    pub maps: Option<MapFigure>,
    pub curve: CurveFigure,
    pub deviation: Option<DeviationFigure>,
}

impl FigureSet {
    pub fn build(
        analysis: &Analysis,
        normalization: Normalization,
        create_map: bool,
        compare: bool,
    ) -> Self {
        let maps = create_map.then(|| MapFigure {
            rows: analysis
                .entries
                .iter()
                .zip(&analysis.samples)
                .map(|(e, s)| MapRow::new(e, s))
                .collect(),
        });

        let points: Vec<ErrorPoint> = analysis
            .entries
            .iter()
            .zip(&analysis.relative.values)
            .map(|(e, m)| ErrorPoint::from_entry(e, m))
            .collect();

        let theory = if compare {
            malus::rotation_range(&analysis.entries)
                .map(|(lo, hi)| malus::sample_curve(lo, hi, THEORY_SAMPLES))
        } else {
            None
        };

        let y_label = match normalization {
            Normalization::MaxOnly => "Intensity (I/I₀) [unit less]",
            Normalization::MinMax => "Intensity ((I−I_min)/(I_max−I_min)) [unit less]",
        };

        let curve = CurveFigure {
            title: "Intensity vs. rotation".to_string(),
            x_label: "Rotation [°]".to_string(),
            y_label: y_label.to_string(),
            points,
            theory,
        };

        let deviation = compare.then(|| DeviationFigure {
            title: "Deviation from cos²(θ)".to_string(),
            x_label: "Rotation [°]".to_string(),
            y_label: "Measured − predicted [unit less]".to_string(),
            points: analysis
                .entries
                .iter()
                .zip(malus::deviations(&analysis.entries, &analysis.relative.values))
                .map(|(e, d)| ErrorPoint::from_entry(e, &d))
                .collect(),
        });

        Self {
            maps,
            curve,
            deviation,
        }
    }

    /// Figures in the order they are written.
    pub fn figures(&self) -> Vec<Figure<'_>> {
        let mut out = Vec::with_capacity(3);
        if let Some(maps) = &self.maps {
            out.push(Figure::Maps(maps));
        }
        out.push(Figure::Curve(&self.curve));
        if let Some(deviation) = &self.deviation {
            out.push(Figure::Deviation(deviation));
        }
        out
    }
}
