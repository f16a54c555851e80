use std::fmt;
use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entry – one input record
// ---------------------------------------------------------------------------

/// One (image, rotation, rotation uncertainty) record.
///
/// Entries are order significant: their position drives plotting order and
/// the x axis of every figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Path to the image file.
    pub path: PathBuf,
    /// Polariser rotation in degrees.
    pub rotation: f64,
    /// Uncertainty of the rotation in degrees.
    pub rotation_err: f64,
}

impl Entry {
    pub fn new(path: impl Into<PathBuf>, rotation: f64, rotation_err: f64) -> Self {
        Self {
            path: path.into(),
            rotation,
            rotation_err,
        }
    }

    /// File name used for figure titles, falling back to the full path.
    pub fn display_name(&self) -> String {
        file_label(&self.path)
    }
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Measurement – a value with its uncertainty
// ---------------------------------------------------------------------------

/// A scalar with its (one sigma) uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    pub value: f64,
    pub error: f64,
}

impl Measurement {
    pub fn new(value: f64, error: f64) -> Self {
        Self { value, error }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}±{}", self.value, self.error)
    }
}

// ---------------------------------------------------------------------------
// ImageSample – everything derived from one entry's image
// ---------------------------------------------------------------------------

/// Mean intensity and its spread for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStats {
    pub mean: f64,
    /// Population standard deviation (divisor = pixel count).
    pub std_dev: f64,
}

impl ImageStats {
    pub fn as_measurement(&self) -> Measurement {
        Measurement::new(self.mean, self.std_dev)
    }
}

/// Raw pixels, per-pixel intensity and statistics for one entry.
#[derive(Debug, Clone)]
pub struct ImageSample {
    pub raw: RgbImage,
    /// Channel maximum per pixel, same dimensions as `raw`.
    pub intensity: GrayImage,
    pub stats: ImageStats,
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Mean intensities aligned with the entries they came from.
pub type IntensitySeries = Vec<Measurement>;

/// Dimensionless intensities produced by a normaliser.
///
/// Values are nominally in `[0, 1]` but are not clamped: an extremum that was
/// never observed lets them leave that range.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeIntensitySeries {
    pub values: Vec<Measurement>,
    /// Index of the entry that defined the maximum.
    pub argmax: usize,
    /// Index of the entry that defined the minimum (min-max policy only).
    pub argmin: Option<usize>,
}

impl RelativeIntensitySeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Analysis – the complete computed data set
// ---------------------------------------------------------------------------

/// Entries that survived loading, with their samples and normalised series.
///
/// `entries`, `samples` and `relative.values` always have the same length and
/// the same order.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub entries: Vec<Entry>,
    pub samples: Vec<ImageSample>,
    pub relative: RelativeIntensitySeries,
    /// Entries that were skipped, with the reason, when skipping is enabled.
    pub skipped: Vec<(Entry, String)>,
}

impl Analysis {
    /// The raw (un-normalised) intensity series.
    pub fn intensities(&self) -> IntensitySeries {
        self.samples
            .iter()
            .map(|s| s.stats.as_measurement())
            .collect()
    }

    /// Number of analysed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry was analysed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
