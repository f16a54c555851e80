use std::path::PathBuf;

use clap::ValueEnum;

use crate::data::model::Entry;
use crate::data::normalize::Normalization;

// ---------------------------------------------------------------------------
// Settings – what a settings file provides
// ---------------------------------------------------------------------------

/// Contents of a settings file. Flags left out of the file stay `None` so the
/// command line (or the defaults) can decide them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub entries: Vec<Entry>,
    pub create_map: Option<bool>,
    pub map_values: Option<bool>,
    pub compare: Option<bool>,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// File format of the map figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MapFormat {
    #[default]
    Svg,
    Png,
}

impl MapFormat {
    pub fn extension(self) -> &'static str {
        match self {
            MapFormat::Svg => "svg",
            MapFormat::Png => "png",
        }
    }
}

/// What to do when one entry's image cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnError {
    /// Abort the whole run on the first failure.
    #[default]
    Abort,
    /// Log the failure, drop the entry and continue.
    Skip,
}

// ---------------------------------------------------------------------------
// AnalysisConfig – everything one run needs
// ---------------------------------------------------------------------------

/// Read-only configuration for a single analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub entries: Vec<Entry>,
    /// Render the raw/intensity map figure.
    pub create_map: bool,
    /// Use the min-max remap instead of dividing by the maximum.
    pub map_values: bool,
    /// Compare with the `cos²` prediction.
    pub compare: bool,
    pub figures_dir: PathBuf,
    pub map_format: MapFormat,
    pub on_error: OnError,
    /// Open the viewer after the figures are saved.
    pub show: bool,
}

impl AnalysisConfig {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            create_map: false,
            map_values: false,
            compare: false,
            figures_dir: PathBuf::from("figures"),
            map_format: MapFormat::default(),
            on_error: OnError::default(),
            show: false,
        }
    }

    /// Start from a settings file's contents; missing flags default to off.
    pub fn from_settings(settings: Settings) -> Self {
        let mut config = Self::new(settings.entries);
        config.create_map = settings.create_map.unwrap_or(false);
        config.map_values = settings.map_values.unwrap_or(false);
        config.compare = settings.compare.unwrap_or(false);
        config
    }

    pub fn normalization(&self) -> Normalization {
        Normalization::from_map_values(self.map_values)
    }
}
