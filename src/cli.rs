use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{AnalysisConfig, MapFormat, OnError, Settings};
use crate::data::loader::load_settings;

#[derive(Parser, Debug, Clone)]
#[command(name = "rusty-malus")]
#[command(
    about = "Relate polariser rotation to image intensity (Malus's law) and plot the result"
)]
#[command(version)]
pub struct Cli {
    /// Settings file (.json or .csv) listing images, rotations and their uncertainties.
    pub settings: PathBuf,

    /// Render the raw image / intensity map figure. Overrides the settings file.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub create_map: Option<bool>,

    /// Remap intensities onto [min, max] instead of dividing by the maximum.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub map_values: Option<bool>,

    /// Compare with the cos² prediction and plot the deviation.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub compare: Option<bool>,

    /// Directory figures are written to.
    #[arg(long, default_value = "figures")]
    pub figures_dir: PathBuf,

    /// File format of the map figure.
    #[arg(long, value_enum, default_value_t = MapFormat::Svg)]
    pub map_format: MapFormat,

    /// Skip entries whose image cannot be processed instead of aborting.
    #[arg(long)]
    pub skip_failed: bool,

    /// Open the result viewer after the figures are saved.
    #[arg(long)]
    pub show: bool,
}

impl Cli {
    /// Merge the settings file with the command line; flags given here win.
    pub fn apply(&self, settings: Settings) -> AnalysisConfig {
        let mut config = AnalysisConfig::from_settings(settings);
        if let Some(v) = self.create_map {
            config.create_map = v;
        }
        if let Some(v) = self.map_values {
            config.map_values = v;
        }
        if let Some(v) = self.compare {
            config.compare = v;
        }
        config.figures_dir = self.figures_dir.clone();
        config.map_format = self.map_format;
        config.on_error = if self.skip_failed {
            OnError::Skip
        } else {
            OnError::Abort
        };
        config.show = self.show;
        config
    }

    pub fn load_config(&self) -> Result<AnalysisConfig> {
        let settings = load_settings(&self.settings)
            .with_context(|| format!("loading settings from {}", self.settings.display()))?;
        Ok(self.apply(settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            entries: Vec::new(),
            create_map: Some(true),
            map_values: Some(true),
            compare: None,
        }
    }

    #[test]
    fn file_flags_apply_when_not_overridden() {
        let cli = Cli::try_parse_from(["rusty-malus", "settings.json"]).unwrap();
        let config = cli.apply(settings());
        assert!(config.create_map);
        assert!(config.map_values);
        assert!(!config.compare);
        assert_eq!(config.on_error, OnError::Abort);
        assert_eq!(config.figures_dir, PathBuf::from("figures"));
    }

    #[test]
    fn command_line_overrides_file() {
        let cli = Cli::try_parse_from([
            "rusty-malus",
            "--map-values=false",
            "--compare",
            "--skip-failed",
            "--map-format",
            "png",
            "settings.json",
        ])
        .unwrap();
        let config = cli.apply(settings());
        assert!(config.create_map);
        assert!(!config.map_values);
        assert!(config.compare);
        assert_eq!(config.on_error, OnError::Skip);
        assert_eq!(config.map_format, MapFormat::Png);
    }
}
