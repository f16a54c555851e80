use std::io::Write;
use std::path::PathBuf;

use image::RgbImage;

use crate::config::{AnalysisConfig, OnError};
use crate::data::extract::extract;
use crate::data::loader::load_image;
use crate::data::malus;
use crate::data::model::{Analysis, Entry, ImageSample, IntensitySeries};
use crate::error::{AnalysisError, Result};
use crate::render::{self, FigureSet, OutputNames};
use crate::report;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: Analysis,
    pub figures: FigureSet,
    /// Files written, in the order they were saved.
    pub written: Vec<PathBuf>,
    /// Present in comparison mode.
    pub mse: Option<f64>,
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Load one image and reduce it to its sample.
pub fn process_entry(entry: &Entry) -> Result<ImageSample> {
    let raw = load_image(&entry.path)?;
    log::info!(
        "Processing image: {}, has dimensions: ({}, {})",
        entry.path.display(),
        raw.width(),
        raw.height()
    );
    sample_from(entry, raw)
}

fn sample_from(entry: &Entry, raw: RgbImage) -> Result<ImageSample> {
    extract(raw).ok_or_else(|| {
        AnalysisError::Configuration(format!("{}: image has no pixels", entry.path.display()))
    })
}

/// Load, extract and normalise every entry, without writing anything.
///
/// Entries are processed in order and the result keeps that order. With
/// [`OnError::Skip`] failing entries are dropped and listed in
/// [`Analysis::skipped`]; otherwise the first failure ends the run.
pub fn analyze(config: &AnalysisConfig) -> Result<Analysis> {
    if config.entries.is_empty() {
        return Err(AnalysisError::Configuration(
            "the entry list is empty".to_string(),
        ));
    }

    let mut entries = Vec::with_capacity(config.entries.len());
    let mut samples = Vec::with_capacity(config.entries.len());
    let mut skipped = Vec::new();

    for (i, entry) in config.entries.iter().enumerate() {
        match process_entry(entry) {
            Ok(sample) => {
                entries.push(entry.clone());
                samples.push(sample);
            }
            Err(e) => match config.on_error {
                OnError::Abort => return Err(e),
                OnError::Skip => {
                    log::warn!("Skipping entry {i}: {e}");
                    skipped.push((entry.clone(), e.to_string()));
                }
            },
        }
    }

    if samples.is_empty() {
        return Err(AnalysisError::Configuration(format!(
            "none of the {} entries could be processed",
            config.entries.len()
        )));
    }

    let intensities: IntensitySeries =
        samples.iter().map(|s| s.stats.as_measurement()).collect();
    let relative = config.normalization().apply(&intensities)?;

    Ok(Analysis {
        entries,
        samples,
        relative,
        skipped,
    })
}

/// The whole run: analyse, save figures, then print the report to `out`.
///
/// All computation happens before the first file is written, so a failing
/// analysis leaves no figures behind; a figure that fails to save takes the
/// run's earlier figures with it (see [`render::save_all`]).
pub fn run<W: Write>(
    config: &AnalysisConfig,
    stamp: &str,
    out: &mut W,
) -> Result<AnalysisOutcome> {
    let analysis = analyze(config)?;
    let figures = FigureSet::build(
        &analysis,
        config.normalization(),
        config.create_map,
        config.compare,
    );

    let names = OutputNames::new(
        &config.figures_dir,
        stamp,
        config.map_format,
        config.compare,
    );
    let written = render::save_all(&figures, &names)?;

    report::write_report(out, &analysis, config.compare).map_err(|source| AnalysisError::Io {
        path: PathBuf::from("<report>"),
        source,
    })?;

    let mse = if config.compare {
        malus::mean_squared_error(&analysis.entries, &analysis.relative.values)
    } else {
        None
    };

    Ok(AnalysisOutcome {
        analysis,
        figures,
        written,
        mse,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_entry_list_is_rejected() {
        let config = AnalysisConfig::new(Vec::new());
        assert!(matches!(
            analyze(&config),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn failure_aborts_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Entry::new(dir.path().join("missing.png"), 0.0, 0.5);
        let mut config = AnalysisConfig::new(vec![missing]);
        config.figures_dir = dir.path().join("figures");

        let mut out = Vec::new();
        let err = run(&config, "01-01@00-00-00", &mut out).unwrap_err();
        assert!(matches!(err, AnalysisError::ImageLoad { .. }));
        assert!(!config.figures_dir.exists());
        assert!(out.is_empty());
    }

    #[test]
    fn empty_image_is_rejected_by_name() {
        let entry = Entry::new("frames/blank.png", 0.0, 0.5);
        match sample_from(&entry, RgbImage::new(0, 0)) {
            Err(AnalysisError::Configuration(msg)) => {
                assert_eq!(msg, "frames/blank.png: image has no pixels");
            }
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn skipping_every_entry_is_still_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::new(vec![
            Entry::new(dir.path().join("a.png"), 0.0, 0.5),
            Entry::new(dir.path().join("b.png"), 90.0, 0.5),
        ]);
        config.on_error = OnError::Skip;
        assert!(matches!(
            analyze(&config),
            Err(AnalysisError::Configuration(_))
        ));
    }
}
