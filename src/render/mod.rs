//! Figure construction and file output.
//!
//! Figures are plain values built from an [`Analysis`](crate::data::model::Analysis):
//! nothing here touches global plotting state. [`save_all`] writes them with
//! `plotters`, after which the same values can be handed to the viewer.

pub mod draw;
pub mod figure;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::config::MapFormat;
use crate::error::{AnalysisError, Result};
pub use figure::{CurveFigure, DeviationFigure, ErrorPoint, Figure, FigureSet, MapFigure, MapRow};

/// `DD-MM@HH-MM-SS`, used in every output file name.
pub const TIMESTAMP_FORMAT: &str = "%d-%m@%H-%M-%S";

pub fn timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format(TIMESTAMP_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Output names
// ---------------------------------------------------------------------------

/// Where each figure of a run is written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNames {
    pub dir: PathBuf,
    pub stamp: String,
    pub map_format: MapFormat,
    pub compare: bool,
}

impl OutputNames {
    pub fn new(
        dir: impl Into<PathBuf>,
        stamp: impl Into<String>,
        map_format: MapFormat,
        compare: bool,
    ) -> Self {
        Self {
            dir: dir.into(),
            stamp: stamp.into(),
            map_format,
            compare,
        }
    }

    pub fn maps(&self) -> PathBuf {
        self.dir
            .join(format!("maps-{}.{}", self.stamp, self.map_format.extension()))
    }

    pub fn curve(&self) -> PathBuf {
        let suffix = if self.compare { "-c" } else { "" };
        self.dir.join(format!("plot-{}{suffix}.svg", self.stamp))
    }

    pub fn deviation(&self) -> PathBuf {
        self.dir.join(format!("deviation-{}-c.svg", self.stamp))
    }

    pub fn path_for(&self, figure: Figure<'_>) -> PathBuf {
        match figure {
            Figure::Maps(_) => self.maps(),
            Figure::Curve(_) => self.curve(),
            Figure::Deviation(_) => self.deviation(),
        }
    }
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

/// Write one figure; the backend follows the file extension.
pub fn save(figure: Figure<'_>, path: &Path) -> Result<()> {
    draw::draw_to_file(figure, path).map_err(|e| AnalysisError::Render {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Create the output directory and write every figure of the set.
///
/// All or nothing: if one figure fails, the files already written for this
/// run are removed again before the error is returned.
pub fn save_all(set: &FigureSet, names: &OutputNames) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&names.dir).map_err(|source| AnalysisError::Io {
        path: names.dir.clone(),
        source,
    })?;

    let mut written = Vec::new();
    for figure in set.figures() {
        let path = names.path_for(figure);
        if let Err(e) = save(figure, &path) {
            written.push(path);
            discard(&written);
            return Err(e);
        }
        log::info!("Saved figure {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Best-effort removal of figure files; only regular files are touched.
fn discard(paths: &[PathBuf]) {
    for path in paths.iter().filter(|p| p.is_file()) {
        match fs::remove_file(path) {
            Ok(()) => log::warn!("Removed partial output {}", path.display()),
            Err(e) => log::warn!("Could not remove {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn timestamp_format() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(timestamp(&dt), "07-03@09-05-02");
    }

    #[test]
    fn discard_leaves_directories_alone() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("maps-ts.svg");
        let occupied = dir.path().join("plot-ts.svg");
        fs::write(&file, "<svg/>").unwrap();
        fs::create_dir(&occupied).unwrap();

        discard(&[file.clone(), occupied.clone(), dir.path().join("never-written.svg")]);
        assert!(!file.exists());
        assert!(occupied.is_dir());
    }

    #[test]
    fn names_follow_mode() {
        let plain = OutputNames::new("figs", "07-03@09-05-02", MapFormat::Png, false);
        assert_eq!(plain.maps(), PathBuf::from("figs/maps-07-03@09-05-02.png"));
        assert_eq!(plain.curve(), PathBuf::from("figs/plot-07-03@09-05-02.svg"));

        let compared = OutputNames::new("figs", "07-03@09-05-02", MapFormat::Svg, true);
        assert_eq!(compared.maps(), PathBuf::from("figs/maps-07-03@09-05-02.svg"));
        assert_eq!(compared.curve(), PathBuf::from("figs/plot-07-03@09-05-02-c.svg"));
        assert_eq!(
            compared.deviation(),
            PathBuf::from("figs/deviation-07-03@09-05-02-c.svg")
        );
    }
}
