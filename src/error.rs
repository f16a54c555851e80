use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop an analysis run.
///
/// Each variant names the offending file or entry so the binary can print a
/// single fatal line that points the user at the problem.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The image file is missing, unreadable or not a decodable raster.
    #[error("failed to load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The intensity range collapsed, so normalising would divide by zero.
    #[error("degenerate intensity range (min {min}, max {max}): cannot normalise")]
    DegenerateRange { min: f64, max: f64 },

    /// Malformed settings or entry list.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A figure could not be drawn or written.
    #[error("failed to render {}: {message}", path.display())]
    Render { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
