/// Data layer: core types, loading, extraction and normalisation.
///
/// Architecture:
/// ```text
///  settings.json / settings.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse settings → Vec<Entry>, decode each image
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ extract   │  channel max per pixel → ImageSample (mean, σ)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize │  max-only or min-max → RelativeIntensitySeries
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  malus    │  cos² prediction, residuals, MSE
///   └──────────┘
/// ```

pub mod extract;
pub mod loader;
pub mod malus;
pub mod model;
pub mod normalize;
