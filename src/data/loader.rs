use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::RgbImage;
use serde_json::Value as JsonValue;

use super::model::Entry;
use crate::config::Settings;
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Decode an image file into 8-bit RGB pixels.
///
/// Grayscale inputs are expanded to three equal channels and any alpha
/// channel is discarded.
pub fn load_image(path: &Path) -> crate::error::Result<RgbImage> {
    let decoded = image::open(path).map_err(|source| AnalysisError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.to_rgb8())
}

// ---------------------------------------------------------------------------
// Public entry-point for settings
// ---------------------------------------------------------------------------

/// Load run settings from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `[[path, rotation, err], ...]`,
///   `[{ "path": .., "rotation": .., "rotation_err": .. }, ...]`
///   or an object `{ "entries": [...], "create_map": .., "map_values": .., "compare": .. }`
/// * `.csv`  – columns `path`, `rotation` and `rotation_err`
///
/// Relative image paths are resolved against the directory of the settings
/// file. Malformed entries surface as [`AnalysisError::Configuration`].
pub fn load_settings(path: &Path) -> Result<Settings> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut settings = match ext.as_str() {
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!(AnalysisError::Configuration(format!(
            "unsupported settings extension: .{other}"
        ))),
    };

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for entry in &mut settings.entries {
        entry.path = resolve(base, &entry.path);
    }
    Ok(settings)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn config_error(message: String) -> anyhow::Error {
    AnalysisError::Configuration(message).into()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Settings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| config_error(format!("parsing {}: {e}", path.display())))?;
    settings_from_json(&root)
}

pub(crate) fn settings_from_json(root: &JsonValue) -> Result<Settings> {
    match root {
        JsonValue::Array(records) => Ok(Settings {
            entries: entries_from_json(records)?,
            ..Settings::default()
        }),
        JsonValue::Object(obj) => {
            let records = obj
                .get("entries")
                .and_then(|v| v.as_array())
                .ok_or_else(|| config_error("missing or invalid 'entries' array".to_string()))?;
            Ok(Settings {
                entries: entries_from_json(records)?,
                create_map: json_flag(obj.get("create_map"), "create_map")?,
                map_values: json_flag(obj.get("map_values"), "map_values")?,
                compare: json_flag(obj.get("compare"), "compare")?,
            })
        }
        _ => Err(config_error(
            "expected a JSON array of entries or a settings object".to_string(),
        )),
    }
}

fn json_flag(val: Option<&JsonValue>, name: &str) -> Result<Option<bool>> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(config_error(format!(
            "'{name}' must be a boolean, got {other}"
        ))),
    }
}

fn entries_from_json(records: &[JsonValue]) -> Result<Vec<Entry>> {
    records
        .iter()
        .enumerate()
        .map(|(i, rec)| entry_from_json(rec, i))
        .collect()
}

fn entry_from_json(rec: &JsonValue, i: usize) -> Result<Entry> {
    match rec {
        JsonValue::Array(items) => {
            if items.len() != 3 {
                return Err(config_error(format!(
                    "entry {i}: expected [path, rotation, rotation_err], got {} values",
                    items.len()
                )));
            }
            Ok(Entry::new(
                json_path(&items[0], i)?,
                json_number(&items[1], i, "rotation")?,
                json_number(&items[2], i, "rotation_err")?,
            ))
        }
        JsonValue::Object(obj) => {
            let field = |key: &str| {
                obj.get(key)
                    .ok_or_else(|| config_error(format!("entry {i}: missing '{key}'")))
            };
            Ok(Entry::new(
                json_path(field("path")?, i)?,
                json_number(field("rotation")?, i, "rotation")?,
                json_number(field("rotation_err")?, i, "rotation_err")?,
            ))
        }
        other => Err(config_error(format!(
            "entry {i}: expected an array or object, got {other}"
        ))),
    }
}

fn json_path(val: &JsonValue, i: usize) -> Result<PathBuf> {
    val.as_str()
        .map(PathBuf::from)
        .ok_or_else(|| config_error(format!("entry {i}: path must be a string, got {val}")))
}

/// Numbers may also be given as numeric strings.
fn json_number(val: &JsonValue, i: usize, name: &str) -> Result<f64> {
    let parsed = match val {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| config_error(format!("entry {i}: '{name}' is not a number: {val}")))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row `path,rotation,rotation_err`, one entry per row.
/// Flags cannot be set from CSV; use the command line instead.
fn load_csv(path: &Path) -> Result<Settings> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening settings file {}", path.display()))?;

    let mut entries = Vec::new();
    for (row_no, result) in reader.deserialize::<Entry>().enumerate() {
        let entry = result.map_err(|e| config_error(format!("entry {row_no}: {e}")))?;
        entries.push(entry);
    }

    Ok(Settings {
        entries,
        ..Settings::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn is_config_error(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::Configuration(_))
        )
    }

    #[test]
    fn bare_array_of_tuples() {
        let settings = settings_from_json(&json!([
            ["a.png", 0, 0.5],
            ["b.png", "90", "0.5"]
        ]))
        .unwrap();
        assert_eq!(
            settings.entries,
            vec![Entry::new("a.png", 0.0, 0.5), Entry::new("b.png", 90.0, 0.5)]
        );
        assert_eq!(settings.compare, None);
    }

    #[test]
    fn settings_object_with_flags() {
        let settings = settings_from_json(&json!({
            "entries": [{ "path": "x.png", "rotation": 45.0, "rotation_err": 1.0 }],
            "create_map": true,
            "compare": false
        }))
        .unwrap();
        assert_eq!(settings.entries, vec![Entry::new("x.png", 45.0, 1.0)]);
        assert_eq!(settings.create_map, Some(true));
        assert_eq!(settings.map_values, None);
        assert_eq!(settings.compare, Some(false));
    }

    #[test]
    fn wrong_arity_names_the_entry() {
        let err = settings_from_json(&json!([["a.png", 0, 0.5], ["b.png", 90]])).unwrap_err();
        assert!(is_config_error(&err));
        assert!(err.to_string().contains("entry 1"));
    }

    #[test]
    fn non_numeric_rotation_is_rejected() {
        let err = settings_from_json(&json!([["a.png", "north", 0.5]])).unwrap_err();
        assert!(is_config_error(&err));
    }

    #[test]
    fn non_boolean_flag_is_rejected() {
        let err = settings_from_json(&json!({ "entries": [], "compare": "yes" })).unwrap_err();
        assert!(is_config_error(&err));
    }

    #[test]
    fn csv_paths_resolve_against_settings_dir() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("settings.csv");
        let mut f = std::fs::File::create(&csv_path).unwrap();
        writeln!(f, "path,rotation,rotation_err").unwrap();
        writeln!(f, "frames/a.png,0,0.5").unwrap();
        writeln!(f, "/abs/b.png,30,0.5").unwrap();
        drop(f);

        let settings = load_settings(&csv_path).unwrap();
        assert_eq!(settings.entries[0].path, dir.path().join("frames/a.png"));
        assert_eq!(settings.entries[1].path, PathBuf::from("/abs/b.png"));
        assert_eq!(settings.entries[1].rotation, 30.0);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_settings(Path::new("settings.yaml")).unwrap_err();
        assert!(is_config_error(&err));
    }

    #[test]
    fn missing_image_is_an_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        match load_image(&missing) {
            Err(AnalysisError::ImageLoad { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected ImageLoad, got {other:?}"),
        }
    }

    #[test]
    fn garbage_file_is_an_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.png");
        std::fs::write(&bogus, b"definitely not a png").unwrap();
        assert!(matches!(
            load_image(&bogus),
            Err(AnalysisError::ImageLoad { .. })
        ));
    }
}
