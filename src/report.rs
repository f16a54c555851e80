use std::io::{self, Write};

use crate::data::malus;
use crate::data::model::{Analysis, Entry, Measurement};

/// Scientific notation with `precision` mantissa decimals and a signed,
/// two-digit exponent: `2.6e+02`, `5e-03`.
pub fn sci(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{value:.precision$e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => formatted,
    }
}

/// `Average intensity: 1.3e+02±6e+01 for rotation: 4.5e+01±5e-01°`
pub fn human_line(entry: &Entry, intensity: &Measurement) -> String {
    format!(
        "Average intensity: {}±{} for rotation: {}±{}°",
        sci(intensity.value, 1),
        sci(intensity.error, 0),
        sci(entry.rotation, 1),
        sci(entry.rotation_err, 0)
    )
}

/// Same values as a LaTeX table row.
pub fn tex_line(entry: &Entry, intensity: &Measurement) -> String {
    format!(
        "TeX friendly: {}±{}° & {}±{} \\\\",
        sci(entry.rotation, 1),
        sci(entry.rotation_err, 0),
        sci(intensity.value, 1),
        sci(intensity.error, 0)
    )
}

pub fn mse_line(mse: f64) -> String {
    format!("Mean squared error vs cos²: {}", sci(mse, 3))
}

/// Two lines per entry, then the MSE when comparing.
pub fn write_report<W: Write>(out: &mut W, analysis: &Analysis, compare: bool) -> io::Result<()> {
    for (entry, intensity) in analysis.entries.iter().zip(analysis.intensities()) {
        writeln!(out, "{}", human_line(entry, &intensity))?;
        writeln!(out, "{}", tex_line(entry, &intensity))?;
    }
    if compare {
        if let Some(mse) = malus::mean_squared_error(&analysis.entries, &analysis.relative.values) {
            writeln!(out, "{}", mse_line(mse))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sci_matches_printf_style() {
        assert_eq!(sci(254.0, 1), "2.5e+02");
        assert_eq!(sci(12.0, 0), "1e+01");
        assert_eq!(sci(0.004, 0), "4e-03");
        assert_eq!(sci(0.0, 1), "0.0e+00");
        assert_eq!(sci(-3.2e-12, 1), "-3.2e-12");
        assert_eq!(sci(6.0e123, 0), "6e+123");
        assert_eq!(sci(f64::NAN, 1), "NaN");
    }

    #[test]
    fn report_lines() {
        let entry = Entry::new("a.png", 45.0, 0.5);
        let m = Measurement::new(131.0, 62.0);
        assert_eq!(
            human_line(&entry, &m),
            "Average intensity: 1.3e+02±6e+01 for rotation: 4.5e+01±5e-01°"
        );
        assert_eq!(
            tex_line(&entry, &m),
            "TeX friendly: 4.5e+01±5e-01° & 1.3e+02±6e+01 \\\\"
        );
        assert_eq!(mse_line(0.00123), "Mean squared error vs cos²: 1.230e-03");
    }
}
