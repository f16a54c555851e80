use crate::error::{AnalysisError, Result};

use super::model::{Measurement, RelativeIntensitySeries};

/// How absolute intensities become relative ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// `I / I_max`.
    #[default]
    MaxOnly,
    /// `(I - I_min) / (I_max - I_min)`.
    MinMax,
}

impl Normalization {
    /// `map_values` selects the min-max remap, otherwise max-only.
    pub fn from_map_values(map_values: bool) -> Self {
        if map_values {
            Normalization::MinMax
        } else {
            Normalization::MaxOnly
        }
    }

    pub fn apply(self, series: &[Measurement]) -> Result<RelativeIntensitySeries> {
        match self {
            Normalization::MaxOnly => normalize_max(series),
            Normalization::MinMax => normalize_min_max(series),
        }
    }
}

/// Index of the first maximum value.
fn argmax(series: &[Measurement]) -> Option<usize> {
    series
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, m)| match best {
            Some((_, v)) if v >= m.value => best,
            _ => Some((i, m.value)),
        })
        .map(|(i, _)| i)
}

/// Index of the first minimum value.
fn argmin(series: &[Measurement]) -> Option<usize> {
    series
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, m)| match best {
            Some((_, v)) if v <= m.value => best,
            _ => Some((i, m.value)),
        })
        .map(|(i, _)| i)
}

fn empty_series() -> AnalysisError {
    AnalysisError::Configuration("cannot normalise an empty intensity series".to_string())
}

/// Divide by the brightest sample.
///
/// The uncertainty of the maximum is folded in as if it were independent of
/// the numerator, including for the maximum itself. That entry therefore gets
/// a slightly inflated error; this is a known approximation.
pub fn normalize_max(series: &[Measurement]) -> Result<RelativeIntensitySeries> {
    let imax = argmax(series).ok_or_else(empty_series)?;
    let peak = series[imax];
    if peak.value == 0.0 {
        return Err(AnalysisError::DegenerateRange {
            min: 0.0,
            max: peak.value,
        });
    }
    log::debug!("max-only normalisation: I0 = {} (entry {imax})", peak);

    let values = series
        .iter()
        .map(|m| {
            let value = m.value / peak.value;
            let error = (1.0 / peak.value)
                * (m.error.powi(2) + (peak.error / peak.value).powi(2)).sqrt();
            Measurement::new(value, error)
        })
        .collect();

    Ok(RelativeIntensitySeries {
        values,
        argmax: imax,
        argmin: None,
    })
}

/// Remap the observed range onto `[0, 1]`.
///
/// Uncertainty combines the input, the maximum and the minimum, each weighted
/// by the partial derivative of the remap.
pub fn normalize_min_max(series: &[Measurement]) -> Result<RelativeIntensitySeries> {
    let imax = argmax(series).ok_or_else(empty_series)?;
    let imin = argmin(series).ok_or_else(empty_series)?;
    let hi = series[imax];
    let lo = series[imin];
    let range = hi.value - lo.value;
    if range == 0.0 {
        return Err(AnalysisError::DegenerateRange {
            min: lo.value,
            max: hi.value,
        });
    }
    log::debug!(
        "min-max normalisation: I_min = {} (entry {imin}), I_max = {} (entry {imax})",
        lo,
        hi
    );

    let values = series
        .iter()
        .map(|m| {
            let value = (m.value - lo.value) / range;
            let d_input = m.error / range;
            let d_max = (m.value - lo.value) * hi.error / range.powi(2);
            let d_min = (hi.value - m.value) * lo.error / range.powi(2);
            let error = (d_input.powi(2) + d_max.powi(2) + d_min.powi(2)).sqrt();
            Measurement::new(value, error)
        })
        .collect();

    Ok(RelativeIntensitySeries {
        values,
        argmax: imax,
        argmin: Some(imin),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(values: &[(f64, f64)]) -> Vec<Measurement> {
        values.iter().map(|&(v, e)| Measurement::new(v, e)).collect()
    }

    #[test]
    fn max_only_peak_is_exactly_one() {
        let s = series(&[(37.2, 4.0), (201.7, 12.5), (88.1, 6.0)]);
        let rel = normalize_max(&s).unwrap();
        assert_eq!(rel.argmax, 1);
        assert_eq!(rel.values[1].value, 1.0);
        assert_relative_eq!(rel.values[0].value, 37.2 / 201.7);
    }

    #[test]
    fn max_only_error_formula() {
        let s = series(&[(50.0, 5.0), (200.0, 10.0)]);
        let rel = normalize_max(&s).unwrap();

        let expected0 = (1.0 / 200.0) * (25.0f64 + (10.0f64 / 200.0).powi(2)).sqrt();
        assert_relative_eq!(rel.values[0].error, expected0, epsilon = 1e-15);
        // The peak still carries the independent-maximum term.
        let expected1 = (1.0 / 200.0) * (100.0f64 + (10.0f64 / 200.0).powi(2)).sqrt();
        assert_relative_eq!(rel.values[1].error, expected1, epsilon = 1e-15);
    }

    #[test]
    fn min_max_endpoints_are_exact() {
        let s = series(&[(113.3, 3.0), (14.9, 1.0), (240.6, 8.0), (77.0, 2.0)]);
        let rel = normalize_min_max(&s).unwrap();
        assert_eq!(rel.argmin, Some(1));
        assert_eq!(rel.argmax, 2);
        assert_eq!(rel.values[1].value, 0.0);
        assert_eq!(rel.values[2].value, 1.0);
    }

    #[test]
    fn min_max_error_terms() {
        let s = series(&[(10.0, 1.0), (60.0, 3.0), (110.0, 2.0)]);
        let rel = normalize_min_max(&s).unwrap();

        // Middle point: d_input = 3/100, d_max = 50*2/1e4, d_min = 50*1/1e4.
        let expected = (0.03f64.powi(2) + 0.01f64.powi(2) + 0.005f64.powi(2)).sqrt();
        assert_relative_eq!(rel.values[1].value, 0.5);
        assert_relative_eq!(rel.values[1].error, expected, epsilon = 1e-15);
        // At the minimum only the input and minimum terms are left.
        let expected_min = (0.01f64.powi(2) + 0.01f64.powi(2)).sqrt();
        assert_relative_eq!(rel.values[0].error, expected_min, epsilon = 1e-15);
    }

    #[test]
    fn equal_intensities_are_degenerate_for_min_max() {
        let s = series(&[(42.0, 1.0), (42.0, 2.0), (42.0, 0.5)]);
        for _ in 0..3 {
            match normalize_min_max(&s) {
                Err(AnalysisError::DegenerateRange { min, max }) => {
                    assert_eq!(min, 42.0);
                    assert_eq!(max, 42.0);
                }
                other => panic!("expected DegenerateRange, got {other:?}"),
            }
        }
    }

    #[test]
    fn all_black_is_degenerate_for_max_only() {
        let s = series(&[(0.0, 0.0), (0.0, 0.0)]);
        assert!(matches!(
            normalize_max(&s),
            Err(AnalysisError::DegenerateRange { .. })
        ));
    }

    #[test]
    fn empty_series_is_a_configuration_error() {
        assert!(matches!(
            Normalization::MaxOnly.apply(&[]),
            Err(AnalysisError::Configuration(_))
        ));
        assert!(matches!(
            Normalization::MinMax.apply(&[]),
            Err(AnalysisError::Configuration(_))
        ));
    }

    #[test]
    fn first_extremum_wins_on_ties() {
        let s = series(&[(5.0, 0.0), (9.0, 1.0), (9.0, 2.0), (5.0, 3.0)]);
        let rel = normalize_min_max(&s).unwrap();
        assert_eq!(rel.argmax, 1);
        assert_eq!(rel.argmin, Some(0));
    }

    #[test]
    fn selection_follows_map_values_flag() {
        assert_eq!(Normalization::from_map_values(true), Normalization::MinMax);
        assert_eq!(Normalization::from_map_values(false), Normalization::MaxOnly);
    }
}
