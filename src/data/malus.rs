use super::model::{Entry, Measurement};

/// Malus's law for an ideal polariser: `cos²(θ)`, with `θ` in degrees.
pub fn predicted(rotation_deg: f64) -> f64 {
    rotation_deg.to_radians().cos().powi(2)
}

/// `n` evenly spaced points of the prediction over `[from, to]` degrees.
pub fn sample_curve(from: f64, to: f64, n: usize) -> Vec<(f64, f64)> {
    match n {
        0 => Vec::new(),
        1 => vec![(from, predicted(from))],
        _ => (0..n)
            .map(|i| {
                let x = from + (to - from) * i as f64 / (n - 1) as f64;
                (x, predicted(x))
            })
            .collect(),
    }
}

/// Measured minus predicted, carrying the measurement uncertainty.
pub fn deviations(entries: &[Entry], relative: &[Measurement]) -> Vec<Measurement> {
    entries
        .iter()
        .zip(relative)
        .map(|(e, r)| Measurement::new(r.value - predicted(e.rotation), r.error))
        .collect()
}

/// Mean squared residual against the prediction; `None` for an empty series.
pub fn mean_squared_error(entries: &[Entry], relative: &[Measurement]) -> Option<f64> {
    let residuals = deviations(entries, relative);
    if residuals.is_empty() {
        return None;
    }
    Some(residuals.iter().map(|d| d.value.powi(2)).sum::<f64>() / residuals.len() as f64)
}

/// Smallest and largest rotation of the entries.
pub fn rotation_range(entries: &[Entry]) -> Option<(f64, f64)> {
    let first = entries.first()?.rotation;
    Some(entries.iter().fold((first, first), |(lo, hi), e| {
        (lo.min(e.rotation), hi.max(e.rotation))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn prediction_extremes() {
        assert_relative_eq!(predicted(0.0), 1.0);
        assert_abs_diff_eq!(predicted(90.0), 0.0, epsilon = 1e-15);
        assert_relative_eq!(predicted(45.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(predicted(180.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn curve_spans_requested_range() {
        let curve = sample_curve(-30.0, 120.0, 500);
        assert_eq!(curve.len(), 500);
        assert_relative_eq!(curve[0].0, -30.0);
        assert_relative_eq!(curve[499].0, 120.0);
        assert!(sample_curve(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn perfect_data_has_zero_error() {
        let entries = vec![Entry::new("a.png", 0.0, 0.5), Entry::new("b.png", 90.0, 0.5)];
        let relative = vec![Measurement::new(1.0, 0.01), Measurement::new(0.0, 0.01)];
        let mse = mean_squared_error(&entries, &relative).unwrap();
        assert_abs_diff_eq!(mse, 0.0, epsilon = 1e-20);
    }

    #[test]
    fn deviation_keeps_measurement_error() {
        let entries = vec![Entry::new("a.png", 60.0, 1.0)];
        let relative = vec![Measurement::new(0.3, 0.02)];
        let dev = deviations(&entries, &relative);
        assert_relative_eq!(dev[0].value, 0.3 - 0.25, epsilon = 1e-12);
        assert_eq!(dev[0].error, 0.02);
    }

    #[test]
    fn rotation_range_ignores_order() {
        let entries = vec![
            Entry::new("a", 40.0, 0.0),
            Entry::new("b", -10.0, 0.0),
            Entry::new("c", 95.0, 0.0),
        ];
        assert_eq!(rotation_range(&entries), Some((-10.0, 95.0)));
        assert_eq!(rotation_range(&[]), None);
    }
}
