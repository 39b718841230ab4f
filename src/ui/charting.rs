use keycadence::recorder::IntervalSeries;

/// (keystroke index, interval ms) points for each passage
pub fn series_points(series: &[IntervalSeries]) -> Vec<Vec<(f64, f64)>> {
    series
        .iter()
        .map(|s| {
            s.as_slice()
                .iter()
                .enumerate()
                .map(|(i, &ms)| (i as f64, ms))
                .collect()
        })
        .collect()
}

/// Compute X (keystroke index) and Y (interval ms) bounds for the results chart
pub fn compute_chart_params(points: &[Vec<(f64, f64)>]) -> (f64, f64) {
    let (mut longest, mut highest_ms) = (0.0_f64, 0.0_f64);
    for &(idx, ms) in points.iter().flatten() {
        longest = longest.max(idx);
        highest_ms = highest_ms.max(ms);
    }

    (longest.max(1.0), highest_ms.max(1.0).ceil())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        assert_eq!(compute_chart_params(&[]), (1.0, 1.0));
    }

    #[test]
    fn test_compute_chart_params() {
        let points = series_points(&[
            IntervalSeries::from_intervals(vec![120.0, 340.2]),
            IntervalSeries::from_intervals(vec![90.0, 80.0, 100.0]),
        ]);

        assert_eq!(points[1][2], (2.0, 100.0));
        assert_eq!(compute_chart_params(&points), (2.0, 341.0));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
