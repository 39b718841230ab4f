//! Statistical comparison of inter-keystroke interval series.
//!
//! Each pair of passages is scored with a Gaussian log-likelihood that uses
//! the population variance of the first series only. The score is zero for
//! identical rhythm and grows more negative as the series drift apart.

use itertools::Itertools;
use tracing::debug;

use crate::recorder::IntervalSeries;
use crate::util::{mean, std_dev, variance};

/// Scores strictly below this mark a session as suspicious
pub const SUSPICION_THRESHOLD: f64 = -3000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Verdict {
    #[strum(to_string = "seems consistent! Probably the same person.")]
    Consistent,
    #[strum(to_string = "kind of sus.")]
    Suspicious,
}

/// Similarity of `b` to `a`, scored against the variance of `a`.
///
/// Series of different length are compared over the shorter one. When `a`
/// has zero variance the score is `0.0` for a perfect match and negative
/// infinity otherwise.
pub fn log_likelihood_similarity(a: &[f64], b: &[f64]) -> f64 {
    let Some(sigma2) = variance(a) else {
        return 0.0;
    };

    let mut squared_deviations = a.iter().zip(b).map(|(x, y)| (x - y).powi(2));

    if sigma2 == 0.0 {
        return if squared_deviations.all(|d| d == 0.0) {
            0.0
        } else {
            f64::NEG_INFINITY
        };
    }

    squared_deviations.fold(0.0, |sum, d| sum - d / (2.0 * sigma2))
}

/// Suspicious when the lowest score falls strictly below the threshold
pub fn verdict(scores: &[f64]) -> Verdict {
    let lowest = scores.iter().copied().fold(f64::INFINITY, f64::min);

    if lowest < SUSPICION_THRESHOLD {
        Verdict::Suspicious
    } else {
        Verdict::Consistent
    }
}

/// Score for one ordered pair of passages (0-based indices, `a < b`)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairScore {
    pub a: usize,
    pub b: usize,
    pub score: f64,
}

/// Per-passage interval mean and spread, shown on the results screen
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesSummary {
    pub intervals: usize,
    pub mean_ms: Option<f64>,
    pub std_dev_ms: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
    pub pairs: Vec<PairScore>,
    pub summaries: Vec<SeriesSummary>,
    pub verdict: Verdict,
}

impl Analysis {
    pub fn lowest_score(&self) -> Option<f64> {
        self.pairs.iter().map(|p| p.score).reduce(f64::min)
    }
}

/// Score every pair of passages in order: 1v2, 1v3, 2v3, ...
pub fn analyze(series: &[IntervalSeries]) -> Analysis {
    let pairs = (0..series.len())
        .tuple_combinations()
        .map(|(a, b)| PairScore {
            a,
            b,
            score: log_likelihood_similarity(series[a].as_slice(), series[b].as_slice()),
        })
        .collect::<Vec<PairScore>>();

    let summaries = series
        .iter()
        .map(|s| SeriesSummary {
            intervals: s.len(),
            mean_ms: mean(s.as_slice()),
            std_dev_ms: std_dev(s.as_slice()),
        })
        .collect();

    let verdict = verdict(&pairs.iter().map(|p| p.score).collect::<Vec<f64>>());

    for pair in &pairs {
        debug!(a = pair.a + 1, b = pair.b + 1, score = pair.score, "pairwise similarity");
    }

    Analysis {
        pairs,
        summaries,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_series_score_zero() {
        let series = [120.0, 80.0, 200.0, 95.0, 143.0];
        assert_eq!(log_likelihood_similarity(&series, &series), 0.0);
    }

    #[test]
    fn test_distant_series_score_lower() {
        let a = [0.0, 100.0, 0.0, 100.0];
        let same = log_likelihood_similarity(&a, &a);
        let far = log_likelihood_similarity(&a, &[1000.0, 1000.0, 1000.0, 1000.0]);

        assert!(far < same);
        assert!((far - -724.0).abs() < 1e-9);
    }

    #[test]
    fn test_uses_first_series_variance_only() {
        let a = [0.0, 100.0, 0.0, 100.0];
        let b = [50.0, 50.0, 60.0, 40.0];

        let ab = log_likelihood_similarity(&a, &b);
        let ba = log_likelihood_similarity(&b, &a);

        assert_ne!(ab, ba);
    }

    #[test]
    fn test_mismatched_lengths_truncate() {
        let a = [0.0, 100.0, 0.0, 100.0];
        let short = [0.0, 100.0];

        assert_eq!(log_likelihood_similarity(&a, &short), 0.0);
        assert_eq!(log_likelihood_similarity(&short, &a), 0.0);
    }

    #[test]
    fn test_zero_variance_exact_match_scores_zero() {
        assert_eq!(log_likelihood_similarity(&[100.0, 100.0], &[100.0, 100.0]), 0.0);
        assert_eq!(log_likelihood_similarity(&[100.0], &[100.0]), 0.0);
    }

    #[test]
    fn test_zero_variance_mismatch_is_negative_infinity() {
        let score = log_likelihood_similarity(&[100.0, 100.0], &[100.0, 101.0]);
        assert_eq!(score, f64::NEG_INFINITY);
        assert_eq!(verdict(&[0.0, score, 0.0]), Verdict::Suspicious);
    }

    #[test]
    fn test_empty_series_score_zero() {
        assert_eq!(log_likelihood_similarity(&[], &[1.0, 2.0]), 0.0);
        assert_eq!(log_likelihood_similarity(&[1.0, 2.0], &[]), 0.0);
    }

    #[test]
    fn test_verdict_threshold_is_strict() {
        assert_eq!(verdict(&[-10.0, -3000.0001, -2.0]), Verdict::Suspicious);
        assert_eq!(
            verdict(&[-2999.9999, -2999.9999, -2999.9999]),
            Verdict::Consistent
        );
        assert_eq!(verdict(&[-3000.0, 0.0, 0.0]), Verdict::Consistent);
    }

    #[test]
    fn test_verdict_without_scores() {
        assert_eq!(verdict(&[]), Verdict::Consistent);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Suspicious.to_string(), "kind of sus.");
    }

    #[test]
    fn test_analyze_pair_order() {
        let series = vec![
            IntervalSeries::from_intervals(vec![100.0, 200.0]),
            IntervalSeries::from_intervals(vec![110.0, 190.0]),
            IntervalSeries::from_intervals(vec![300.0, 300.0]),
        ];

        let analysis = analyze(&series);
        let order = analysis
            .pairs
            .iter()
            .map(|p| (p.a, p.b))
            .collect::<Vec<_>>();

        assert_eq!(order, vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(analysis.summaries[0].mean_ms, Some(150.0));
        assert_eq!(analysis.summaries[2].std_dev_ms, Some(0.0));
        // variance of passage 1 is 2500: (100 + 100) / 5000
        assert!((analysis.pairs[0].score - -0.04).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_single_series() {
        let analysis = analyze(&[IntervalSeries::from_intervals(vec![1.0, 2.0])]);
        assert!(analysis.pairs.is_empty());
        assert_eq!(analysis.lowest_score(), None);
        assert_eq!(analysis.verdict, Verdict::Consistent);
    }
}
