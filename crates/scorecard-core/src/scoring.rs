//! Per-case tallies, precision/recall/F1 and the global aggregator.
//!
//! # Micro vs Macro Averaging
//!
//! The final scorecard is **micro-averaged**: tallies of all cases are
//! summed first and the metrics are computed once from the sum. A case with
//! ten expected gaps therefore weighs ten times more than a case with one.
//!
//! The **macro** average (mean of per-case F1) is also tracked, but only as
//! a diagnostic. The two differ whenever case sizes differ.
//!
//! # Formulas
//!
//! ```text
//! precision = tp / (tp + fp)
//! recall    = tp / (tp + fn)
//! f1        = 2 * precision * recall / (precision + recall)
//! ```
//!
//! Each metric is 0.0 when its denominator is 0.

use crate::matching::MatchOutcome;
use serde::Serialize;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

// ============================================================================
// Tally
// ============================================================================

/// True positive / false positive / false negative counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl Tally {
    pub fn new(tp: usize, fp: usize, fn_: usize) -> Self {
        Self { tp, fp, fn_ }
    }

    /// Tally of a case whose response carried no analysis payload: every
    /// expected gap is missed and nothing was reported.
    pub fn total_miss(expected: usize) -> Self {
        Self::new(0, 0, expected)
    }

    /// Number of expected gaps this tally accounts for (`tp + fn`).
    pub fn expected(&self) -> usize {
        self.tp + self.fn_
    }

    /// Number of found gaps this tally accounts for (`tp + fp`).
    pub fn found(&self) -> usize {
        self.tp + self.fp
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::from_tally(self)
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        Tally::new(self.tp + rhs.tp, self.fp + rhs.fp, self.fn_ + rhs.fn_)
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Tally) {
        *self = *self + rhs;
    }
}

impl Sum for Tally {
    fn sum<I: Iterator<Item = Tally>>(iter: I) -> Tally {
        iter.fold(Tally::default(), Add::add)
    }
}

/// Converts a matching outcome into the case tally.
///
/// `expected` and `found` are the total gap counts of the case, matched or
/// not. By construction `tp + fn == expected` and `tp + fp == found`.
pub fn score_case(outcome: &MatchOutcome, expected: usize, found: usize) -> Tally {
    let tp = outcome.matched_expected.len();
    Tally::new(
        tp,
        found.saturating_sub(outcome.matched_found.len()),
        expected.saturating_sub(tp),
    )
}

// ============================================================================
// Metrics
// ============================================================================

/// Precision, recall and F1 derived from a tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Metrics {
    /// Computes metrics from a tally, substituting 0.0 for any ratio whose
    /// denominator is zero.
    pub fn from_tally(tally: &Tally) -> Self {
        let precision = ratio(tally.tp, tally.tp + tally.fp);
        let recall = ratio(tally.tp, tally.tp + tally.fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            precision,
            recall,
            f1,
        }
    }
}

#[inline]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// ============================================================================
// Aggregator
// ============================================================================

/// Running totals over the cases of one evaluation run.
///
/// The aggregator is a plain value: the evaluation loop owns it and folds
/// each case tally in with [`ScoreAggregator::absorb`]. Failed cases are
/// only counted, never folded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreAggregator {
    global: Tally,
    cases: usize,
    f1_sum: f64,
    failed: usize,
}

impl ScoreAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an aggregator from a sequence of case tallies.
    pub fn from_tallies<I: IntoIterator<Item = Tally>>(tallies: I) -> Self {
        tallies.into_iter().fold(Self::new(), Self::absorb)
    }

    /// Folds one case tally into the running totals.
    pub fn absorb(mut self, tally: Tally) -> Self {
        self.global += tally;
        self.cases += 1;
        self.f1_sum += tally.metrics().f1;
        self
    }

    /// Records a case that produced no response. Leaves the tally untouched.
    pub fn record_failure(mut self) -> Self {
        self.failed += 1;
        self
    }

    /// Metrics of a single case tally.
    pub fn case_metrics(tally: &Tally) -> Metrics {
        Metrics::from_tally(tally)
    }

    /// Micro-averaged metrics over every absorbed case.
    pub fn final_metrics(&self) -> Metrics {
        Metrics::from_tally(&self.global)
    }

    /// Mean of per-case F1 over every absorbed case; 0.0 with no cases.
    pub fn macro_f1(&self) -> f64 {
        if self.cases == 0 {
            0.0
        } else {
            self.f1_sum / self.cases as f64
        }
    }

    /// Summed tally of every absorbed case.
    pub fn global(&self) -> Tally {
        self.global
    }

    /// Number of cases folded into the tally.
    pub fn cases(&self) -> usize {
        self.cases
    }

    /// Number of cases excluded because no response was obtained.
    pub fn failed(&self) -> usize {
        self.failed
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::GapMatcher;
    use crate::types::{ExpectedGap, FoundGap};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_unit_interval(m: &Metrics) {
        for v in [m.precision, m.recall, m.f1] {
            assert!((0.0..=1.0).contains(&v), "metric out of range: {v}");
        }
    }

    #[test]
    fn test_score_case_counts() {
        let expected = vec![
            ExpectedGap::new("NR-06", ["epi"]),
            ExpectedGap::new("NR-12", ["proteção"]),
            ExpectedGap::new("NR-35", ["altura"]),
        ];
        let found = vec![
            FoundGap::new("NR-06", "epi sem ca", ""),
            FoundGap::new("NR-10", "painel aberto", ""),
        ];

        let outcome = GapMatcher::default().match_gaps(&expected, &found);
        let tally = score_case(&outcome, expected.len(), found.len());

        assert_eq!(tally, Tally::new(1, 1, 2));
        assert_eq!(tally.expected(), expected.len());
        assert_eq!(tally.found(), found.len());
    }

    #[test]
    fn test_duplicate_expected_yields_false_negative() {
        let expected = vec![
            ExpectedGap::new("NR-12", ["proteção", "máquina"]),
            ExpectedGap::new("NR-12", ["proteção", "máquina"]),
        ];
        let found = vec![FoundGap::new("12", "Falta proteção coletiva em máquina X", "")];

        let outcome = GapMatcher::default().match_gaps(&expected, &found);
        let tally = score_case(&outcome, expected.len(), found.len());
        assert_eq!(tally, Tally::new(1, 0, 1));
    }

    #[test]
    fn test_empty_case_is_all_zero() {
        let outcome = GapMatcher::default().match_gaps(&[], &[]);
        let tally = score_case(&outcome, 0, 0);
        assert_eq!(tally, Tally::default());

        let m = tally.metrics();
        assert_eq!(m, Metrics::default());
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
    }

    #[test]
    fn test_metrics_formulas() {
        let m = Metrics::from_tally(&Tally::new(2, 2, 1));
        assert_close(m.precision, 0.5);
        assert_close(m.recall, 2.0 / 3.0);
        assert_close(m.f1, 2.0 * 0.5 * (2.0 / 3.0) / (0.5 + 2.0 / 3.0));
        assert_unit_interval(&m);
    }

    #[test]
    fn test_zero_denominators_give_zero() {
        // Nothing found: precision undefined -> 0
        let m = Metrics::from_tally(&Tally::new(0, 0, 3));
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);

        // Nothing expected: recall undefined -> 0
        let m = Metrics::from_tally(&Tally::new(0, 4, 0));
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
    }

    #[test]
    fn test_metrics_stay_in_unit_interval() {
        for tp in 0..4 {
            for fp in 0..4 {
                for fn_ in 0..4 {
                    assert_unit_interval(&Tally::new(tp, fp, fn_).metrics());
                }
            }
        }
    }

    #[test]
    fn test_total_miss() {
        let tally = Tally::total_miss(4);
        assert_eq!(tally, Tally::new(0, 0, 4));
        assert_eq!(tally.metrics().f1, 0.0);
    }

    #[test]
    fn test_aggregator_sums_tallies() {
        let agg = ScoreAggregator::new()
            .absorb(Tally::new(1, 0, 1))
            .absorb(Tally::new(2, 3, 0))
            .record_failure();

        assert_eq!(agg.global(), Tally::new(3, 3, 1));
        assert_eq!(agg.cases(), 2);
        assert_eq!(agg.failed(), 1);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let tallies = [Tally::new(1, 0, 1), Tally::new(2, 3, 0), Tally::new(0, 1, 5)];
        let forward = ScoreAggregator::from_tallies(tallies);
        let backward = ScoreAggregator::from_tallies(tallies.iter().rev().copied());

        assert_eq!(forward.global(), backward.global());
        assert_eq!(forward.final_metrics(), backward.final_metrics());
        assert_eq!(forward.global(), tallies.iter().copied().sum::<Tally>());
    }

    #[test]
    fn test_micro_average_differs_from_macro_average() {
        // Small perfect case, large poor case
        let small = Tally::new(1, 0, 0);
        let large = Tally::new(1, 9, 9);
        let agg = ScoreAggregator::from_tallies([small, large]);

        let per_case_mean = (ScoreAggregator::case_metrics(&small).f1
            + ScoreAggregator::case_metrics(&large).f1)
            / 2.0;
        let micro = agg.final_metrics().f1;

        // micro: P = 2/11, R = 2/11 -> F1 = 2/11
        assert_close(micro, 2.0 / 11.0);
        // macro: (1.0 + 0.1) / 2
        assert_close(per_case_mean, 0.55);
        assert_close(agg.macro_f1(), per_case_mean);
        assert!((micro - per_case_mean).abs() > 0.1);
    }

    #[test]
    fn test_empty_aggregator() {
        let agg = ScoreAggregator::new();
        assert_eq!(agg.final_metrics(), Metrics::default());
        assert_eq!(agg.macro_f1(), 0.0);
    }
}
