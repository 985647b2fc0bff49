//! Sequential evaluation of the analysis service over a golden dataset.
//!
//! Cases run one at a time in ground-truth order. For each case the
//! document is sent to the service, the response is matched against the
//! expected gaps, and the resulting tally is folded into a
//! [`ScoreAggregator`] that the loop owns and threads from case to case.
//!
//! A failure on one case never stops the run. Cases for which no response
//! could be obtained are reported FAILED and left out of the totals; cases
//! whose response lacks the analysis payload count as a total miss.

use crate::client::{AnalysisClient, AnalysisRequest, AnalysisResponse};
use crate::dataset::GroundTruth;
use crate::error::ClientError;
use crate::matching::{GapMatcher, MatchConfig};
use crate::scoring::{score_case, Metrics, ScoreAggregator, Tally};
use crate::types::TestCase;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How a single case ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseOutcome {
    /// The service answered with gaps, which were matched and scored
    Scored { tally: Tally },
    /// The service answered without an analysis payload; total miss
    Malformed { tally: Tally },
    /// No response could be obtained; excluded from the totals
    Failed { error: ClientError },
}

impl CaseOutcome {
    /// Tally contributed to the global totals, if any.
    pub fn tally(&self) -> Option<Tally> {
        match self {
            CaseOutcome::Scored { tally } | CaseOutcome::Malformed { tally } => Some(*tally),
            CaseOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CaseOutcome::Failed { .. })
    }
}

/// Result of evaluating one test case.
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub id: String,
    pub norms: Vec<String>,
    /// Wall time spent reading the document and waiting for the service
    pub elapsed: Duration,
    pub outcome: CaseOutcome,
}

impl CaseReport {
    /// Case metrics; `None` for failed cases.
    pub fn metrics(&self) -> Option<Metrics> {
        self.outcome
            .tally()
            .map(|t| ScoreAggregator::case_metrics(&t))
    }
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct EvalSummary {
    /// Per-case reports in evaluation order
    pub cases: Vec<CaseReport>,
    /// Totals over every non-failed case
    pub aggregator: ScoreAggregator,
}

impl EvalSummary {
    pub fn final_metrics(&self) -> Metrics {
        self.aggregator.final_metrics()
    }

    pub fn failed_cases(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| c.outcome.is_failed())
    }

    pub fn num_failed(&self) -> usize {
        self.aggregator.failed()
    }
}

/// Folds one case outcome into the running totals.
pub fn fold_outcome(aggregator: ScoreAggregator, outcome: &CaseOutcome) -> ScoreAggregator {
    match outcome.tally() {
        Some(tally) => aggregator.absorb(tally),
        None => aggregator.record_failure(),
    }
}

/// Drives the evaluation loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    matcher: GapMatcher,
}

impl Evaluator {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            matcher: GapMatcher::new(config),
        }
    }

    pub fn matcher(&self) -> &GapMatcher {
        &self.matcher
    }

    /// Scores a response obtained for `case`.
    pub fn score_response(&self, case: &TestCase, response: &AnalysisResponse) -> CaseOutcome {
        let expected = &case.expected_gaps;
        match response {
            AnalysisResponse::Gaps(found) => {
                let outcome = self.matcher.match_gaps(expected, found);
                CaseOutcome::Scored {
                    tally: score_case(&outcome, expected.len(), found.len()),
                }
            }
            AnalysisResponse::Malformed => CaseOutcome::Malformed {
                tally: Tally::total_miss(expected.len()),
            },
        }
    }

    /// Runs and scores one case.
    pub async fn evaluate_case<C>(
        &self,
        ground_truth: &GroundTruth,
        case: &TestCase,
        client: &C,
    ) -> CaseReport
    where
        C: AnalysisClient + ?Sized,
    {
        let start = Instant::now();
        let response = match ground_truth.read_document(case) {
            Ok(document) => {
                let request = AnalysisRequest::new(document, case.norms.clone());
                client.analyze(&request).await
            }
            Err(e) => Err(e),
        };
        let elapsed = start.elapsed();

        let outcome = match response {
            Ok(response) => self.score_response(case, &response),
            Err(error) => {
                warn!("Case {} failed: {}", case.id, error);
                CaseOutcome::Failed { error }
            }
        };

        CaseReport {
            id: case.id.clone(),
            norms: case.norms.clone(),
            elapsed,
            outcome,
        }
    }

    /// Evaluates every case in ground-truth order.
    ///
    /// `on_case` is called after each case, before the next one starts, so
    /// callers can report progress incrementally.
    pub async fn run<C, F>(
        &self,
        ground_truth: &GroundTruth,
        client: &C,
        mut on_case: F,
    ) -> EvalSummary
    where
        C: AnalysisClient + ?Sized,
        F: FnMut(&CaseReport),
    {
        let mut aggregator = ScoreAggregator::new();
        let mut cases = Vec::with_capacity(ground_truth.num_cases());

        for case in &ground_truth.test_cases {
            let report = self.evaluate_case(ground_truth, case, client).await;
            aggregator = fold_outcome(aggregator, &report.outcome);
            on_case(&report);
            cases.push(report);
        }

        info!(
            "Evaluated {} cases ({} failed)",
            cases.len(),
            aggregator.failed()
        );
        EvalSummary { cases, aggregator }
    }
}
