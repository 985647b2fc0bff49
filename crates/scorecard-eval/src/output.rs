//! Report formatting.
//!
//! Supports human-readable terminal output and JSON for scripting. Per-case
//! lines are always human-readable; they are emitted as cases complete.

use scorecard_core::evaluation::{CaseOutcome, CaseReport, EvalSummary};
use scorecard_core::matching::MatchConfig;
use scorecard_core::scoring::{Metrics, Tally};
use serde::Serialize;

const RULE_WIDTH: usize = 60;

/// JSON output structure for a complete run
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub dataset: DatasetInfo,
    pub matching: MatchConfig,
    pub cases: Vec<JsonCase>,
    pub summary: JsonSummary,
}

#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub data_dir: String,
    pub endpoint: String,
    pub num_cases: usize,
    pub num_expected_gaps: usize,
}

/// Per-case result in JSON format
#[derive(Debug, Serialize)]
pub struct JsonCase {
    pub id: String,
    pub norms: Vec<String>,
    pub elapsed_secs: f64,
    /// "scored", "malformed" or "failed"
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tally: Option<Tally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonSummary {
    /// Micro-averaged over every non-failed case
    pub metrics: Metrics,
    pub totals: Tally,
    /// Mean of per-case F1, for comparison only
    pub macro_f1: f64,
    pub cases_scored: usize,
    pub cases_failed: usize,
}

impl From<&CaseReport> for JsonCase {
    fn from(report: &CaseReport) -> Self {
        let (status, error) = match &report.outcome {
            CaseOutcome::Scored { .. } => ("scored", None),
            CaseOutcome::Malformed { .. } => ("malformed", None),
            CaseOutcome::Failed { error } => ("failed", Some(error.to_string())),
        };

        Self {
            id: report.id.clone(),
            norms: report.norms.clone(),
            elapsed_secs: report.elapsed.as_secs_f64(),
            status,
            tally: report.outcome.tally(),
            metrics: report.metrics(),
            error,
        }
    }
}

/// Formats the run as pretty-printed JSON.
pub fn format_json(summary: &EvalSummary, dataset: DatasetInfo, matching: MatchConfig) -> String {
    let report = JsonReport {
        dataset,
        matching,
        cases: summary.cases.iter().map(JsonCase::from).collect(),
        summary: JsonSummary {
            metrics: summary.final_metrics(),
            totals: summary.aggregator.global(),
            macro_f1: summary.aggregator.macro_f1(),
            cases_scored: summary.aggregator.cases(),
            cases_failed: summary.aggregator.failed(),
        },
    };
    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}

/// Formats the one-line result of a case.
pub fn format_case_line(report: &CaseReport) -> String {
    let prefix = format!(
        "Test Case: {} Norms: [{}]",
        report.id,
        report.norms.join(", ")
    );

    match (&report.outcome, report.metrics()) {
        (CaseOutcome::Failed { .. }, _) | (_, None) => format!("{} FAILED", prefix),
        (outcome, Some(m)) => {
            let marker = if matches!(outcome, CaseOutcome::Malformed { .. }) {
                " (no analysis payload)"
            } else {
                ""
            };
            format!(
                "{} DONE in {:.2}s | F1: {:.2} | P: {:.2} | R: {:.2}{}",
                prefix,
                report.elapsed.as_secs_f64(),
                m.f1,
                m.precision,
                m.recall,
                marker
            )
        }
    }
}

/// Formats the final scorecard block.
pub fn format_summary(summary: &EvalSummary) -> String {
    let m = summary.final_metrics();
    let totals = summary.aggregator.global();
    let rule = "=".repeat(RULE_WIDTH);

    let mut output = String::new();
    output.push_str(&format!("{}\n", rule));
    output.push_str("FINAL SCORECARD SUMMARY\n");
    output.push_str(&format!("Precision: {:.2}\n", m.precision));
    output.push_str(&format!("Recall:    {:.2}\n", m.recall));
    output.push_str(&format!("F1-Score:  {:.2}\n", m.f1));
    output.push_str(&format!(
        "Total TP: {} | Total FP: {} | Total FN: {}\n",
        totals.tp, totals.fp, totals.fn_
    ));

    let failed = summary.num_failed();
    if failed > 0 {
        let ids: Vec<&str> = summary.failed_cases().map(|c| c.id.as_str()).collect();
        output.push_str(&format!(
            "Failed cases: {} of {} ({})\n",
            failed,
            summary.cases.len(),
            ids.join(", ")
        ));
    }

    output.push_str(&rule);
    output
}

/// Formats the banner printed before the first case.
pub fn format_header() -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{}\nGAP SCORECARD - ANALYSIS EVALUATION\n{}", rule, rule)
}
