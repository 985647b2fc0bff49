//! # Scorecard Core
//!
//! Gap matching and scoring for evaluating a compliance analysis service
//! against a hand-curated golden dataset.
//!
//! The service reads a document, checks it against a list of applicable
//! regulatory norms and reports the compliance gaps it finds. This crate
//! compares those findings with the gaps a correct analysis must surface
//! and turns the comparison into precision/recall/F1 scorecards.
//!
//! ## Modules
//!
//! - [`norm`] - Norm code canonicalization ("NR-06" == "nr6" == "006")
//! - [`matching`] - Pairing found gaps with expected gaps for one test case
//! - [`scoring`] - Per-case tallies, metrics and the global aggregator
//! - [`evaluation`] - Sequential evaluation loop over a golden dataset
//! - [`client`] - Analysis service client trait and HTTP implementation
//! - [`dataset`] - Golden dataset (ground truth) loading
//! - [`types`] - Shared data model for expected and found gaps
//! - [`config`] - Production configuration constants
//! - [`error`] - Error types for dataset loading and service calls

pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod matching;
pub mod norm;
pub mod scoring;
pub mod types;

pub use client::{AnalysisClient, AnalysisRequest, AnalysisResponse, HttpAnalysisClient};
pub use dataset::{load_ground_truth, GroundTruth};
pub use error::{ClientError, GroundTruthError};
pub use evaluation::{CaseOutcome, CaseReport, EvalSummary, Evaluator};
pub use matching::{GapMatcher, MatchConfig, MatchOutcome, MatchStrategy, NormMatch};
pub use norm::normalize_norm_code;
pub use scoring::{score_case, Metrics, ScoreAggregator, Tally};
pub use types::{Evidence, ExpectedGap, FoundGap, TestCase};
