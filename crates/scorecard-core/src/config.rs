//! Production configuration constants.
//!
//! These values define the default evaluation setup: where the analysis
//! service listens, where the golden dataset lives and how long a single
//! analysis may take. The evaluation binary lets each of them be
//! overridden from the command line or the environment.
//!
//! # Usage
//!
//! ```
//! use scorecard_core::config::{DEFAULT_DATA_DIR, GROUND_TRUTH_FILENAME};
//! use std::path::Path;
//!
//! let ground_truth = Path::new(DEFAULT_DATA_DIR).join(GROUND_TRUTH_FILENAME);
//! assert!(ground_truth.ends_with("ground-truth.json"));
//! ```

use std::time::Duration;

// =============================================================================
// Analysis Service
// =============================================================================

/// Compliance analysis endpoint of a locally running service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3001/api/ia/analisar-conformidade";

/// Upper bound for a single analysis request, in seconds.
///
/// Analyses run an LLM over the whole document, so this is generous. A
/// request exceeding it counts as a failed case; there is no retry.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Document type tag sent with every analysis request.
///
/// Golden dataset documents are free-form, so they are always submitted
/// with the generic "other" type.
pub const DOCUMENT_TYPE: &str = "OUTRO";

/// User agent identifying the scorecard to the analysis service.
pub const USER_AGENT: &str = concat!("scorecard-eval/", env!("CARGO_PKG_VERSION"));

/// Returns the default request timeout as a [`Duration`].
pub fn request_timeout() -> Duration {
    Duration::from_secs(REQUEST_TIMEOUT_SECS)
}

// =============================================================================
// Golden Dataset
// =============================================================================

/// Directory holding the ground truth file and the case documents.
pub const DEFAULT_DATA_DIR: &str = "e2e/evals/golden-dataset";

/// Ground truth file name inside the data directory.
pub const GROUND_TRUTH_FILENAME: &str = "ground-truth.json";

// =============================================================================
// Environment
// =============================================================================

/// Environment variable overriding [`DEFAULT_ENDPOINT`].
pub const ENDPOINT_ENV: &str = "SCORECARD_ENDPOINT";

/// Environment variable overriding [`DEFAULT_DATA_DIR`].
pub const DATA_DIR_ENV: &str = "SCORECARD_DATA_DIR";
