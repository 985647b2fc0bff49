//! Error types for scorecard-core.
//!
//! Two families of failures exist during an evaluation run:
//! - [`GroundTruthError`] is fatal: without the golden dataset there is
//!   nothing to evaluate, so the run aborts before any case is processed.
//! - [`ClientError`] is local to one test case: the case is reported as
//!   failed and the run moves on to the next one.

use thiserror::Error;

/// Errors that can occur while loading the golden dataset.
#[derive(Debug, Error)]
pub enum GroundTruthError {
    /// Ground truth file does not exist
    #[error("Ground truth not found: {0}")]
    MissingFile(String),
    /// Ground truth file could not be read
    #[error("Failed to read ground truth {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Ground truth file is not valid JSON of the expected shape
    #[error("Invalid ground truth {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that prevent a usable response from being obtained for a case.
///
/// A response that arrives but lacks the analysis payload is not an error;
/// it is represented by [`AnalysisResponse::Malformed`](crate::client::AnalysisResponse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The case document could not be read
    #[error("Failed to read document {path}: {message}")]
    Document { path: String, message: String },
    /// Request did not complete within the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// Connection or other transport failure
    #[error("Request failed: {0}")]
    Transport(String),
    /// Service answered with a non-success status
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body is not JSON
    #[error("Undecodable response body: {0}")]
    Decode(String),
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}
