//! Golden dataset loading.
//!
//! # Data Format
//!
//! ```text
//! e2e/evals/golden-dataset/
//! ├── ground-truth.json     # {"test_cases": [...]}
//! └── <case documents>      # referenced by each case's "file"
//! ```
//!
//! Each test case:
//!
//! ```json
//! {
//!   "id": "pgr-metalurgica",
//!   "file": "docs/pgr-metalurgica.txt",
//!   "normas": ["NR-01", "NR-12"],
//!   "expected_gaps": [{"norma": "NR-12", "keywords": ["proteção", "máquina"]}]
//! }
//! ```
//!
//! Case order in the file is the evaluation order.

use crate::config::GROUND_TRUTH_FILENAME;
use crate::error::{ClientError, GroundTruthError};
use crate::types::TestCase;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// The loaded golden dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct GroundTruth {
    /// Test cases in evaluation order
    pub test_cases: Vec<TestCase>,
    /// Directory case documents are resolved against
    #[serde(skip)]
    data_dir: PathBuf,
}

impl GroundTruth {
    /// Creates a dataset from in-memory cases.
    pub fn new(test_cases: Vec<TestCase>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            test_cases,
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Number of test cases.
    pub fn num_cases(&self) -> usize {
        self.test_cases.len()
    }

    /// Total number of expected gaps across all cases.
    pub fn num_expected_gaps(&self) -> usize {
        self.test_cases.iter().map(|c| c.expected_gaps.len()).sum()
    }

    /// Absolute (or data-dir relative) path of a case document.
    pub fn document_path(&self, case: &TestCase) -> PathBuf {
        self.data_dir.join(&case.file)
    }

    /// Reads a case document.
    ///
    /// An unreadable document means no request can be sent for the case,
    /// so it is reported like any other failure to obtain a response.
    pub fn read_document(&self, case: &TestCase) -> Result<String, ClientError> {
        let path = self.document_path(case);
        std::fs::read_to_string(&path).map_err(|e| ClientError::Document {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Loads `ground-truth.json` from a dataset directory.
///
/// # Errors
///
/// Any error here is fatal for the run: the file is missing, unreadable, or
/// not a valid ground truth document.
pub fn load_ground_truth(data_dir: &Path) -> Result<GroundTruth, GroundTruthError> {
    let path = data_dir.join(GROUND_TRUTH_FILENAME);
    if !path.exists() {
        return Err(GroundTruthError::MissingFile(path.display().to_string()));
    }

    let raw = std::fs::read_to_string(&path).map_err(|source| GroundTruthError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut ground_truth: GroundTruth =
        serde_json::from_str(&raw).map_err(|source| GroundTruthError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    ground_truth.data_dir = data_dir.to_path_buf();

    info!(
        "Loaded {} test cases ({} expected gaps) from {}",
        ground_truth.num_cases(),
        ground_truth.num_expected_gaps(),
        path.display()
    );
    Ok(ground_truth)
}

// ============================================================================
// Tests
// ============================================================================
