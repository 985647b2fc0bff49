//! Shared data model for expected and found gaps.
//!
//! Field names on the wire follow the analysis service and the golden
//! dataset format (Portuguese, camelCase for the service). Rust-side names
//! are English; serde renames bridge the two.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::PathBuf;

// ============================================================================
// Ground Truth
// ============================================================================

/// A finding a correct analysis of the case document must surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpectedGap {
    /// Norm code the finding relates to (e.g. "NR-12")
    #[serde(rename = "norma")]
    pub norm: String,
    /// Keywords of which at least one must appear in the found gap text.
    /// Matched case-insensitively as substrings.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ExpectedGap {
    /// Creates an expected gap from a norm code and its keywords.
    pub fn new<K, I>(norm: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            norm: norm.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// One golden dataset entry: a document and the gaps it must produce.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestCase {
    /// Unique case identifier
    pub id: String,
    /// Document path, relative to the dataset directory
    pub file: PathBuf,
    /// Norm codes the document is analyzed against, in request order
    #[serde(rename = "normas", default)]
    pub norms: Vec<String>,
    /// Expected findings, in matching order
    #[serde(default)]
    pub expected_gaps: Vec<ExpectedGap>,
}

// ============================================================================
// Analysis Service Output
// ============================================================================

/// A norm citation backing a found gap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Evidence {
    #[serde(rename = "normaCodigo", default, deserialize_with = "string_or_none")]
    pub norm_code: Option<String>,
}

impl Evidence {
    pub fn new(norm_code: impl Into<String>) -> Self {
        Self {
            norm_code: Some(norm_code.into()),
        }
    }
}

/// A gap reported by the analysis service.
///
/// The service is an LLM pipeline and its output is loosely shaped, so
/// every field tolerates being absent or null, and a text field holding a
/// non-string value reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FoundGap {
    /// Norm code the service attributed the gap to
    #[serde(rename = "codigoNorma", default, deserialize_with = "string_or_none")]
    pub norm_code: Option<String>,
    /// Free-text description of the deficiency
    #[serde(rename = "descricao", default, deserialize_with = "string_or_empty")]
    pub description: String,
    /// Free-text remediation advice
    #[serde(rename = "recomendacao", default, deserialize_with = "string_or_empty")]
    pub recommendation: String,
    /// Norm citations supporting the gap
    #[serde(rename = "evidencias", default, deserialize_with = "null_as_empty")]
    pub evidence: Vec<Evidence>,
}

impl FoundGap {
    /// Creates a found gap with no evidence attached.
    pub fn new(
        norm_code: impl Into<String>,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            norm_code: Some(norm_code.into()),
            description: description.into(),
            recommendation: recommendation.into(),
            evidence: Vec::new(),
        }
    }

    /// Attaches evidence citations (builder style).
    pub fn with_evidence(mut self, evidence: Vec<Evidence>) -> Self {
        self.evidence = evidence;
        self
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_none(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_gap_tolerates_missing_and_null_fields() {
        let gap: FoundGap = serde_json::from_str(
            r#"{"codigoNorma": null, "descricao": null, "evidencias": null}"#,
        )
        .unwrap();
        assert_eq!(gap, FoundGap::default());
    }

    #[test]
    fn test_non_string_text_fields_read_as_empty() {
        let gap: FoundGap = serde_json::from_str(
            r#"{
                "codigoNorma": 12,
                "descricao": ["lista"],
                "recomendacao": {"texto": "x"},
                "evidencias": [{"normaCodigo": 6}, {"normaCodigo": "NR-06"}]
            }"#,
        )
        .unwrap();
        assert_eq!(gap.norm_code, None);
        assert_eq!(gap.description, "");
        assert_eq!(gap.recommendation, "");
        assert_eq!(gap.evidence, vec![Evidence::default(), Evidence::new("NR-06")]);
    }

    #[test]
    fn test_found_gap_wire_names() {
        let gap: FoundGap = serde_json::from_str(
            r#"{
                "id": "g1",
                "codigoNorma": "NR-12",
                "descricao": "Falta proteção",
                "recomendacao": "Instalar proteção",
                "severidade": "alta",
                "evidencias": [{"normaCodigo": "NR-12", "trecho": "..."}]
            }"#,
        )
        .unwrap();
        assert_eq!(gap.norm_code.as_deref(), Some("NR-12"));
        assert_eq!(gap.description, "Falta proteção");
        assert_eq!(gap.recommendation, "Instalar proteção");
        assert_eq!(gap.evidence, vec![Evidence::new("NR-12")]);
    }

    #[test]
    fn test_test_case_wire_names() {
        let case: TestCase = serde_json::from_str(
            r#"{
                "id": "case-01",
                "file": "docs/pgr.txt",
                "normas": ["NR-01", "NR-06"],
                "expected_gaps": [{"norma": "NR-06", "keywords": ["EPI", "CA"]}]
            }"#,
        )
        .unwrap();
        assert_eq!(case.id, "case-01");
        assert_eq!(case.file, PathBuf::from("docs/pgr.txt"));
        assert_eq!(case.norms, vec!["NR-01", "NR-06"]);
        assert_eq!(case.expected_gaps, vec![ExpectedGap::new("NR-06", ["EPI", "CA"])]);
    }
}
