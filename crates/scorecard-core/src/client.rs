//! Analysis service client.
//!
//! The analysis service is a black box reached over HTTP: it receives the
//! full document text with its applicable norms and answers with the gaps
//! it found. [`AnalysisClient`] is the seam the evaluation loop depends on;
//! [`HttpAnalysisClient`] is the production implementation and tests plug
//! in in-memory fakes.
//!
//! # Response Shapes
//!
//! | Outcome | Meaning | Scoring |
//! |---------|---------|---------|
//! | `Ok(AnalysisResponse::Gaps(..))` | Payload present | Matched and scored |
//! | `Ok(AnalysisResponse::Malformed)` | JSON without the `data` payload | Total miss, folded |
//! | `Err(ClientError)` | Timeout, transport, non-2xx, non-JSON | FAILED, excluded |

use crate::config;
use crate::error::ClientError;
use crate::types::FoundGap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Request body of one analysis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    /// Full document text
    #[serde(rename = "documento")]
    pub document: String,
    /// Norm codes to check the document against
    #[serde(rename = "normasAplicaveis")]
    pub norms: Vec<String>,
    /// Document type tag
    #[serde(rename = "tipoDocumento")]
    pub document_type: String,
}

impl AnalysisRequest {
    /// Creates a request with the default document type tag.
    pub fn new(document: impl Into<String>, norms: Vec<String>) -> Self {
        Self {
            document: document.into(),
            norms,
            document_type: config::DOCUMENT_TYPE.to_string(),
        }
    }
}

/// A response obtained from the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResponse {
    /// Gaps reported by the service, in response order
    Gaps(Vec<FoundGap>),
    /// Response arrived but carries no analysis payload
    Malformed,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisPayload {
    #[serde(default)]
    gaps: Vec<FoundGap>,
}

/// Interprets a success response body.
///
/// A body that is not JSON is a [`ClientError::Decode`]. JSON without an
/// object under `data`, or whose `data` does not decode, is
/// [`AnalysisResponse::Malformed`]. A `data` object without `gaps` means the
/// service found nothing.
pub fn parse_response_body(body: &str) -> Result<AnalysisResponse, ClientError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))?;

    let Some(data) = value.get("data").filter(|d| d.is_object()) else {
        debug!("Response has no data payload");
        return Ok(AnalysisResponse::Malformed);
    };

    match AnalysisPayload::deserialize(data) {
        Ok(payload) => Ok(AnalysisResponse::Gaps(payload.gaps)),
        Err(e) => {
            debug!("Undecodable data payload: {}", e);
            Ok(AnalysisResponse::Malformed)
        }
    }
}

/// Sends documents to the analysis service.
#[async_trait::async_trait(?Send)]
pub trait AnalysisClient {
    /// Runs one analysis. Blocks the caller until the service answers or
    /// the request fails; implementations do not retry.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ClientError>;
}

/// [`AnalysisClient`] talking JSON over HTTP.
///
/// Holds one pooled `reqwest::Client`, so consecutive cases reuse the
/// connection to the service.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpAnalysisClient {
    /// Creates a client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(config::USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    /// Creates a client for the default local endpoint and timeout.
    pub fn with_defaults() -> Result<Self, ClientError> {
        Self::new(config::DEFAULT_ENDPOINT, config::request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout.as_secs())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

#[async_trait::async_trait(?Send)]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ClientError> {
        debug!(
            "POST {} ({} bytes, {} norms)",
            self.endpoint,
            request.document.len(),
            request.norms.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!("Service returned {}: {}", status.as_u16(), body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response_body(&body)
    }
}
