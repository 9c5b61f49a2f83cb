//! HTTP client for the external triage service's `/analyze` and `/draft` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use triagekit_core::{AnalyzeRequest, AnalyzeResult, DraftRequest, DraftResult};

use crate::backend::TriageBackend;

/// Message shown when the service gives no usable reason for a failure.
pub const GENERIC_FAILURE: &str = "Request failed";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {}", .detail.as_deref().unwrap_or(GENERIC_FAILURE))]
    Server { status: u16, detail: Option<String> },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The text a user sees for this failure.
    ///
    /// Upstream rejections surface the service's `detail` verbatim; everything
    /// else collapses to [`GENERIC_FAILURE`] except timeouts.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Timeout(after) => format!("Request timed out after {}s", after.as_secs_f64()),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    /// Upstream status code, for rejections only.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP client for the extraction/classification and drafting service.
///
/// One request per call: no retries, no caching. Without a configured timeout
/// a call waits for as long as the connection stays open.
pub struct TriageClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl TriageClient {
    /// Create a client for the given service base URL, e.g. `http://127.0.0.1:8000`.
    ///
    /// A trailing slash is dropped so endpoint paths join cleanly.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Like [`new`](Self::new), with an optional per-request timeout.
    pub fn with_timeout(base_url: String, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(limit) = timeout {
            builder = builder.timeout(limit);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run schema-guided extraction and classification for one ticket.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResult, ClientError> {
        info!(preset = %request.preset, threshold = request.threshold, "analyzing ticket");
        let result: AnalyzeResult = self.post_json("/analyze", request).await?;
        info!(
            priority = result.priority().unwrap_or("-"),
            total_ms = result.total_ms().unwrap_or_default(),
            "analyze complete"
        );
        Ok(result)
    }

    /// Ask the service for a reply draft, given the ticket and its full triage.
    pub async fn draft(&self, request: &DraftRequest) -> Result<DraftResult, ClientError> {
        info!(chars = request.text.len(), "requesting draft");
        let result: DraftResult = self.post_json("/draft", request).await?;
        info!(
            tokens_in = result.tokens_in,
            tokens_out = result.tokens_out,
            latency_ms = result.latency_ms,
            "draft complete"
        );
        Ok(result)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        if !status.is_success() {
            let detail = error_detail(&bytes);
            warn!(url = %url, status = status.as_u16(), detail = ?detail, "service rejected request");
            return Err(ClientError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> ClientError {
        warn!(url = %url, error = %err, "request to triage service failed");
        match self.timeout {
            Some(limit) if err.is_timeout() => ClientError::Timeout(limit),
            _ => ClientError::Http(err),
        }
    }
}

#[async_trait]
impl TriageBackend for TriageClient {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResult, ClientError> {
        TriageClient::analyze(self, request).await
    }

    async fn draft(&self, request: &DraftRequest) -> Result<DraftResult, ClientError> {
        TriageClient::draft(self, request).await
    }
}

/// Pull the `detail` field out of an error body.
///
/// Strings are used as-is. Structured details (validation error lists) are
/// kept as compact JSON. Empty strings, nulls and non-JSON bodies give `None`.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
