use async_trait::async_trait;
use triagekit_core::{AnalyzeRequest, AnalyzeResult, DraftRequest, DraftResult};

use crate::http::ClientError;

/// The two calls the external service answers.
///
/// [`TriageClient`](crate::TriageClient) is the HTTP implementation;
/// [`ScriptedBackend`](crate::ScriptedBackend) answers from closures.
#[async_trait]
pub trait TriageBackend: Send + Sync {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResult, ClientError>;

    async fn draft(&self, request: &DraftRequest) -> Result<DraftResult, ClientError>;
}
