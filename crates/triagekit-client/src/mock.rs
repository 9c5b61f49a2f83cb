use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::json;
use triagekit_core::{AnalyzeRequest, AnalyzeResult, DraftRequest, DraftResult};

use crate::backend::TriageBackend;
use crate::http::ClientError;

type AnalyzeFn = Box<dyn Fn(&AnalyzeRequest) -> Result<AnalyzeResult, ClientError> + Send + Sync>;
type DraftFn = Box<dyn Fn(&DraftRequest) -> Result<DraftResult, ClientError> + Send + Sync>;

/// In-process backend answering from closures and recording every request.
///
/// Defaults: analyze answers `{}` and draft is rejected with a 501.
pub struct ScriptedBackend {
    analyze: AnalyzeFn,
    draft: DraftFn,
    analyze_calls: Mutex<Vec<AnalyzeRequest>>,
    draft_calls: Mutex<Vec<DraftRequest>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            analyze: Box::new(|_| Ok(AnalyzeResult::new(json!({})))),
            draft: Box::new(|_| {
                Err(ClientError::Server {
                    status: 501,
                    detail: Some("no draft scripted".into()),
                })
            }),
            analyze_calls: Mutex::new(Vec::new()),
            draft_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_analyze<F>(mut self, f: F) -> Self
    where
        F: Fn(&AnalyzeRequest) -> Result<AnalyzeResult, ClientError> + Send + Sync + 'static,
    {
        self.analyze = Box::new(f);
        self
    }

    pub fn on_draft<F>(mut self, f: F) -> Self
    where
        F: Fn(&DraftRequest) -> Result<DraftResult, ClientError> + Send + Sync + 'static,
    {
        self.draft = Box::new(f);
        self
    }

    /// Every analyze request received so far, in order.
    pub fn analyze_calls(&self) -> Vec<AnalyzeRequest> {
        self.analyze_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every draft request received so far, in order.
    pub fn draft_calls(&self) -> Vec<DraftRequest> {
        self.draft_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TriageBackend for ScriptedBackend {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResult, ClientError> {
        self.analyze_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        (self.analyze)(request)
    }

    async fn draft(&self, request: &DraftRequest) -> Result<DraftResult, ClientError> {
        self.draft_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        (self.draft)(request)
    }
}
