use thiserror::Error;
use triagekit_client::ClientError;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("golden ticket file not found: {0}")]
    GoldenNotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid golden tickets: {0}")]
    Json(#[from] serde_json::Error),

    #[error("analyze failed for golden ticket #{index}: {source}")]
    Analyze {
        index: usize,
        #[source]
        source: ClientError,
    },
}
