//! Golden tickets: tickets with known routing, used as ground truth.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use triagekit_core::PresetKey;

use crate::EvalError;

/// Routing the service is expected to produce for a golden ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedRouting {
    pub next_queue: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenTicket {
    pub preset: PresetKey,
    pub text: String,
    pub expected_routing: ExpectedRouting,
}

/// Load a JSON array of golden tickets.
///
/// Unknown preset ids fail the whole load.
pub fn load_golden(path: &Path) -> Result<Vec<GoldenTicket>, EvalError> {
    if !path.exists() {
        return Err(EvalError::GoldenNotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    let tickets: Vec<GoldenTicket> = serde_json::from_str(&raw)?;
    info!(count = tickets.len(), path = %path.display(), "loaded golden tickets");
    Ok(tickets)
}
