//! Core triage types: preset catalog, analyze payloads, draft policy, cost heuristics.

pub mod cost;
pub mod payload;
pub mod policy;
pub mod preset;
pub mod triage;

pub use cost::{CostEstimate, estimate_cost};
pub use payload::{AnalyzeRequest, IntentSchema, SeveritySchema, TicketFieldSchema, build_payload};
pub use policy::{DraftMode, ModeError, Priority, should_auto_draft};
pub use preset::{FieldSpec, Preset, PresetError, PresetKey, SEVERITIES, catalog, describe};
pub use triage::{AnalyzeResult, DraftRequest, DraftResult};
