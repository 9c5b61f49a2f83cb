//! Analyze request payloads.
//!
//! [`build_payload`] is the only place a preset turns into a wire request. It
//! is a pure function: the text and threshold are passed through untouched and
//! every schema list is copied verbatim from the catalog.

use serde::{Deserialize, Serialize};

use crate::preset::{PresetKey, describe};

/// `{"severity": [...]}` classification schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySchema {
    pub severity: Vec<String>,
}

/// `{"intent": [...]}` classification schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSchema {
    pub intent: Vec<String>,
}

/// `{"ticket_fields": ["name::type::description", ...]}` extraction schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFieldSchema {
    pub ticket_fields: Vec<String>,
}

/// Body of `POST {base}/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    pub threshold: f64,
    pub entity_labels: Vec<String>,
    pub severity_schema: SeveritySchema,
    pub intent_schema: IntentSchema,
    pub json_schema: TicketFieldSchema,
    pub preset: PresetKey,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Build the analyze request for `preset`.
///
/// `text` is not trimmed and `threshold` is not clamped to `[0, 1]`; callers
/// own both checks.
pub fn build_payload(preset: PresetKey, text: &str, threshold: f64) -> AnalyzeRequest {
    let config = describe(preset);
    AnalyzeRequest {
        text: text.to_string(),
        threshold,
        entity_labels: owned(config.entity_labels),
        severity_schema: SeveritySchema {
            severity: owned(config.severities),
        },
        intent_schema: IntentSchema {
            intent: owned(config.intents),
        },
        json_schema: TicketFieldSchema {
            ticket_fields: config.schema_entries(),
        },
        preset,
    }
}
