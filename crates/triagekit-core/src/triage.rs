//! Results returned by the external triage service and the draft exchange.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured output of `POST {base}/analyze`.
///
/// The service owns this shape. Only `routing.priority`, `routing.next_queue`
/// and `timings_ms` are ever read here, and all of them are optional; the rest
/// of the object is carried along untouched for display and for drafting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyzeResult(Value);

impl AnalyzeResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The `routing` object, if the service produced one.
    pub fn routing(&self) -> Option<&Value> {
        self.0.get("routing").filter(|v| !v.is_null())
    }

    /// `routing.priority` as sent by the service (any letter case).
    pub fn priority(&self) -> Option<&str> {
        self.routing()?.get("priority")?.as_str()
    }

    /// `routing.next_queue`.
    pub fn next_queue(&self) -> Option<&str> {
        self.routing()?.get("next_queue")?.as_str()
    }

    /// Per-stage timings in milliseconds.
    pub fn timings(&self) -> Option<&Map<String, Value>> {
        self.0.get("timings_ms")?.as_object()
    }

    /// `timings_ms.total`.
    pub fn total_ms(&self) -> Option<f64> {
        self.timings()?.get("total")?.as_f64()
    }
}

/// Body of `POST {base}/draft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRequest {
    pub text: String,
    /// The complete analyze result; the service uses all of it as context.
    pub triage: AnalyzeResult,
}

impl DraftRequest {
    /// Bundle the ticket text (trimmed) with the full triage result.
    pub fn new(text: &str, triage: &AnalyzeResult) -> Self {
        Self {
            text: text.trim().to_string(),
            triage: triage.clone(),
        }
    }
}

/// Response of `POST {base}/draft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResult {
    pub draft: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub latency_ms: f64,
    /// Whether ticket-history context was used by the drafting service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_used: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_queue: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_routing_and_timings() {
        let result = AnalyzeResult::new(json!({
            "preset": "billing",
            "routing": {"next_queue": "billing_ops", "priority": "P2"},
            "timings_ms": {"entities": 12.5, "total": 48.25}
        }));
        assert_eq!(result.priority(), Some("P2"));
        assert_eq!(result.next_queue(), Some("billing_ops"));
        assert_eq!(result.total_ms(), Some(48.25));
        assert_eq!(result.timings().unwrap().len(), 2);
    }

    #[test]
    fn missing_fields_are_none() {
        let result = AnalyzeResult::new(json!({"routing": null, "timings_ms": "fast"}));
        assert!(result.routing().is_none());
        assert!(result.priority().is_none());
        assert!(result.total_ms().is_none());

        let result = AnalyzeResult::new(json!({"routing": {"priority": 0}}));
        assert!(result.priority().is_none());
    }

    #[test]
    fn analyze_result_is_transparent_on_the_wire() {
        let raw = r#"{"entities":{"invoice_id":["INV-19383"]},"routing":{"priority":"P0"}}"#;
        let result: AnalyzeResult = serde_json::from_str(raw).unwrap();
        let back = serde_json::to_value(&result).unwrap();
        assert_eq!(back["entities"]["invoice_id"][0], "INV-19383");
        assert_eq!(back, serde_json::from_str::<Value>(raw).unwrap());
    }

    #[test]
    fn draft_request_trims_text_and_keeps_full_triage() {
        let triage = AnalyzeResult::new(json!({"routing": {"priority": "P1"}, "extra": [1, 2]}));
        let req = DraftRequest::new("\n  SSO is down  \t", &triage);
        assert_eq!(req.text, "SSO is down");
        assert_eq!(req.triage, triage);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["triage"]["extra"][1], 2);
    }

    #[test]
    fn draft_result_optional_context() {
        let minimal: DraftResult = serde_json::from_value(json!({
            "draft": "Hi, thanks for reaching out.",
            "tokens_in": 420,
            "tokens_out": 96,
            "latency_ms": 812.0
        }))
        .unwrap();
        assert!(minimal.context_used.is_none());
        assert!(minimal.context_queue.is_none());

        let with_context: DraftResult = serde_json::from_value(json!({
            "draft": "We are on it.",
            "tokens_in": 500,
            "tokens_out": 110,
            "latency_ms": 640.5,
            "context_used": true,
            "context_preview": "Previous ticket: SSO outage",
            "context_queue": "oncall_incidents"
        }))
        .unwrap();
        assert_eq!(with_context.context_used, Some(true));
        assert_eq!(with_context.context_queue.as_deref(), Some("oncall_incidents"));
    }
}
