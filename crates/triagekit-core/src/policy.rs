//! Auto-draft policy and draft triggering modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::triage::AnalyzeResult;

/// Urgency code produced by the service's routing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    /// Parse a priority code in any letter case. Unknown codes yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "P0" => Some(Self::P0),
            "P1" => Some(Self::P1),
            "P2" => Some(Self::P2),
            "P3" => Some(Self::P3),
            _ => None,
        }
    }

    /// The two most urgent levels.
    pub fn is_urgent(self) -> bool {
        matches!(self, Self::P0 | Self::P1)
    }
}

/// Decide whether a draft should be requested without user action.
///
/// True only for `P0`/`P1`. A missing routing object, a missing or non-string
/// priority, and any unrecognised code all mean "no".
pub fn should_auto_draft(result: &AnalyzeResult) -> bool {
    result
        .priority()
        .and_then(Priority::parse)
        .is_some_and(Priority::is_urgent)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown draft mode: {0} (expected manual or auto)")]
pub struct ModeError(String);

/// How drafts are triggered after a successful triage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftMode {
    /// Drafts only on explicit request.
    #[default]
    Manual,
    /// Draft immediately after triage when [`should_auto_draft`] holds.
    Auto,
}

impl fmt::Display for DraftMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        })
    }
}

impl FromStr for DraftMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "auto" => Ok(Self::Auto),
            _ => Err(ModeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(value: serde_json::Value) -> AnalyzeResult {
        AnalyzeResult::new(value)
    }

    #[test]
    fn urgent_priorities_draft() {
        assert!(should_auto_draft(&result(json!({"routing": {"priority": "p0"}}))));
        assert!(should_auto_draft(&result(json!({"routing": {"priority": "P1"}}))));
        assert!(should_auto_draft(&result(json!({"routing": {"priority": "P0"}}))));
    }

    #[test]
    fn other_priorities_do_not_draft() {
        assert!(!should_auto_draft(&result(json!({"routing": {"priority": "sev2"}}))));
        assert!(!should_auto_draft(&result(json!({"routing": {"priority": "P2"}}))));
        assert!(!should_auto_draft(&result(json!({"routing": {"priority": "p3"}}))));
        assert!(!should_auto_draft(&result(json!({"routing": {"priority": "urgent"}}))));
    }

    #[test]
    fn missing_priority_does_not_draft() {
        assert!(!should_auto_draft(&result(json!({"routing": {}}))));
        assert!(!should_auto_draft(&result(json!({"routing": null}))));
        assert!(!should_auto_draft(&result(json!({"entities": []}))));
        assert!(!should_auto_draft(&result(json!({"routing": {"priority": 1}}))));
    }

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(Priority::parse("p1"), Some(Priority::P1));
        assert_eq!(Priority::parse("P3"), Some(Priority::P3));
        assert_eq!(Priority::parse(" P1"), None);
        assert!(Priority::P0 < Priority::P2);
    }

    #[test]
    fn draft_mode_parsing() {
        assert_eq!("auto".parse::<DraftMode>().unwrap(), DraftMode::Auto);
        assert_eq!("Manual".parse::<DraftMode>().unwrap(), DraftMode::Manual);
        assert!("sometimes".parse::<DraftMode>().is_err());
        assert_eq!(DraftMode::default(), DraftMode::Manual);
        assert_eq!(serde_json::to_value(DraftMode::Auto).unwrap(), "auto");
        assert_eq!(DraftMode::Auto.to_string(), "auto");
    }
}
