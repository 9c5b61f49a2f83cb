//! Per-interaction triage state.
//!
//! A [`TriageSession`] holds what one user sees: the latest triage result,
//! the latest draft, and an error slot for each. Every analyze or draft call
//! is stamped with a [`RequestSeq`]; a completion that is no longer the latest
//! of its kind is dropped so a slow response never overwrites a newer one.
//! Starting a new analyze also orphans any draft still in flight.
//!
//! A long-lived caller (an interactive front end holding one session per
//! user) drives [`TriageSession::analyze`] and [`TriageSession::request_draft`]
//! and gets the stale guard for free. A stateless caller such as the web
//! route uses [`begin_analyze`](TriageSession::begin_analyze) /
//! [`finish_analyze`](TriageSession::finish_analyze) and asks
//! [`auto_draft_due`](TriageSession::auto_draft_due) instead of drafting
//! inline, leaving the draft to a separate request.

use thiserror::Error;
use tracing::{debug, info};
use triagekit_core::{
    AnalyzeResult, DraftMode, DraftRequest, DraftResult, PresetKey, build_payload,
    should_auto_draft,
};

use crate::backend::TriageBackend;
use crate::http::ClientError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("ticket text is empty")]
    EmptyText,
    #[error("no triage result to draft from")]
    NoTriage,
}

/// Monotonic stamp issued by a session for each request it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestSeq(u64);

/// What caused the current draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTrigger {
    Auto,
    Manual,
}

/// How a completed request was applied to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Result stored.
    Accepted,
    /// Failure stored in the matching error slot.
    Failed,
    /// Superseded by a newer request; nothing changed.
    Stale,
}

pub struct TriageSession {
    mode: DraftMode,
    last_seq: u64,
    analyze_seq: Option<RequestSeq>,
    draft_seq: Option<(RequestSeq, DraftTrigger)>,
    pending_text: Option<String>,
    text: Option<String>,
    triage: Option<AnalyzeResult>,
    draft: Option<DraftResult>,
    draft_trigger: Option<DraftTrigger>,
    analyze_error: Option<ClientError>,
    draft_error: Option<ClientError>,
}

impl TriageSession {
    pub fn new(mode: DraftMode) -> Self {
        Self {
            mode,
            last_seq: 0,
            analyze_seq: None,
            draft_seq: None,
            pending_text: None,
            text: None,
            triage: None,
            draft: None,
            draft_trigger: None,
            analyze_error: None,
            draft_error: None,
        }
    }

    /// Resume from a triage result obtained earlier, e.g. one the browser
    /// sends back with a manual draft request.
    pub fn with_triage(
        mode: DraftMode,
        text: &str,
        triage: AnalyzeResult,
    ) -> Result<Self, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyText);
        }
        let mut session = Self::new(mode);
        session.text = Some(text.to_string());
        session.triage = Some(triage);
        Ok(session)
    }

    pub fn triage(&self) -> Option<&AnalyzeResult> {
        self.triage.as_ref()
    }

    /// Trimmed ticket text the current triage was produced from.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn draft(&self) -> Option<&DraftResult> {
        self.draft.as_ref()
    }

    pub fn draft_trigger(&self) -> Option<DraftTrigger> {
        self.draft_trigger
    }

    pub fn analyze_error(&self) -> Option<&ClientError> {
        self.analyze_error.as_ref()
    }

    pub fn draft_error(&self) -> Option<&ClientError> {
        self.draft_error.as_ref()
    }

    /// True when the session is in [`DraftMode::Auto`], the current triage
    /// calls for a draft, and no draft has been produced or started for it.
    pub fn auto_draft_due(&self) -> bool {
        self.mode == DraftMode::Auto
            && self.draft.is_none()
            && self.draft_seq.is_none()
            && self.triage.as_ref().is_some_and(should_auto_draft)
    }

    fn issue(&mut self) -> RequestSeq {
        self.last_seq += 1;
        RequestSeq(self.last_seq)
    }

    /// Start a new triage. Clears everything shown for the previous ticket.
    pub fn begin_analyze(&mut self, text: &str) -> Result<RequestSeq, SessionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyText);
        }
        let seq = self.issue();
        self.analyze_seq = Some(seq);
        self.draft_seq = None;
        self.pending_text = Some(trimmed.to_string());
        self.text = None;
        self.triage = None;
        self.draft = None;
        self.draft_trigger = None;
        self.analyze_error = None;
        self.draft_error = None;
        Ok(seq)
    }

    /// Apply the response of the analyze call stamped `seq`.
    pub fn finish_analyze(
        &mut self,
        seq: RequestSeq,
        result: Result<AnalyzeResult, ClientError>,
    ) -> Outcome {
        if self.analyze_seq != Some(seq) {
            debug!(seq = seq.0, "discarding superseded analyze response");
            return Outcome::Stale;
        }
        match result {
            Ok(triage) => {
                self.text = self.pending_text.take();
                self.triage = Some(triage);
                Outcome::Accepted
            }
            Err(err) => {
                self.pending_text = None;
                self.analyze_error = Some(err);
                Outcome::Failed
            }
        }
    }

    /// Start a draft for the current triage. Any earlier draft still in
    /// flight becomes stale; the draft currently shown stays until this one
    /// succeeds.
    pub fn begin_draft(
        &mut self,
        trigger: DraftTrigger,
    ) -> Result<(RequestSeq, DraftRequest), SessionError> {
        let (Some(text), Some(triage)) = (self.text.as_deref(), self.triage.as_ref()) else {
            return Err(SessionError::NoTriage);
        };
        let request = DraftRequest::new(text, triage);
        let seq = self.issue();
        self.draft_seq = Some((seq, trigger));
        self.draft_error = None;
        Ok((seq, request))
    }

    /// Apply the response of the draft call stamped `seq`.
    pub fn finish_draft(
        &mut self,
        seq: RequestSeq,
        result: Result<DraftResult, ClientError>,
    ) -> Outcome {
        let trigger = match self.draft_seq {
            Some((current, trigger)) if current == seq => trigger,
            _ => {
                debug!(seq = seq.0, "discarding superseded draft response");
                return Outcome::Stale;
            }
        };
        match result {
            Ok(draft) => {
                self.draft = Some(draft);
                self.draft_trigger = Some(trigger);
                Outcome::Accepted
            }
            Err(err) => {
                self.draft_error = Some(err);
                Outcome::Failed
            }
        }
    }

    /// Triage `text` with `preset`, then draft automatically when the session
    /// is in [`DraftMode::Auto`] and the result's priority calls for it.
    ///
    /// Service failures are recorded in the error slots, not returned.
    pub async fn analyze<B>(
        &mut self,
        backend: &B,
        preset: PresetKey,
        text: &str,
        threshold: f64,
    ) -> Result<Outcome, SessionError>
    where
        B: TriageBackend + ?Sized,
    {
        let seq = self.begin_analyze(text)?;
        let request = build_payload(preset, text, threshold);
        let result = backend.analyze(&request).await;
        let outcome = self.finish_analyze(seq, result);

        if outcome == Outcome::Accepted && self.auto_draft_due() {
            info!(
                seq = seq.0,
                priority = self.triage.as_ref().and_then(|t| t.priority()).unwrap_or("-"),
                "auto-drafting urgent ticket"
            );
            self.run_draft(backend, DraftTrigger::Auto).await?;
        }
        Ok(outcome)
    }

    /// Request (or re-request) a draft for the current triage.
    pub async fn request_draft<B>(&mut self, backend: &B) -> Result<Outcome, SessionError>
    where
        B: TriageBackend + ?Sized,
    {
        self.run_draft(backend, DraftTrigger::Manual).await
    }

    async fn run_draft<B>(
        &mut self,
        backend: &B,
        trigger: DraftTrigger,
    ) -> Result<Outcome, SessionError>
    where
        B: TriageBackend + ?Sized,
    {
        let (seq, request) = self.begin_draft(trigger)?;
        let result = backend.draft(&request).await;
        Ok(self.finish_draft(seq, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedBackend;
    use serde_json::json;

    fn analyzed(priority: &str) -> AnalyzeResult {
        AnalyzeResult::new(json!({
            "preset": "auth_incident",
            "entities": {"idp": ["Okta"]},
            "routing": {"next_queue": "oncall_incidents", "priority": priority},
            "timings_ms": {"total": 37.5}
        }))
    }

    fn drafted(text: &str) -> DraftResult {
        DraftResult {
            draft: text.to_string(),
            tokens_in: 400,
            tokens_out: 90,
            latency_ms: 512.0,
            context_used: None,
            context_preview: None,
            context_queue: None,
        }
    }

    fn upstream(detail: &str) -> ClientError {
        ClientError::Server {
            status: 500,
            detail: Some(detail.to_string()),
        }
    }

    #[tokio::test]
    async fn auto_mode_drafts_urgent_ticket_once() {
        let backend = ScriptedBackend::new()
            .on_analyze(|_| Ok(analyzed("P0")))
            .on_draft(|_| Ok(drafted("We are on it.")));
        let mut session = TriageSession::new(DraftMode::Auto);

        let outcome = session
            .analyze(&backend, PresetKey::AuthIncident, "  SSO is down  ", 0.6)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Accepted);
        let drafts = backend.draft_calls();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].text, "SSO is down");
        assert_eq!(drafts[0].triage, analyzed("P0"));
        assert_eq!(session.draft().unwrap().draft, "We are on it.");
        assert_eq!(session.draft_trigger(), Some(DraftTrigger::Auto));
    }

    #[tokio::test]
    async fn analyze_sends_untrimmed_text() {
        let backend = ScriptedBackend::new();
        let mut session = TriageSession::new(DraftMode::Manual);
        session
            .analyze(&backend, PresetKey::Billing, " refund INV-19383 ", 0.6)
            .await
            .unwrap();
        assert_eq!(backend.analyze_calls()[0].text, " refund INV-19383 ");
        assert_eq!(session.text(), Some("refund INV-19383"));
    }

    #[tokio::test]
    async fn auto_mode_skips_routine_ticket() {
        let backend = ScriptedBackend::new().on_analyze(|_| Ok(analyzed("p2")));
        let mut session = TriageSession::new(DraftMode::Auto);

        session
            .analyze(&backend, PresetKey::Billing, "How do invoices work?", 0.6)
            .await
            .unwrap();

        assert!(backend.draft_calls().is_empty());
        assert!(session.triage().is_some());
        assert!(session.draft().is_none());
    }

    #[tokio::test]
    async fn manual_mode_never_auto_drafts() {
        let backend = ScriptedBackend::new()
            .on_analyze(|_| Ok(analyzed("P1")))
            .on_draft(|_| Ok(drafted("unused")));
        let mut session = TriageSession::new(DraftMode::Manual);

        session
            .analyze(&backend, PresetKey::AuthIncident, "Login broken", 0.6)
            .await
            .unwrap();
        assert!(backend.draft_calls().is_empty());

        let outcome = session.request_draft(&backend).await.unwrap();
        assert_eq!(outcome, Outcome::Accepted);
        assert_eq!(backend.draft_calls().len(), 1);
        assert_eq!(session.draft_trigger(), Some(DraftTrigger::Manual));
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_any_call() {
        let backend = ScriptedBackend::new();
        let mut session = TriageSession::new(DraftMode::Auto);

        let err = session
            .analyze(&backend, PresetKey::SaasSupport, " \n\t ", 0.6)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::EmptyText);
        assert!(backend.analyze_calls().is_empty());
    }

    #[tokio::test]
    async fn draft_requires_triage() {
        let backend = ScriptedBackend::new();
        let mut session = TriageSession::new(DraftMode::Manual);
        assert_eq!(
            session.request_draft(&backend).await.unwrap_err(),
            SessionError::NoTriage
        );
        assert!(backend.draft_calls().is_empty());
    }

    #[tokio::test]
    async fn analyze_failure_is_recorded() {
        let backend = ScriptedBackend::new().on_analyze(|_| Err(upstream("model unavailable")));
        let mut session = TriageSession::new(DraftMode::Auto);

        let outcome = session
            .analyze(&backend, PresetKey::SaasSupport, "Kafka 403", 0.6)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(
            session.analyze_error().unwrap().user_message(),
            "model unavailable"
        );
        assert!(session.triage().is_none());
        assert!(backend.draft_calls().is_empty());
    }

    #[tokio::test]
    async fn draft_failure_keeps_triage() {
        let backend = ScriptedBackend::new()
            .on_analyze(|_| Ok(analyzed("P0")))
            .on_draft(|_| Err(upstream("draft model overloaded")));
        let mut session = TriageSession::new(DraftMode::Auto);

        let outcome = session
            .analyze(&backend, PresetKey::AuthIncident, "Outage", 0.6)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Accepted);
        assert_eq!(session.triage(), Some(&analyzed("P0")));
        assert!(session.analyze_error().is_none());
        assert_eq!(
            session.draft_error().unwrap().user_message(),
            "draft model overloaded"
        );
    }

    #[tokio::test]
    async fn redraft_overwrites_previous_draft() {
        let counter = std::sync::atomic::AtomicUsize::new(0);
        let backend = ScriptedBackend::new()
            .on_analyze(|_| Ok(analyzed("P3")))
            .on_draft(move |_| {
                let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(drafted(&format!("draft #{n}")))
            });
        let mut session = TriageSession::new(DraftMode::Auto);
        session
            .analyze(&backend, PresetKey::SaasSupport, "How to rotate keys?", 0.6)
            .await
            .unwrap();

        session.request_draft(&backend).await.unwrap();
        session.request_draft(&backend).await.unwrap();
        assert_eq!(session.draft().unwrap().draft, "draft #1");
        assert_eq!(backend.draft_calls().len(), 2);
    }

    #[test]
    fn superseded_analyze_is_discarded() {
        let mut session = TriageSession::new(DraftMode::Manual);
        let first = session.begin_analyze("first ticket").unwrap();
        let second = session.begin_analyze("second ticket").unwrap();
        assert!(first < second);

        assert_eq!(
            session.finish_analyze(second, Ok(analyzed("P2"))),
            Outcome::Accepted
        );
        assert_eq!(
            session.finish_analyze(first, Err(upstream("late failure"))),
            Outcome::Stale
        );
        assert!(session.analyze_error().is_none());
        assert_eq!(session.text(), Some("second ticket"));
    }

    #[test]
    fn new_analyze_orphans_inflight_draft() {
        let mut session =
            TriageSession::with_triage(DraftMode::Manual, "old ticket", analyzed("P1")).unwrap();
        let (draft_seq, request) = session.begin_draft(DraftTrigger::Manual).unwrap();
        assert_eq!(request.text, "old ticket");

        let analyze_seq = session.begin_analyze("new ticket").unwrap();
        assert_eq!(
            session.finish_draft(draft_seq, Ok(drafted("for the old ticket"))),
            Outcome::Stale
        );
        assert!(session.draft().is_none());

        session.finish_analyze(analyze_seq, Ok(analyzed("P3")));
        assert_eq!(session.text(), Some("new ticket"));
    }

    #[test]
    fn older_draft_is_discarded() {
        let mut session =
            TriageSession::with_triage(DraftMode::Manual, "ticket", analyzed("P0")).unwrap();
        let (older, _) = session.begin_draft(DraftTrigger::Manual).unwrap();
        let (newer, _) = session.begin_draft(DraftTrigger::Manual).unwrap();

        assert_eq!(
            session.finish_draft(newer, Ok(drafted("newer"))),
            Outcome::Accepted
        );
        assert_eq!(
            session.finish_draft(older, Ok(drafted("older"))),
            Outcome::Stale
        );
        assert_eq!(session.draft().unwrap().draft, "newer");
    }

    #[test]
    fn auto_draft_due_follows_mode_and_priority() {
        let mut session = TriageSession::new(DraftMode::Auto);
        let seq = session.begin_analyze("SSO is down").unwrap();
        assert!(!session.auto_draft_due());
        session.finish_analyze(seq, Ok(analyzed("P0")));
        assert!(session.auto_draft_due());

        let (_, request) = session.begin_draft(DraftTrigger::Auto).unwrap();
        assert_eq!(request.text, "SSO is down");
        assert!(!session.auto_draft_due());

        let mut manual = TriageSession::new(DraftMode::Manual);
        let seq = manual.begin_analyze("SSO is down").unwrap();
        manual.finish_analyze(seq, Ok(analyzed("P0")));
        assert!(!manual.auto_draft_due());

        let mut routine = TriageSession::new(DraftMode::Auto);
        let seq = routine.begin_analyze("How do I export data?").unwrap();
        routine.finish_analyze(seq, Ok(analyzed("P2")));
        assert!(!routine.auto_draft_due());
    }

    #[test]
    fn with_triage_rejects_blank_text() {
        assert_eq!(
            TriageSession::with_triage(DraftMode::Auto, "   ", analyzed("P0")).err(),
            Some(SessionError::EmptyText)
        );
    }
}
