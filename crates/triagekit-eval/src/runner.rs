//! Replays golden tickets through a [`TriageBackend`].
//!
//! Calls are strictly sequential, one ticket at a time, so latency numbers
//! are not skewed by the harness competing with itself.

use serde_json::{Map, Value};
use tracing::info;
use triagekit_client::TriageBackend;
use triagekit_core::{AnalyzeResult, build_payload};

use crate::EvalError;
use crate::golden::GoldenTicket;
use crate::metrics::{EvalMetrics, StabilityResult, ThresholdAccuracy};

#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    /// Entity thresholds to measure routing accuracy at.
    pub thresholds: Vec<f64>,
    /// Threshold used for the stability and latency passes.
    pub reference_threshold: f64,
    pub stability_runs: usize,
    /// Golden ticket indices replayed for stability; out-of-range ones are skipped.
    pub stability_indices: Vec<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![0.5, 0.6, 0.7, 0.75],
            reference_threshold: 0.6,
            stability_runs: 10,
            stability_indices: vec![0, 5, 10, 20, 30],
        }
    }
}

async fn analyze_ticket<B>(
    backend: &B,
    index: usize,
    ticket: &GoldenTicket,
    threshold: f64,
) -> Result<AnalyzeResult, EvalError>
where
    B: TriageBackend + ?Sized,
{
    let request = build_payload(ticket.preset, &ticket.text, threshold);
    backend
        .analyze(&request)
        .await
        .map_err(|source| EvalError::Analyze { index, source })
}

/// Routing accuracy of `next_queue` and `priority` at one threshold.
pub async fn run_correctness<B>(
    backend: &B,
    tickets: &[GoldenTicket],
    threshold: f64,
) -> Result<ThresholdAccuracy, EvalError>
where
    B: TriageBackend + ?Sized,
{
    let (mut next_queue, mut priority, mut both) = (0, 0, 0);
    for (index, ticket) in tickets.iter().enumerate() {
        let result = analyze_ticket(backend, index, ticket, threshold).await?;
        let expected = &ticket.expected_routing;
        let queue_ok = result.next_queue() == Some(expected.next_queue.as_str());
        let priority_ok = result.priority() == Some(expected.priority.as_str());
        next_queue += usize::from(queue_ok);
        priority += usize::from(priority_ok);
        both += usize::from(queue_ok && priority_ok);
    }
    let accuracy = ThresholdAccuracy::from_counts(tickets.len(), next_queue, priority, both);
    info!(
        threshold,
        total = accuracy.total,
        both_pct = accuracy.accuracy_both_pct,
        "correctness pass complete"
    );
    Ok(accuracy)
}

/// Replay selected tickets `runs` times each and check routing never changes.
pub async fn run_stability<B>(
    backend: &B,
    tickets: &[GoldenTicket],
    config: &EvalConfig,
) -> Result<StabilityResult, EvalError>
where
    B: TriageBackend + ?Sized,
{
    let mut all_identical = true;
    let mut checked = 0;
    for &index in &config.stability_indices {
        let Some(ticket) = tickets.get(index) else {
            continue;
        };
        checked += 1;
        let mut first: Option<Value> = None;
        for _ in 0..config.stability_runs {
            let result = analyze_ticket(backend, index, ticket, config.reference_threshold).await?;
            let routing = result.routing().cloned().unwrap_or(Value::Null);
            let seen = first.get_or_insert_with(|| routing.clone());
            if *seen != routing {
                all_identical = false;
            }
        }
    }
    info!(passed = all_identical, tickets = checked, "stability pass complete");
    Ok(StabilityResult {
        passed: all_identical,
        runs_per_ticket: config.stability_runs,
        tickets_checked: checked,
        output_stability_pct: if all_identical { 100.0 } else { 0.0 },
    })
}

/// Collect `timings_ms` for every ticket.
pub async fn run_latency<B>(
    backend: &B,
    tickets: &[GoldenTicket],
    threshold: f64,
) -> Result<Vec<Map<String, Value>>, EvalError>
where
    B: TriageBackend + ?Sized,
{
    let mut samples = Vec::with_capacity(tickets.len());
    for (index, ticket) in tickets.iter().enumerate() {
        let result = analyze_ticket(backend, index, ticket, threshold).await?;
        samples.push(result.timings().cloned().unwrap_or_default());
    }
    info!(samples = samples.len(), "latency pass complete");
    Ok(samples)
}

/// Run all three passes. The first analyze failure aborts the evaluation.
pub async fn run_evaluation<B>(
    backend: &B,
    tickets: &[GoldenTicket],
    config: &EvalConfig,
) -> Result<EvalMetrics, EvalError>
where
    B: TriageBackend + ?Sized,
{
    let mut metrics = EvalMetrics {
        thresholds: config.thresholds.clone(),
        ..Default::default()
    };
    for &threshold in &config.thresholds {
        let accuracy = run_correctness(backend, tickets, threshold).await?;
        metrics.correctness.insert(threshold.to_string(), accuracy);
    }
    metrics.stability = Some(run_stability(backend, tickets, config).await?);
    metrics.latency = run_latency(backend, tickets, config.reference_threshold).await?;
    Ok(metrics)
}
