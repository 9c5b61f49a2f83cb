//! Markdown metrics report.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use triagekit_core::estimate_cost;

use crate::golden::GoldenTicket;
use crate::metrics::{EvalMetrics, ThresholdAccuracy};

/// Draft token counts assumed for the cost section (typical short reply).
const TYPICAL_DRAFT_TOKENS_IN: u64 = 500;
const TYPICAL_DRAFT_TOKENS_OUT: u64 = 100;

/// Render the evaluation as a markdown report.
pub fn render_markdown(
    metrics: &EvalMetrics,
    tickets: &[GoldenTicket],
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Support Triage - Metrics Report");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Generated {} from {} golden tickets.",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        tickets.len()
    );

    section(&mut out, "1. Routing accuracy (by entity threshold)");
    let _ = writeln!(
        out,
        "| Threshold | Next queue correct | Priority correct | Both correct |"
    );
    let _ = writeln!(
        out,
        "|-----------|--------------------|-------------------|--------------|"
    );
    for (threshold, c) in metrics.correctness_by_threshold() {
        let _ = writeln!(
            out,
            "| {threshold} | {}/{} ({}%) | {}/{} ({}%) | {}/{} ({}%) |",
            c.correct_next_queue,
            c.total,
            c.accuracy_next_queue_pct,
            c.correct_priority,
            c.total,
            c.accuracy_priority_pct,
            c.correct_both,
            c.total,
            c.accuracy_both_pct,
        );
    }

    section(&mut out, "2. Output stability (determinism)");
    match &metrics.stability {
        Some(s) => {
            let verdict = if s.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(out, "- **Result:** {verdict}");
            let _ = writeln!(
                out,
                "- Same ticket run **{}** times for **{}** tickets; routing compared across runs.",
                s.runs_per_ticket, s.tickets_checked
            );
            let _ = writeln!(out, "- **Output stability: {}%**", s.output_stability_pct);
        }
        None => {
            let _ = writeln!(out, "No stability data.");
        }
    }

    section(&mut out, "3. Latency (triage)");
    let summaries = metrics.latency_summaries();
    if summaries.is_empty() {
        let _ = writeln!(out, "No latency data.");
    } else {
        let _ = writeln!(out, "| Metric | Mean (ms) | p50 (ms) | p95 (ms) | Max (ms) |");
        let _ = writeln!(out, "|--------|-----------|----------|----------|----------|");
        for s in &summaries {
            let _ = writeln!(
                out,
                "| {} | {:.0} | {:.0} | {:.0} | {:.0} |",
                s.key, s.mean, s.p50, s.p95, s.max
            );
        }
        if let Some(avg) = metrics.average_total_ms() {
            let _ = writeln!(out);
            let _ = writeln!(out, "**Average total triage time:** {avg:.0} ms per ticket.");
        }
    }

    section(&mut out, "4. Cost comparison (hybrid vs all-model)");
    let avg_len = if tickets.is_empty() {
        0
    } else {
        tickets
            .iter()
            .map(|t| t.text.encode_utf16().count())
            .sum::<usize>()
            / tickets.len()
    };
    let cost = estimate_cost(TYPICAL_DRAFT_TOKENS_IN, TYPICAL_DRAFT_TOKENS_OUT, avg_len);
    let _ = writeln!(
        out,
        "- **Triage:** structured extraction runs in the triage service, no generative tokens."
    );
    let _ = writeln!(
        out,
        "- **Draft (assumed):** {TYPICAL_DRAFT_TOKENS_IN} input / {TYPICAL_DRAFT_TOKENS_OUT} output tokens per ticket."
    );
    let _ = writeln!(
        out,
        "- **Hybrid:** ${:.4} per 1k tickets; **all-model:** ${:.4} per 1k tickets (avg ticket {avg_len} chars).",
        cost.hybrid_per_1k, cost.all_model_per_1k
    );
    let _ = writeln!(out, "- **Savings:** ~{}%", cost.savings_pct);

    section(&mut out, "5. Summary");
    match &metrics.stability {
        Some(s) if s.passed => {
            let _ = writeln!(
                out,
                "- **Deterministic:** {}% output stability for repeated runs.",
                s.output_stability_pct
            );
        }
        Some(_) => {
            let _ = writeln!(out, "- **Not deterministic:** routing changed between repeated runs.");
        }
        None => {}
    }
    if let Some(avg) = metrics.average_total_ms() {
        let _ = writeln!(out, "- **Fast:** {avg:.0} ms average triage per ticket.");
    }
    let _ = writeln!(
        out,
        "- **Cost-effective:** no generative tokens for extraction/classification; the model only drafts (~{}% cheaper than all-model).",
        cost.savings_pct
    );
    if let Some((threshold, best)) = best_threshold(metrics) {
        let _ = writeln!(
            out,
            "- **Accurate:** best routing accuracy {}% (queue and priority both correct) at threshold {threshold}.",
            best.accuracy_both_pct
        );
    }

    out
}

/// Threshold with the highest both-correct accuracy; the lowest threshold wins ties.
fn best_threshold(metrics: &EvalMetrics) -> Option<(&str, &ThresholdAccuracy)> {
    metrics
        .correctness_by_threshold()
        .into_iter()
        .fold(None, |best, row| match best {
            Some((_, b)) if b.accuracy_both_pct >= row.1.accuracy_both_pct => best,
            _ => Some(row),
        })
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "---");
    let _ = writeln!(out);
    let _ = writeln!(out, "## {title}");
    let _ = writeln!(out);
}
