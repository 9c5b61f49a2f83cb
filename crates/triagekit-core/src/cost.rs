//! Illustrative per-1000-ticket cost comparison.
//!
//! Compares the hybrid flow (local structured triage, generative model only
//! for the short draft) against a hypothetical flow where a generative model
//! does everything. The all-model baseline is a fixed heuristic: the ticket is
//! assumed to cost `ceil(len / 4) * 2.5` input tokens (ticket plus schema
//! context) and 150 output tokens. These constants are placeholders, kept
//! exactly so results stay comparable across versions.

use serde::Serialize;

use crate::triage::DraftResult;

/// USD per input token ($0.15 per 1M).
pub const PRICE_IN_PER_TOKEN: f64 = 0.15 / 1_000_000.0;
/// USD per output token ($0.60 per 1M).
pub const PRICE_OUT_PER_TOKEN: f64 = 0.60 / 1_000_000.0;

const TICKETS_PER_ESTIMATE: f64 = 1000.0;
const CHARS_PER_TOKEN: f64 = 4.0;
const BASELINE_CONTEXT_FACTOR: f64 = 2.5;
const BASELINE_OUTPUT_TOKENS: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    /// Hybrid cost in USD per 1000 tickets.
    pub hybrid_per_1k: f64,
    /// All-model cost in USD per 1000 tickets.
    pub all_model_per_1k: f64,
    /// Estimated input tokens per ticket for the all-model baseline.
    pub all_model_tokens_in: f64,
    pub savings_pct: i64,
}

/// Estimate costs from draft token counts and the ticket's length.
///
/// `text_len` counts UTF-16 code units, the unit browsers report for string
/// length, so estimates match the web UI exactly.
pub fn estimate_cost(tokens_in: u64, tokens_out: u64, text_len: usize) -> CostEstimate {
    let hybrid_per_1k = (tokens_in as f64 * PRICE_IN_PER_TOKEN
        + tokens_out as f64 * PRICE_OUT_PER_TOKEN)
        * TICKETS_PER_ESTIMATE;

    let all_model_tokens_in = (text_len as f64 / CHARS_PER_TOKEN).ceil() * BASELINE_CONTEXT_FACTOR;
    let all_model_per_1k = (all_model_tokens_in * PRICE_IN_PER_TOKEN
        + BASELINE_OUTPUT_TOKENS * PRICE_OUT_PER_TOKEN)
        * TICKETS_PER_ESTIMATE;

    let savings_pct = if all_model_per_1k > 0.0 {
        round_half_up((1.0 - hybrid_per_1k / all_model_per_1k) * 100.0)
    } else {
        0
    };

    CostEstimate {
        hybrid_per_1k,
        all_model_per_1k,
        all_model_tokens_in,
        savings_pct,
    }
}

impl CostEstimate {
    /// Estimate for a completed draft of `text`.
    pub fn for_draft(draft: &DraftResult, text: &str) -> Self {
        estimate_cost(draft.tokens_in, draft.tokens_out, text.encode_utf16().count())
    }
}

// Halves round towards +inf (2.5 -> 3, -2.5 -> -2), as the web UI does.
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}
