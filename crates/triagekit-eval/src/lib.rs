//! Evaluation harness: replay golden tickets against the triage service and
//! report routing accuracy, output stability and latency.

mod error;
pub mod golden;
pub mod metrics;
pub mod report;
pub mod runner;

pub use error::EvalError;
pub use golden::{ExpectedRouting, GoldenTicket, load_golden};
pub use metrics::{EvalMetrics, LatencySummary, StabilityResult, ThresholdAccuracy, percentile};
pub use report::render_markdown;
pub use runner::{EvalConfig, run_correctness, run_evaluation, run_latency, run_stability};
