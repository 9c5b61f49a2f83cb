//! `triagekit eval`: replay golden tickets and write the metrics report.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use triagekit_client::TriageBackend;
use triagekit_eval::{EvalConfig, EvalMetrics, load_golden, render_markdown, run_evaluation};

pub struct EvalOptions {
    pub golden: PathBuf,
    pub out: PathBuf,
    pub json: Option<PathBuf>,
    /// Overrides the default threshold sweep when non-empty.
    pub thresholds: Vec<f64>,
}

pub async fn run<B>(backend: &B, options: &EvalOptions) -> anyhow::Result<EvalMetrics>
where
    B: TriageBackend + ?Sized,
{
    let start = Instant::now();
    let tickets = load_golden(&options.golden)?;
    eprintln!(
        "  Loaded {} golden tickets from {}",
        tickets.len(),
        options.golden.display()
    );

    let mut config = EvalConfig::default();
    if !options.thresholds.is_empty() {
        config.thresholds = options.thresholds.clone();
    }

    let metrics = run_evaluation(backend, &tickets, &config)
        .await
        .context("evaluation aborted")?;

    let report = render_markdown(&metrics, &tickets, chrono::Utc::now());
    std::fs::write(&options.out, report)
        .with_context(|| format!("writing {}", options.out.display()))?;
    eprintln!("  Wrote {}", options.out.display());

    if let Some(path) = &options.json {
        let json = serde_json::to_string_pretty(&metrics)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        eprintln!("  Wrote {}", path.display());
    }

    for (threshold, accuracy) in metrics.correctness_by_threshold() {
        eprintln!(
            "  threshold {threshold}: both correct {}/{} ({}%)",
            accuracy.correct_both, accuracy.total, accuracy.accuracy_both_pct
        );
    }
    if let Some(stability) = &metrics.stability {
        eprintln!(
            "  stability: {}",
            if stability.passed { "PASS" } else { "FAIL" }
        );
    }
    eprintln!("  Done in {:.1}s", start.elapsed().as_secs_f64());

    Ok(metrics)
}
