//! Evaluation metrics and their summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timing keys reported by the service, in report order.
pub const LATENCY_KEYS: &[&str] = &["entities", "severity", "intent", "extract_json", "total"];

/// Routing accuracy over all golden tickets at one entity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAccuracy {
    pub total: usize,
    pub correct_next_queue: usize,
    pub correct_priority: usize,
    pub correct_both: usize,
    pub accuracy_next_queue_pct: f64,
    pub accuracy_priority_pct: f64,
    pub accuracy_both_pct: f64,
}

impl ThresholdAccuracy {
    pub fn from_counts(
        total: usize,
        correct_next_queue: usize,
        correct_priority: usize,
        correct_both: usize,
    ) -> Self {
        Self {
            total,
            correct_next_queue,
            correct_priority,
            correct_both,
            accuracy_next_queue_pct: pct(correct_next_queue, total),
            accuracy_priority_pct: pct(correct_priority, total),
            accuracy_both_pct: pct(correct_both, total),
        }
    }
}

/// Percentage rounded to one decimal; 0 for an empty set.
fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (1000.0 * count as f64 / total as f64).round() / 10.0
}

/// Whether repeated runs of the same ticket produced identical routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityResult {
    pub passed: bool,
    pub runs_per_ticket: usize,
    pub tickets_checked: usize,
    pub output_stability_pct: f64,
}

/// Everything one evaluation run measured.
///
/// Serialises to the same shape the metrics report is generated from, so a
/// saved JSON file can be re-rendered later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalMetrics {
    /// Keyed by the threshold as written, e.g. `"0.75"`.
    pub correctness: BTreeMap<String, ThresholdAccuracy>,
    pub stability: Option<StabilityResult>,
    /// Raw `timings_ms` object per analyzed ticket.
    pub latency: Vec<Map<String, Value>>,
    pub thresholds: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySummary {
    pub key: &'static str,
    pub count: usize,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub max: f64,
}

impl EvalMetrics {
    /// Correctness entries ordered by numeric threshold.
    pub fn correctness_by_threshold(&self) -> Vec<(&str, &ThresholdAccuracy)> {
        let mut rows: Vec<_> = self
            .correctness
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        rows.sort_by(|a, b| {
            let x = a.0.parse::<f64>().unwrap_or(f64::MAX);
            let y = b.0.parse::<f64>().unwrap_or(f64::MAX);
            x.total_cmp(&y)
        });
        rows
    }

    /// Per-key latency statistics. Keys without any numeric sample are skipped.
    pub fn latency_summaries(&self) -> Vec<LatencySummary> {
        LATENCY_KEYS
            .iter()
            .filter_map(|&key| {
                let mut values = self.samples(key);
                if values.is_empty() {
                    return None;
                }
                values.sort_by(f64::total_cmp);
                let count = values.len();
                Some(LatencySummary {
                    key,
                    count,
                    mean: values.iter().sum::<f64>() / count as f64,
                    p50: percentile(&values, 50.0),
                    p95: percentile(&values, 95.0),
                    max: values[count - 1],
                })
            })
            .collect()
    }

    /// Mean of `timings_ms.total` across all samples.
    pub fn average_total_ms(&self) -> Option<f64> {
        let totals = self.samples("total");
        if totals.is_empty() {
            None
        } else {
            Some(totals.iter().sum::<f64>() / totals.len() as f64)
        }
    }

    fn samples(&self, key: &str) -> Vec<f64> {
        self.latency
            .iter()
            .filter_map(|timings| timings.get(key).and_then(Value::as_f64))
            .collect()
    }
}

/// Percentile of an ascending slice, interpolating linearly between the two
/// closest ranks. Empty input gives 0.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let k = (sorted.len() - 1) as f64 * (p / 100.0);
    let f = k as usize;
    let c = if f + 1 < sorted.len() { f + 1 } else { f };
    sorted[f] + (k - f as f64) * (sorted[c] - sorted[f])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timings(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn percentile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&values, 50.0), 25.0);
        assert_eq!(percentile(&values, 0.0), 10.0);
        assert_eq!(percentile(&values, 100.0), 40.0);
        assert!((percentile(&values, 95.0) - 38.5).abs() < 1e-9);
    }

    #[test]
    fn percentile_edge_cases() {
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
    }

    #[test]
    fn accuracy_rounds_to_one_decimal() {
        let acc = ThresholdAccuracy::from_counts(45, 40, 38, 37);
        assert_eq!(acc.accuracy_next_queue_pct, 88.9);
        assert_eq!(acc.accuracy_priority_pct, 84.4);
        assert_eq!(acc.accuracy_both_pct, 82.2);

        let empty = ThresholdAccuracy::from_counts(0, 0, 0, 0);
        assert_eq!(empty.accuracy_both_pct, 0.0);
    }

    #[test]
    fn latency_summaries_skip_missing_keys() {
        let metrics = EvalMetrics {
            latency: vec![
                timings(json!({"entities": 10.0, "total": 100.0})),
                timings(json!({"entities": 30.0, "total": 300.0, "intent": "n/a"})),
                timings(json!({})),
            ],
            ..Default::default()
        };
        let summaries = metrics.latency_summaries();
        let keys: Vec<&str> = summaries.iter().map(|s| s.key).collect();
        assert_eq!(keys, ["entities", "total"]);

        let total = &summaries[1];
        assert_eq!(total.count, 2);
        assert_eq!(total.mean, 200.0);
        assert_eq!(total.p50, 200.0);
        assert_eq!(total.max, 300.0);
        assert_eq!(metrics.average_total_ms(), Some(200.0));
    }

    #[test]
    fn correctness_sorted_numerically() {
        let mut metrics = EvalMetrics::default();
        for th in ["0.75", "0.5", "0.6"] {
            metrics
                .correctness
                .insert(th.to_string(), ThresholdAccuracy::from_counts(1, 1, 1, 1));
        }
        let order: Vec<&str> = metrics
            .correctness_by_threshold()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(order, ["0.5", "0.6", "0.75"]);
    }

    #[test]
    fn metrics_json_shape() {
        let mut metrics = EvalMetrics {
            thresholds: vec![0.6],
            ..Default::default()
        };
        metrics
            .correctness
            .insert("0.6".into(), ThresholdAccuracy::from_counts(2, 2, 1, 1));
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["correctness"]["0.6"]["correct_priority"], 1);
        assert_eq!(json["correctness"]["0.6"]["accuracy_both_pct"], 50.0);
        assert!(json["stability"].is_null());
    }
}
