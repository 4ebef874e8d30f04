//! Observability metrics for chat turns.
//!
//! Provides Prometheus-compatible metrics and a JSON snapshot for:
//! - Replies by kind (help, command, quiz answer, model, error...)
//! - Model request counts and latency
//! - Token usage reported by the model
//! - Achievements earned

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

const KIND_LABEL: &str = "kind";
const MODEL_LABEL: &str = "model";
const STATUS_LABEL: &str = "status";
const DIRECTION_LABEL: &str = "direction";
const LANG_LABEL: &str = "lang";

/// Metrics collector for the bot
pub struct MetricsCollector {
    registry: Registry,

    /// Replies by kind
    replies_total: IntCounterVec,

    /// Model requests by model and status
    model_requests_total: IntCounterVec,

    /// Model request duration in milliseconds
    model_duration_ms: HistogramVec,

    /// Tokens by model and direction (input/output)
    tokens_total: IntCounterVec,

    /// Achievements by language
    achievements_total: IntCounterVec,

    json_data: Arc<RwLock<MetricsSnapshot>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let registry = Registry::new();

        let replies_total = IntCounterVec::new(
            Opts::new("ecobear_replies_total", "Total replies by kind"),
            &[KIND_LABEL],
        )
        .expect("Failed to create replies counter");
        registry
            .register(Box::new(replies_total.clone()))
            .expect("Failed to register replies counter");

        let model_requests_total = IntCounterVec::new(
            Opts::new("ecobear_model_requests_total", "Total model requests"),
            &[MODEL_LABEL, STATUS_LABEL],
        )
        .expect("Failed to create model requests counter");
        registry
            .register(Box::new(model_requests_total.clone()))
            .expect("Failed to register model requests counter");

        let duration_opts = HistogramOpts::new(
            "ecobear_model_duration_ms",
            "Model request duration in milliseconds",
        )
        .buckets(vec![
            100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0,
        ]);
        let model_duration_ms = HistogramVec::new(duration_opts, &[MODEL_LABEL])
            .expect("Failed to create duration histogram");
        registry
            .register(Box::new(model_duration_ms.clone()))
            .expect("Failed to register duration histogram");

        let tokens_total = IntCounterVec::new(
            Opts::new("ecobear_tokens_total", "Total tokens processed"),
            &[MODEL_LABEL, DIRECTION_LABEL],
        )
        .expect("Failed to create tokens counter");
        registry
            .register(Box::new(tokens_total.clone()))
            .expect("Failed to register tokens counter");

        let achievements_total = IntCounterVec::new(
            Opts::new("ecobear_achievements_total", "Total carbon achievements earned"),
            &[LANG_LABEL],
        )
        .expect("Failed to create achievements counter");
        registry
            .register(Box::new(achievements_total.clone()))
            .expect("Failed to register achievements counter");

        Self {
            registry,
            replies_total,
            model_requests_total,
            model_duration_ms,
            tokens_total,
            achievements_total,
            json_data: Arc::new(RwLock::new(MetricsSnapshot::default())),
        }
    }

    pub fn record_reply(&self, kind: &str) {
        self.replies_total.with_label_values(&[kind]).inc();

        if let Ok(mut data) = self.json_data.write() {
            data.total_replies += 1;
            *data.replies_by_kind.entry(kind.to_string()).or_default() += 1;
        }
    }

    pub fn record_model_success(&self, model: &str, duration: Duration) {
        self.model_requests_total
            .with_label_values(&[model, "success"])
            .inc();
        self.model_duration_ms
            .with_label_values(&[model])
            .observe(millis(duration));

        if let Ok(mut data) = self.json_data.write() {
            data.model_requests += 1;
        }
    }

    pub fn record_model_failure(&self, model: &str, duration: Duration) {
        self.model_requests_total
            .with_label_values(&[model, "failure"])
            .inc();
        self.model_duration_ms
            .with_label_values(&[model])
            .observe(millis(duration));

        if let Ok(mut data) = self.json_data.write() {
            data.model_requests += 1;
            data.model_failures += 1;
        }
    }

    pub fn record_tokens(&self, model: &str, input_tokens: u64, output_tokens: u64) {
        self.tokens_total
            .with_label_values(&[model, "input"])
            .inc_by(input_tokens);
        self.tokens_total
            .with_label_values(&[model, "output"])
            .inc_by(output_tokens);

        if let Ok(mut data) = self.json_data.write() {
            data.total_input_tokens += input_tokens;
            data.total_output_tokens += output_tokens;
        }
    }

    pub fn record_achievement(&self, lang: &str) {
        self.achievements_total.with_label_values(&[lang]).inc();

        if let Ok(mut data) = self.json_data.write() {
            data.achievements += 1;
        }
    }

    /// Prometheus text exposition
    pub fn prometheus_metrics(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    pub fn json_snapshot(&self) -> MetricsSnapshot {
        self.json_data
            .read()
            .map(|data| data.clone())
            .unwrap_or_default()
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics for JSON export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub timestamp: i64,

    pub total_replies: u64,
    pub replies_by_kind: HashMap<String, u64>,

    pub model_requests: u64,
    pub model_failures: u64,

    pub total_input_tokens: u64,
    pub total_output_tokens: u64,

    pub achievements: u64,
}

impl MetricsSnapshot {
    pub fn with_timestamp(mut self) -> Self {
        self.timestamp = chrono::Utc::now().timestamp();
        self
    }
}

static METRICS: std::sync::OnceLock<MetricsCollector> = std::sync::OnceLock::new();

/// Get the global metrics collector
pub fn global() -> &'static MetricsCollector {
    METRICS.get_or_init(MetricsCollector::new)
}

pub fn record_reply(kind: &str) {
    global().record_reply(kind);
}

pub fn record_model_success(model: &str, duration: Duration) {
    global().record_model_success(model, duration);
}

pub fn record_model_failure(model: &str, duration: Duration) {
    global().record_model_failure(model, duration);
}

pub fn record_tokens(model: &str, input: u64, output: u64) {
    global().record_tokens(model, input, output);
}

pub fn record_achievement(lang: &str) {
    global().record_achievement(lang);
}

pub fn prometheus() -> String {
    global().prometheus_metrics()
}

pub fn snapshot() -> MetricsSnapshot {
    global().json_snapshot().with_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector() {
        let collector = MetricsCollector::new();

        collector.record_reply("model");
        collector.record_reply("model");
        collector.record_reply("command");
        collector.record_model_success("gemini-2.0-flash", Duration::from_millis(800));
        collector.record_model_failure("gemini-2.0-flash", Duration::from_millis(120));
        collector.record_tokens("gemini-2.0-flash", 40, 90);
        collector.record_achievement("en");

        let snapshot = collector.json_snapshot();
        assert_eq!(snapshot.total_replies, 3);
        assert_eq!(snapshot.replies_by_kind.get("model"), Some(&2));
        assert_eq!(snapshot.model_requests, 2);
        assert_eq!(snapshot.model_failures, 1);
        assert_eq!(snapshot.total_input_tokens, 40);
        assert_eq!(snapshot.total_output_tokens, 90);
        assert_eq!(snapshot.achievements, 1);

        let prom = collector.prometheus_metrics();
        assert!(prom.contains("ecobear_replies_total"));
        assert!(prom.contains("ecobear_model_duration_ms"));
        assert!(prom.contains("ecobear_achievements_total"));
    }

    #[test]
    fn test_duration_histogram_in_milliseconds() {
        let collector = MetricsCollector::new();
        collector.record_model_success("m", Duration::from_millis(300));

        let prom = collector.prometheus_metrics();
        // 300ms lands in the 500 bucket but not the 250 one
        assert!(prom.contains(r#"ecobear_model_duration_ms_bucket{model="m",le="250"} 0"#));
        assert!(prom.contains(r#"ecobear_model_duration_ms_bucket{model="m",le="500"} 1"#));
    }

    #[test]
    fn test_snapshot_timestamp() {
        let snapshot = MetricsSnapshot::default().with_timestamp();
        assert!(snapshot.timestamp > 0);
    }
}
