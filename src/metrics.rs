use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize Prometheus recorder, register series descriptions and
    /// expose a static gauge with the configured per-branch fan-out deadline.
    pub fn init(branch_timeout_ms: u64) -> Self {
        // Use default buckets to avoid API differences across crate versions.
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        // Descriptions must land after the recorder is installed, or the
        // exported series lose their HELP text.
        describe_counter!("provider_errors_total", "Provider fetch/parse errors.");
        describe_counter!(
            "provider_timeouts_total",
            "Provider calls cancelled by the per-branch deadline."
        );
        describe_counter!("search_requests_total", "Aggregated search requests served.");
        describe_counter!(
            "ai_fallback_total",
            "AI calls replaced by deterministic fallback content."
        );
        describe_histogram!("provider_fetch_ms", "Provider fetch time in milliseconds.");

        gauge!("search_branch_timeout_ms").set(branch_timeout_ms as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
