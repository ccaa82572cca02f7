//! # Prometheus Metrics
//!
//! Exposes catalog service metrics in the Prometheus text exposition format.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `catalog_http_request_duration_seconds` | Histogram | `method`, `path` | Request latency |
//! | `catalog_mutations_total` | Counter | `entity`, `action` | Successful creates, updates, deletes |
//!
//! The `/metrics` endpoint renders the current registry state on each scrape.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Label set for request latency. `path` is normalized so record ids do not
/// create one series per record.
#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct HttpLabel {
    pub method: String,
    pub path: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct MutationLabel {
    pub entity: String,
    pub action: String,
}

type HistogramFamily = Family<HttpLabel, Histogram, fn() -> Histogram>;

fn request_histogram() -> Histogram {
    Histogram::new(exponential_buckets(0.001, 2.0, 14))
}

/// Metrics registry shared by all request handlers.
pub struct Metrics {
    pub registry: Registry,
    pub http_request_duration: HistogramFamily,
    pub mutations: Family<MutationLabel, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_request_duration: HistogramFamily =
            Family::new_with_constructor(request_histogram as fn() -> Histogram);
        registry.register(
            "catalog_http_request_duration_seconds",
            "HTTP request latency by method and normalized path",
            http_request_duration.clone(),
        );

        let mutations = Family::<MutationLabel, Counter>::default();
        registry.register(
            "catalog_mutations",
            "Successful catalog writes by entity and action",
            mutations.clone(),
        );

        Self {
            registry,
            http_request_duration,
            mutations,
        }
    }

    /// Count one successful write, e.g. `("problem", "update")`.
    pub fn record_mutation(&self, entity: &str, action: &str) {
        self.mutations
            .get_or_create(&MutationLabel {
                entity: entity.to_string(),
                action: action.to_string(),
            })
            .inc();
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        encode(&mut buf, &self.registry).expect("encoding metrics should not fail");
        buf
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
