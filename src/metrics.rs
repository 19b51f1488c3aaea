//! Prometheus metrics for the KB service.
//!
//! Counters are defined lazily and are safe to increment before
//! [`init_metrics`] runs; registration only controls what `/metrics`
//! exposes.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Documents created through the API
    pub static ref KB_DOCS_CREATED: Counter = Counter::with_opts(
        Opts::new("kb_docs_created_total", "Total number of KB documents created")
            .namespace("assist_fusion"),
    )
    .expect("metric definition");

    /// Documents updated through the API
    pub static ref KB_DOCS_UPDATED: Counter = Counter::with_opts(
        Opts::new("kb_docs_updated_total", "Total number of KB documents updated")
            .namespace("assist_fusion"),
    )
    .expect("metric definition");

    /// Documents deleted through the API
    pub static ref KB_DOCS_DELETED: Counter = Counter::with_opts(
        Opts::new("kb_docs_deleted_total", "Total number of KB documents deleted")
            .namespace("assist_fusion"),
    )
    .expect("metric definition");

    /// Search requests served
    pub static ref KB_SEARCH_REQUESTS: Counter = Counter::with_opts(
        Opts::new("kb_search_requests_total", "Total number of KB search requests")
            .namespace("assist_fusion"),
    )
    .expect("metric definition");

    /// Search items returned across all requests
    pub static ref KB_SEARCH_HITS: Counter = Counter::with_opts(
        Opts::new("kb_search_hits_total", "Total number of KB search items returned")
            .namespace("assist_fusion"),
    )
    .expect("metric definition");

    /// HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("assist_fusion"),
        &["method", "path", "status_code"],
    )
    .expect("metric definition");
}

/// Register all metrics with the global registry.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(KB_DOCS_CREATED.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(KB_DOCS_UPDATED.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(KB_DOCS_DELETED.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(KB_SEARCH_REQUESTS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(KB_SEARCH_HITS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    Ok(())
}

/// Render the registry in Prometheus text exposition format.
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    encoder.encode_to_string(&PROMETHEUS_REGISTRY.gather())
}

/// Request-counting middleware. Labels carry the matched route pattern,
/// not the raw path.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), &path, response.status().as_str()])
        .inc();
    response
}
