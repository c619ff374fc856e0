/*!
 * # Metrics Module
 *
 * Business counters for pricing and order settlement, kept in a process-wide
 * Prometheus registry and exposed in text format at `/metrics`.
 */

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Registry, TextEncoder};
use tracing::error;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ORDERS_CREATED: IntCounter =
        IntCounter::new("orders_created_total", "Total number of orders created")
            .expect("metric can be created");
    pub static ref ORDER_CREATION_FAILURES: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new(
            "order_creation_failures_total",
            "Total number of failed order creations"
        ),
        &["error_type"]
    )
    .expect("metric can be created");
    pub static ref ORDERS_CONFIRMED: IntCounter = IntCounter::new(
        "orders_confirmed_total",
        "Total number of orders confirmed after in-store payment"
    )
    .expect("metric can be created");
    pub static ref PRICING_FALLBACKS: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new(
            "pricing_fallbacks_total",
            "Times pricing fell back to a default or client-supplied value"
        ),
        &["kind"]
    )
    .expect("metric can be created");
}

/// Registers the business counters with [`REGISTRY`]. Safe to call repeatedly.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ORDERS_CREATED.clone()),
        Box::new(ORDER_CREATION_FAILURES.clone()),
        Box::new(ORDERS_CONFIRMED.clone()),
        Box::new(PRICING_FALLBACKS.clone()),
    ];
    for collector in collectors {
        // AlreadyReg on repeat calls is expected
        let _ = REGISTRY.register(collector);
    }
}

pub fn record_order_created() {
    ORDERS_CREATED.inc();
}

pub fn record_order_creation_failure(error_type: &str) {
    ORDER_CREATION_FAILURES
        .with_label_values(&[error_type])
        .inc();
}

pub fn record_order_confirmed() {
    ORDERS_CONFIRMED.inc();
}

/// `kind` is one of `gst_default`, `making_cost_absent`, `client_line_item`.
pub fn record_pricing_fallback(kind: &str) {
    PRICING_FALLBACKS.with_label_values(&[kind]).inc();
}

/// Renders every registered metric in the Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    register_metrics();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Handler for `GET /metrics`
pub async fn metrics_handler() -> Response {
    match render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_business_counters() {
        record_order_created();
        record_pricing_fallback("gst_default");
        record_order_creation_failure("database");

        let text = render().unwrap();
        assert!(text.contains("orders_created_total"));
        assert!(text.contains("pricing_fallbacks_total{kind=\"gst_default\"}"));
        assert!(text.contains("order_creation_failures_total{error_type=\"database\"}"));
    }

    #[test]
    fn register_is_idempotent() {
        register_metrics();
        register_metrics();
        assert!(render().is_ok());
    }
}
