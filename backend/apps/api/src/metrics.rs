//! Prometheus Metrics
//!
//! Process-wide registry exposed at `GET /metrics`.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("http_requests_total", "HTTP requests served"),
        &["method", "status"]
    )
    .expect("http_requests_total descriptor");
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "HTTP request latency"),
        &["method", "route"]
    )
    .expect("http_request_duration_seconds descriptor");
    pub static ref ADS_EXPIRED_TOTAL: IntCounter =
        IntCounter::new("ads_expired_total", "Advertisements expired by the sweeper")
            .expect("ads_expired_total descriptor");
    pub static ref ADS_CANCELLED_TOTAL: IntCounter =
        IntCounter::new("ads_cancelled_total", "Unpaid bookings cancelled by the sweeper")
            .expect("ads_cancelled_total descriptor");
}

/// Register every collector once at startup
pub fn register() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    REGISTRY.register(Box::new(ADS_EXPIRED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ADS_CANCELLED_TOTAL.clone()))?;
    Ok(())
}

/// Count and time every request. Unmatched paths share one label.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let started = Instant::now();
    let response = next.run(request).await;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), response.status().as_str()])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), route.as_str()])
        .observe(started.elapsed().as_secs_f64());

    response
}

/// GET /metrics
pub async fn metrics_handler() -> Response {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return AppError::internal("Failed to encode metrics").into_response();
    }

    ([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer).into_response()
}
