//! Route handlers. Both are read-only views of the publisher.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use tracing::trace;

use custex_metrics::prometheus::CONTENT_TYPE;

use crate::ApiState;

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let snapshot = state.publisher.snapshot().await;
    trace!(generation = snapshot.generation(), series = snapshot.len(), "scrape");
    let body = custex_metrics::render_prometheus(state.publisher.family(), &snapshot);
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}

/// GET /healthz
pub async fn healthz(State(state): State<ApiState>) -> impl IntoResponse {
    let snapshot = state.publisher.snapshot().await;
    format!("ok generation={}\n", snapshot.generation())
}
