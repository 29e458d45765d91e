//! custex-api — HTTP exposition for the custom script exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Prometheus exposition of the published gauge set |
//! | GET | `/healthz` | Liveness plus the current publish generation |

pub mod handlers;

use axum::Router;
use axum::routing::get;
use custex_metrics::Publisher;

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub publisher: Publisher,
}

/// Build the exporter router.
pub fn build_router(publisher: Publisher) -> Router {
    let state = ApiState { publisher };

    Router::new()
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
