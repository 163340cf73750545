//! heartbeat-api — HTTP adapters for the heartbeat service.
//!
//! Registration and evaluation live on separate routers so they can be bound
//! to separate listeners; [`combined_router`] serves both from one socket.
//!
//! # Read routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/heartbeats/{id}?ttl=30s` | Evaluate a heartbeat (`ttl` only under the implicit model) |
//! | GET | `/healthz` | Liveness of this process |
//!
//! # Write routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | PUT | `/heartbeats/{id}` | Register with a JSON body |
//! | POST | `/heartbeats/{id}?expiry=30s&label=web` | Register from query parameters |
//! | DELETE | `/heartbeats/{id}` | Purge one heartbeat |
//! | POST | `/purge` | Purge every expired heartbeat (explicit model) |
//! | GET | `/healthz` | Liveness of this process |
//!
//! Validation errors map to 400, missing or expired heartbeats to 404 and
//! storage failures to 500.

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use heartbeat_liveness::HeartbeatService;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub service: HeartbeatService,
}

/// Read-only router: evaluation and health.
pub fn read_router(service: HeartbeatService) -> Router {
    Router::new()
        .route("/heartbeats/{id}", get(handlers::evaluate_heartbeat))
        .route("/healthz", get(handlers::healthz))
        .with_state(ApiState { service })
}

/// Write router: registration and purge.
pub fn write_router(service: HeartbeatService) -> Router {
    Router::new()
        .route(
            "/heartbeats/{id}",
            post(handlers::ping_heartbeat)
                .put(handlers::register_heartbeat)
                .delete(handlers::purge_heartbeat),
        )
        .route("/purge", post(handlers::purge_expired))
        .route("/healthz", get(handlers::healthz))
        .with_state(ApiState { service })
}

/// Both route sets on one router, for single-listener deployments.
pub fn combined_router(service: HeartbeatService) -> Router {
    Router::new()
        .route(
            "/heartbeats/{id}",
            get(handlers::evaluate_heartbeat)
                .post(handlers::ping_heartbeat)
                .put(handlers::register_heartbeat)
                .delete(handlers::purge_heartbeat),
        )
        .route("/purge", post(handlers::purge_expired))
        .route("/healthz", get(handlers::healthz))
        .with_state(ApiState { service })
}
