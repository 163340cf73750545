//! HTTP handlers.
//!
//! Each handler calls into `HeartbeatService` and maps its outcome onto a
//! status code and a JSON envelope.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use heartbeat_core::parse_ttl;
use heartbeat_liveness::{RegisterInput, ServiceError};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

fn service_error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
        ServiceError::NotFoundOrExpired => StatusCode::NOT_FOUND,
        ServiceError::Storage(e) => {
            warn!(error = %e, "heartbeat storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(&err.to_string(), status)
}

/// Parse an optional duration parameter. An empty value counts as absent.
fn duration_param(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<Duration>, ServiceError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_ttl(s)
            .map(Some)
            .map_err(|e| ServiceError::validation(field, e.to_string())),
        None => Ok(None),
    }
}

// ── Evaluation ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct EvaluateQuery {
    pub ttl: Option<String>,
}

/// GET /heartbeats/{id}
pub async fn evaluate_heartbeat(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<EvaluateQuery>,
) -> Response {
    let result = duration_param("ttl", query.ttl.as_deref())
        .and_then(|ttl| state.service.evaluate(&id, ttl));
    match result {
        Ok(view) => ApiResponse::ok(view).into_response(),
        Err(e) => service_error_response(e),
    }
}

// ── Registration ───────────────────────────────────────────────

/// JSON body of `PUT /heartbeats/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    /// TTL relative to now, e.g. `"30s"`.
    pub expiry: Option<String>,
    /// Absolute RFC 3339 expiry.
    pub expires_at: Option<String>,
    pub label: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Query parameters of `POST /heartbeats/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct PingQuery {
    pub expiry: Option<String>,
    pub label: Option<String>,
}

impl RegisterRequest {
    fn into_input(self) -> Result<RegisterInput, ServiceError> {
        let after = duration_param("expiry", self.expiry.as_deref())?;
        let at = match self.expires_at.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(
                DateTime::parse_from_rfc3339(s)
                    .map_err(|e| ServiceError::validation("expires_at", e.to_string()))?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        let mut input = RegisterInput {
            label: self.label,
            metadata: self.metadata,
            ..Default::default()
        };
        input = match (after, at) {
            (Some(_), Some(_)) => {
                return Err(ServiceError::validation(
                    "expiry",
                    "give either expiry or expires_at, not both",
                ));
            }
            (Some(ttl), None) => input.expires_after(ttl),
            (None, Some(at)) => input.expires_at(at),
            (None, None) => input,
        };
        Ok(input)
    }
}

fn register(state: &ApiState, id: &str, request: RegisterRequest) -> Response {
    let result = request
        .into_input()
        .and_then(|input| state.service.register(id, input));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response(e),
    }
}

/// PUT /heartbeats/{id}
pub async fn register_heartbeat(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    register(&state, &id, request)
}

/// POST /heartbeats/{id}
pub async fn ping_heartbeat(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<PingQuery>,
) -> Response {
    let request = RegisterRequest {
        expiry: query.expiry,
        label: query.label,
        ..Default::default()
    };
    register(&state, &id, request)
}

// ── Purge ──────────────────────────────────────────────────────

/// DELETE /heartbeats/{id}
pub async fn purge_heartbeat(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    match state.service.purge(&id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => service_error_response(ServiceError::NotFoundOrExpired),
        Err(e) => service_error_response(e),
    }
}

/// POST /purge
pub async fn purge_expired(State(state): State<ApiState>) -> Response {
    match state.service.purge_expired() {
        Ok(purged) => ApiResponse::ok(serde_json::json!({ "purged": purged })).into_response(),
        Err(e) => service_error_response(e),
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    ApiResponse::ok("ok")
}
