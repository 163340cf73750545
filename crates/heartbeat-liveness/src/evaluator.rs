//! Evaluator — decides whether a stored heartbeat is still valid.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::debug;

use heartbeat_core::FreshnessModel;
use heartbeat_state::{HeartbeatId, HeartbeatRecord};

use crate::error::{ServiceError, ServiceResult, validate_id};
use crate::service::HeartbeatService;

/// Public view of a valid heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeartbeatView {
    pub id: HeartbeatId,
    pub last_seen: DateTime<Utc>,
    /// Effective expiry the heartbeat was judged against.
    pub expiry: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl HeartbeatService {
    /// Evaluate the heartbeat for `id`.
    ///
    /// `ttl` must be given under the implicit model and omitted under the
    /// explicit one. A heartbeat evaluated exactly at its expiry is still
    /// valid.
    pub fn evaluate(&self, id: &str, ttl: Option<Duration>) -> ServiceResult<HeartbeatView> {
        validate_id(id)?;
        let ttl = match (self.model, ttl) {
            (FreshnessModel::Implicit, Some(ttl)) => Some(
                TimeDelta::from_std(ttl)
                    .map_err(|_| ServiceError::validation("ttl", "out of range"))?,
            ),
            (FreshnessModel::Implicit, None) => {
                return Err(ServiceError::validation("ttl", "ttl is required"));
            }
            (FreshnessModel::Explicit, Some(_)) => {
                return Err(ServiceError::validation(
                    "ttl",
                    "not accepted under the explicit model; the expiry is set at registration",
                ));
            }
            (FreshnessModel::Explicit, None) => None,
        };

        let Some(record) = self.store.get(id)? else {
            debug!(%id, "heartbeat not registered");
            return Err(ServiceError::NotFoundOrExpired);
        };

        let Some(expiry) = effective_expiry(&record, ttl) else {
            debug!(%id, model = %self.model, "heartbeat has no expiry under current model");
            return Err(ServiceError::NotFoundOrExpired);
        };

        let now = self.now();
        if now > expiry {
            debug!(%id, %expiry, "heartbeat expired");
            return Err(ServiceError::NotFoundOrExpired);
        }

        Ok(HeartbeatView {
            id: record.id,
            last_seen: record.last_seen,
            expiry,
            label: record.label,
            metadata: record.metadata,
        })
    }
}

/// `last_seen + ttl` when a TTL is supplied, otherwise the stored expiry.
/// An addition that overflows the calendar never expires.
fn effective_expiry(record: &HeartbeatRecord, ttl: Option<TimeDelta>) -> Option<DateTime<Utc>> {
    match ttl {
        Some(ttl) => Some(
            record
                .last_seen
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        ),
        None => record.expiry,
    }
}
