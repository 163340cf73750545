//! HeartbeatService — the shared handle behind both HTTP adapters.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use heartbeat_core::{Clock, FreshnessModel, SystemClock};
use heartbeat_state::HeartbeatStore;

use crate::error::{ServiceError, ServiceResult, validate_id};

/// Recorder + evaluator over one injected store and clock.
#[derive(Clone)]
pub struct HeartbeatService {
    pub(crate) store: Arc<dyn HeartbeatStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) model: FreshnessModel,
}

impl HeartbeatService {
    /// Create a service that stamps heartbeats with the system clock.
    pub fn new(store: Arc<dyn HeartbeatStore>, model: FreshnessModel) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            model,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn model(&self) -> FreshnessModel {
        self.model
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Delete the heartbeat for `id`. Returns true if one was stored,
    /// whether or not it was still valid.
    pub fn purge(&self, id: &str) -> ServiceResult<bool> {
        validate_id(id)?;
        let existed = self.store.delete(id)?;
        debug!(%id, existed, "heartbeat purged");
        Ok(existed)
    }

    /// Delete every heartbeat whose stored expiry has passed.
    ///
    /// Only meaningful under the explicit model: implicit records carry no
    /// expiry until a reader supplies a TTL.
    pub fn purge_expired(&self) -> ServiceResult<usize> {
        if self.model != FreshnessModel::Explicit {
            return Err(ServiceError::validation(
                "model",
                "bulk purge needs stored expiries (explicit model)",
            ));
        }
        let count = self.store.delete_expired(self.now())?;
        debug!(count, "expired heartbeats purged");
        Ok(count)
    }
}
