//! Persisted heartbeat record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique key under which a heartbeat is registered and queried.
pub type HeartbeatId = String;

/// Last known liveness of one identifier.
///
/// A record is replaced wholesale on every registration; fields from an
/// earlier write never survive into a later one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeartbeatRecord {
    pub id: HeartbeatId,
    /// Server time of the registration.
    pub last_seen: DateTime<Utc>,
    /// Absolute expiry, present only under the explicit freshness model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl HeartbeatRecord {
    /// A bare record stamped at `last_seen`.
    pub fn new(id: impl Into<HeartbeatId>, last_seen: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            last_seen,
            expiry: None,
            label: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Key for the heartbeats table.
    pub fn table_key(&self) -> &str {
        &self.id
    }
}
