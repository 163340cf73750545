//! Recorder — registers "now" as the last-seen time of an identifier.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use heartbeat_core::FreshnessModel;
use heartbeat_state::HeartbeatRecord;

use crate::error::{ServiceError, ServiceResult, validate_id};
use crate::service::HeartbeatService;

/// How a registration states its expiry (explicit model only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirySpec {
    /// Expire this long after the registration is recorded.
    After(Duration),
    /// Expire at this instant.
    At(DateTime<Utc>),
}

/// Caller-supplied part of a registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterInput {
    pub expiry: Option<ExpirySpec>,
    pub label: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl RegisterInput {
    pub fn expires_after(mut self, ttl: Duration) -> Self {
        self.expiry = Some(ExpirySpec::After(ttl));
        self
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expiry = Some(ExpirySpec::At(at));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl HeartbeatService {
    /// Record a heartbeat for `id`, fully replacing any previous one.
    pub fn register(&self, id: &str, input: RegisterInput) -> ServiceResult<()> {
        validate_id(id)?;
        if input.metadata.keys().any(|k| k.trim().is_empty()) {
            return Err(ServiceError::validation("metadata", "keys must not be empty"));
        }

        let now = self.now();
        let expiry = match (self.model, input.expiry) {
            (FreshnessModel::Explicit, Some(spec)) => Some(resolve_expiry(now, spec)?),
            (FreshnessModel::Explicit, None) => {
                return Err(ServiceError::validation("expiry", "expiry is required"));
            }
            (FreshnessModel::Implicit, Some(_)) => {
                return Err(ServiceError::validation(
                    "expiry",
                    "not accepted under the implicit model; supply a ttl when evaluating",
                ));
            }
            (FreshnessModel::Implicit, None) => None,
        };

        let record = HeartbeatRecord {
            id: id.to_string(),
            last_seen: now,
            expiry,
            label: input.label.filter(|l| !l.is_empty()),
            metadata: input.metadata,
        };
        self.store.put(&record)?;
        debug!(%id, ?expiry, "heartbeat registered");
        Ok(())
    }
}

fn resolve_expiry(now: DateTime<Utc>, spec: ExpirySpec) -> ServiceResult<DateTime<Utc>> {
    match spec {
        ExpirySpec::At(at) => Ok(at),
        ExpirySpec::After(ttl) => TimeDelta::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| ServiceError::validation("expiry", "out of range")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use heartbeat_core::ManualClock;
    use heartbeat_state::{HeartbeatStore, RedbStore};

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn setup(model: FreshnessModel) -> (HeartbeatService, RedbStore) {
        let store = RedbStore::open_in_memory().unwrap();
        let service = HeartbeatService::new(Arc::new(store.clone()), model)
            .with_clock(Arc::new(ManualClock::new(start())));
        (service, store)
    }

    #[test]
    fn explicit_ttl_is_resolved_against_server_clock() {
        let (service, store) = setup(FreshnessModel::Explicit);
        let input = RegisterInput::default()
            .expires_after(Duration::from_secs(2))
            .label("primary")
            .metadata("region", "eu");

        service.register("svc-a", input).unwrap();

        let record = store.get("svc-a").unwrap().unwrap();
        assert_eq!(record.last_seen, start());
        assert_eq!(record.expiry, Some(start() + TimeDelta::seconds(2)));
        assert_eq!(record.label.as_deref(), Some("primary"));
        assert_eq!(record.metadata.get("region").map(String::as_str), Some("eu"));
    }

    #[test]
    fn explicit_instant_is_stored_verbatim() {
        let (service, store) = setup(FreshnessModel::Explicit);
        let at = start() + TimeDelta::minutes(5);

        service.register("svc-a", RegisterInput::default().expires_at(at)).unwrap();

        assert_eq!(store.get("svc-a").unwrap().unwrap().expiry, Some(at));
    }

    #[test]
    fn explicit_requires_expiry() {
        let (service, store) = setup(FreshnessModel::Explicit);
        let err = service.register("svc-a", RegisterInput::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "expiry", .. }));
        assert!(store.get("svc-a").unwrap().is_none());
    }

    #[test]
    fn implicit_stores_last_seen_only() {
        let (service, store) = setup(FreshnessModel::Implicit);
        service
            .register("svc-a", RegisterInput::default().label("worker"))
            .unwrap();

        let record = store.get("svc-a").unwrap().unwrap();
        assert_eq!(record.last_seen, start());
        assert!(record.expiry.is_none());
        assert_eq!(record.label.as_deref(), Some("worker"));
    }

    #[test]
    fn implicit_rejects_expiry() {
        let (service, _) = setup(FreshnessModel::Implicit);
        let input = RegisterInput::default().expires_after(Duration::from_secs(5));
        let err = service.register("svc-a", input).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "expiry", .. }));
    }

    #[test]
    fn blank_id_is_rejected() {
        let (service, _) = setup(FreshnessModel::Implicit);
        let err = service.register("", RegisterInput::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "id", .. }));
    }

    #[test]
    fn blank_metadata_key_is_rejected() {
        let (service, _) = setup(FreshnessModel::Implicit);
        let input = RegisterInput::default().metadata(" ", "x");
        let err = service.register("svc-a", input).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "metadata", .. }));
    }

    #[test]
    fn empty_label_is_dropped() {
        let (service, store) = setup(FreshnessModel::Implicit);
        service
            .register("svc-a", RegisterInput::default().label(""))
            .unwrap();
        assert!(store.get("svc-a").unwrap().unwrap().label.is_none());
    }

    #[test]
    fn huge_ttl_is_out_of_range() {
        let (service, _) = setup(FreshnessModel::Explicit);
        let input = RegisterInput::default().expires_after(Duration::from_secs(u64::MAX));
        let err = service.register("svc-a", input).unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "expiry", .. }));
    }

    #[test]
    fn reregistration_replaces_record() {
        let (service, store) = setup(FreshnessModel::Explicit);
        let first = RegisterInput::default()
            .expires_after(Duration::from_secs(60))
            .label("old")
            .metadata("version", "1");
        service.register("svc-a", first).unwrap();

        let second = RegisterInput::default().expires_after(Duration::from_secs(5));
        service.register("svc-a", second).unwrap();

        let record = store.get("svc-a").unwrap().unwrap();
        assert!(record.label.is_none());
        assert!(record.metadata.is_empty());
        assert_eq!(record.expiry, Some(start() + TimeDelta::seconds(5)));
    }
}
