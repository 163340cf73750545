//! heartbeat-liveness — the heartbeat lifecycle.
//!
//! Two operations share one injected [`HeartbeatStore`](heartbeat_state::HeartbeatStore):
//!
//! ```text
//! HeartbeatService
//!   ├── register(id, RegisterInput)   → one upsert, stamped with clock.now()
//!   ├── evaluate(id, ttl)             → HeartbeatView | NotFoundOrExpired
//!   ├── purge(id)                     → explicit delete
//!   └── purge_expired()               → bulk delete (explicit model only)
//! ```
//!
//! # Freshness models
//!
//! A deployment runs exactly one [`FreshnessModel`](heartbeat_core::FreshnessModel):
//!
//! - **Explicit**: registration carries an expiry; evaluation takes no TTL and
//!   compares `now` against the stored expiry.
//! - **Implicit**: registration only stamps `last_seen`; evaluation takes a
//!   TTL and computes `expiry = last_seen + ttl`.
//!
//! Supplying an expiry under the implicit model, or a TTL under the explicit
//! model, is a validation error.
//!
//! A heartbeat is valid while `now <= expiry`. "Never registered" and
//! "registered but stale" are reported as the same
//! [`ServiceError::NotFoundOrExpired`].
//!
//! The service holds no locks of its own; write serialization is the store's
//! job. It is `Clone + Send + Sync` and can be shared across request tasks.

pub mod error;
pub mod evaluator;
pub mod recorder;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use evaluator::HeartbeatView;
pub use recorder::{ExpirySpec, RegisterInput};
pub use service::HeartbeatService;
