//! heartbeat-state — durable heartbeat records.
//!
//! Defines the [`HeartbeatStore`] contract shared by the recorder and the
//! evaluator, and [`RedbStore`], its implementation on top of
//! [redb](https://docs.rs/redb).
//!
//! # Guarantees
//!
//! - `put` is an upsert keyed by identifier and commits in a single write
//!   transaction. redb admits one writer at a time, so concurrent writes to
//!   the same identifier leave exactly one of them in place.
//! - A read transaction begun after a write commits observes that write.
//!
//! Records are JSON-serialized into redb's `&[u8]` value column; instants are
//! stored as RFC 3339 strings.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::{HeartbeatStore, RedbStore};
pub use types::*;
