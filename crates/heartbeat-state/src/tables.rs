//! redb table definitions.

use redb::TableDefinition;

/// Heartbeat records keyed by identifier, JSON-serialized.
pub const HEARTBEATS: TableDefinition<&str, &[u8]> = TableDefinition::new("heartbeats");
