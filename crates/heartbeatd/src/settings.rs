//! Effective daemon settings.
//!
//! Precedence, lowest first: built-in defaults, the TOML config file, then
//! CLI flags and their environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Args;
use heartbeat_core::{DaemonConfig, FreshnessModel, LogFormat};

pub const DEFAULT_READ_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_PATH: &str = "/tmp/heartbeats.redb";

/// Flags that override the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Listener for evaluation requests (`:8080` binds all interfaces).
    #[arg(long, env = "PORT_ADDR", value_parser = parse_listen_addr)]
    pub read_addr: Option<SocketAddr>,

    /// Separate listener for registration requests. When unset, registration
    /// is served on the read listener.
    #[arg(long, env = "WRITE_ADDR", value_parser = parse_listen_addr)]
    pub write_addr: Option<SocketAddr>,

    /// Path to the heartbeat database file.
    #[arg(long, env = "HEARTBEAT_DB")]
    pub db_path: Option<PathBuf>,

    /// Freshness model: `explicit` (expiry at registration) or `implicit`
    /// (ttl at evaluation).
    #[arg(long, env = "HEARTBEAT_MODEL")]
    pub model: Option<FreshnessModel>,

    /// Log output format: `text` or `json`.
    #[arg(long, env = "HEARTBEAT_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub read_addr: SocketAddr,
    pub write_addr: Option<SocketAddr>,
    pub db_path: PathBuf,
    pub model: FreshnessModel,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn resolve(overrides: Overrides, file: &DaemonConfig) -> anyhow::Result<Self> {
        let read_addr = match overrides.read_addr.or(file.read_addr()) {
            Some(addr) => addr,
            None => DEFAULT_READ_ADDR.parse::<SocketAddr>()?,
        };
        let write_addr = overrides.write_addr.or(file.write_addr());
        if write_addr == Some(read_addr) {
            anyhow::bail!(
                "write address {read_addr} equals the read address; omit it to share one listener"
            );
        }

        Ok(Self {
            read_addr,
            write_addr,
            db_path: overrides
                .db_path
                .or_else(|| file.store_path().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            model: overrides.model.or(file.model()).unwrap_or_default(),
            log_format: overrides.log_format.or(file.log_format()).unwrap_or_default(),
        })
    }
}

/// Accept `host:port`, or `:port` for all interfaces.
pub fn parse_listen_addr(s: &str) -> Result<SocketAddr, String> {
    let s = s.trim();
    let full = match s.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => s.to_string(),
    };
    full.parse::<SocketAddr>()
        .map_err(|e| format!("invalid listen address `{s}`: {e}"))
}
