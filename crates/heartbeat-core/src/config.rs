//! heartbeatd.toml configuration parser.
//!
//! Every key is optional; the daemon layers CLI flags and environment
//! variables on top of whatever the file provides.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::{FreshnessModel, LogFormat};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    pub server: Option<ServerConfig>,
    pub store: Option<StoreConfig>,
    pub heartbeat: Option<HeartbeatConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Listener for evaluation requests.
    pub read_addr: Option<SocketAddr>,
    /// Listener for registration requests. Unset means both route sets share
    /// `read_addr`.
    pub write_addr: Option<SocketAddr>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeartbeatConfig {
    pub model: Option<FreshnessModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    pub format: Option<LogFormat>,
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn read_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().and_then(|s| s.read_addr)
    }

    pub fn write_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().and_then(|s| s.write_addr)
    }

    pub fn store_path(&self) -> Option<&Path> {
        self.store.as_ref().and_then(|s| s.path.as_deref())
    }

    pub fn model(&self) -> Option<FreshnessModel> {
        self.heartbeat.as_ref().and_then(|h| h.model)
    }

    pub fn log_format(&self) -> Option<LogFormat> {
        self.log.as_ref().and_then(|l| l.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full() {
        let toml_str = r#"
[server]
read_addr = "0.0.0.0:8080"
write_addr = "127.0.0.1:8081"

[store]
path = "/var/lib/heartbeat/heartbeats.redb"

[heartbeat]
model = "implicit"

[log]
format = "json"
"#;
        let config: DaemonConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.read_addr(), Some("0.0.0.0:8080".parse::<SocketAddr>().unwrap()));
        assert_eq!(config.write_addr(), Some("127.0.0.1:8081".parse::<SocketAddr>().unwrap()));
        assert_eq!(
            config.store_path(),
            Some(Path::new("/var/lib/heartbeat/heartbeats.redb"))
        );
        assert_eq!(config.model(), Some(FreshnessModel::Implicit));
        assert_eq!(config.log_format(), Some(LogFormat::Json));
    }

    #[test]
    fn parse_empty() {
        let config: DaemonConfig = toml::from_str("").unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert!(config.read_addr().is_none());
        assert!(config.model().is_none());
    }

    #[test]
    fn rejects_unknown_keys() {
        let toml_str = r#"
[server]
port = 8080
"#;
        assert!(toml::from_str::<DaemonConfig>(toml_str).is_err());
    }

    #[test]
    fn rejects_unknown_model() {
        let toml_str = r#"
[heartbeat]
model = "sometimes"
"#;
        assert!(toml::from_str::<DaemonConfig>(toml_str).is_err());
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heartbeatd.toml");

        let config = DaemonConfig {
            heartbeat: Some(HeartbeatConfig {
                model: Some(FreshnessModel::Explicit),
            }),
            ..Default::default()
        };
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = DaemonConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
