//! Shared types used across the heartbeat crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a deployment decides whether a heartbeat is still fresh.
///
/// Exactly one model is active per deployment. Records written under one
/// model are always evaluated by the model currently configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessModel {
    /// The writer supplies an expiry; readers compare `now` against it.
    #[default]
    Explicit,
    /// The writer only stamps `last_seen`; readers supply a TTL.
    Implicit,
}

impl FreshnessModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreshnessModel::Explicit => "explicit",
            FreshnessModel::Implicit => "implicit",
        }
    }
}

impl fmt::Display for FreshnessModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown freshness model `{0}` (expected `explicit` or `implicit`)")]
pub struct UnknownModel(pub String);

impl FromStr for FreshnessModel {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Ok(FreshnessModel::Explicit),
            "implicit" => Ok(FreshnessModel::Implicit),
            other => Err(UnknownModel(other.to_string())),
        }
    }
}

/// Log output format for the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log format `{0}` (expected `text` or `json`)")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}
