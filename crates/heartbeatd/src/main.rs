//! heartbeatd — the heartbeat collector daemon.
//!
//! Opens the heartbeat store, builds one `HeartbeatService` and serves it
//! through the read router and the write router, either on two listeners or
//! combined on one.
//!
//! # Usage
//!
//! ```text
//! heartbeatd --read-addr 0.0.0.0:8080 --write-addr 127.0.0.1:8081 \
//!     --db-path /var/lib/heartbeat/heartbeats.redb --model explicit
//! ```

mod server;
mod settings;

use std::path::PathBuf;

use clap::Parser;
use heartbeat_core::{DaemonConfig, LogFormat};
use tracing_subscriber::EnvFilter;

use crate::settings::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "heartbeatd", about = "A service to collect and monitor heartbeats")]
struct Cli {
    /// Optional TOML config file; flags and environment variables win over it.
    #[arg(long, env = "HEARTBEAT_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => DaemonConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("load config {}: {e}", path.display()))?,
        None => DaemonConfig::default(),
    };
    let settings = Settings::resolve(cli.overrides, &file)?;

    init_tracing(settings.log_format);

    server::run(settings).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,heartbeat=debug"));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}
