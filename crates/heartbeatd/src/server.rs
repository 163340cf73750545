//! Listener wiring and graceful shutdown.
//!
//! The read and write adapters run as two futures joined with `try_join!`;
//! both watch the same shutdown channel, so a signal drains them together and
//! a bind or serve error on one stops the other.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use heartbeat_liveness::HeartbeatService;
use heartbeat_state::RedbStore;

use crate::settings::Settings;

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    info!(model = %settings.model, "heartbeat collector starting");

    if let Some(parent) = settings.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = RedbStore::open(&settings.db_path)?;
    info!(path = ?settings.db_path, "heartbeat store opened");

    let service = HeartbeatService::new(Arc::new(store), settings.model);

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_handle = tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // ── Listeners ──────────────────────────────────────────────

    let result = match settings.write_addr {
        Some(write_addr) => {
            let read = serve(
                "read",
                settings.read_addr,
                heartbeat_api::read_router(service.clone()),
                shutdown_rx.clone(),
            );
            let write = serve(
                "write",
                write_addr,
                heartbeat_api::write_router(service),
                shutdown_rx,
            );
            tokio::try_join!(read, write).map(|_| ())
        }
        None => {
            serve(
                "combined",
                settings.read_addr,
                heartbeat_api::combined_router(service),
                shutdown_rx,
            )
            .await
        }
    };

    signal_handle.abort();
    info!("heartbeat collector stopped");
    result
}

async fn serve(
    name: &'static str,
    addr: SocketAddr,
    router: Router,
    shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind {name} listener on {addr}: {e}"))?;
    info!(listener = name, addr = %listener.local_addr()?, "listener started");

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
        .await?;

    info!(listener = name, "listener stopped");
    Ok(())
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    // A dropped sender also ends the wait.
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            break;
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_for_shutdown_returns_on_signal() {
        let (tx, rx) = watch::channel(false);
        let waiter = tokio::spawn(wait_for_shutdown(rx));
        tx.send(true).unwrap();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn wait_for_shutdown_returns_when_sender_dropped() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        wait_for_shutdown(rx).await;
    }

    #[tokio::test]
    async fn run_fails_on_occupied_port() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            read_addr: occupied.local_addr().unwrap(),
            write_addr: None,
            db_path: dir.path().join("heartbeats.redb"),
            model: heartbeat_core::FreshnessModel::Explicit,
            log_format: heartbeat_core::LogFormat::Text,
        };

        let err = run(settings).await.unwrap_err();
        assert!(err.to_string().contains("bind combined listener"));
    }
}
