// SPDX-License-Identifier: MIT

//! `orcd`: the orchestrator daemon binary. Installs a `tracing` subscriber,
//! loads configuration, opens the store, runs the crash-recovery sweep, and
//! serves the scheduler and IPC listener until a shutdown signal arrives.

use orc_daemon::{config::Config, listener, Daemon};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config = Config::default();
    orc_daemon::env::apply(&mut config);

    let store = orc_storage::Store::open(&config.database_path)?;
    let socket_path = std::env::var("ORC_SOCKET_PATH").unwrap_or_else(|_| "/tmp/orcd.sock".into());

    let daemon = Arc::new(Daemon::new(store, config, Vec::new()));
    let shutdown = CancellationToken::new();

    let listener_shutdown = shutdown.clone();
    let listener_daemon = daemon.clone();
    let listener_task = tokio::spawn(async move {
        if let Err(err) = listener::serve(listener_daemon, &socket_path, listener_shutdown).await {
            tracing::error!(error = %err, "ipc listener exited with error");
        }
    });

    let run_shutdown = shutdown.clone();
    let run_daemon = daemon.clone();
    let run_task = tokio::spawn(async move {
        if let Err(err) = run_daemon.run(run_shutdown).await {
            tracing::error!(error = %err, "daemon run loop exited with error");
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    shutdown.cancel();

    let _ = tokio::join!(listener_task, run_task);
    info!("orcd exiting cleanly");
    Ok(())
}
