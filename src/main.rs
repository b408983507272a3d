use std::sync::Arc;

use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use orchestrator_operator::controller::{ControllerState, run_controller};
use orchestrator_operator::error::Result;
use orchestrator_operator::stores::Stores;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting orchestrator operator"
    );

    let client = Client::try_default().await?;

    // Cancels in-flight convergence work on SIGINT; the controller stream
    // itself also drains via shutdown_on_signal
    let shutdown = CancellationToken::new();
    let signal_guard = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, cancelling in-flight work");
            signal_guard.cancel();
        }
    });

    let state = Arc::new(ControllerState {
        stores: Stores::kube(client.clone()),
        client,
        shutdown,
    });

    run_controller(state).await
}
