//! engagementd - engagement workflow daemon
//!
//! Serves the workflow engine over REST with an in-memory store.

use engagement_daemon::{create_router, AppState, DaemonError, DaemonResult};
use engagement_storage::InMemoryWorkflowStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8740";

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("ENGAGEMENT_DAEMON_ADDR")
        .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
    let addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| DaemonError::Config(format!("invalid listen address '{}': {}", addr, e)))?;

    let store = Arc::new(InMemoryWorkflowStore::new());
    let state = AppState::new(store);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("engagement daemon listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("engagement daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    // SIGTERM is not available on all platforms; ctrl-c always is
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
