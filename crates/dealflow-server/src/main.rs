#![forbid(unsafe_code)]

use dealflow_server::{build_router, validate_startup_config, AppState, ServerConfig};
use dealflow_store::{SqliteStore, Store};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cfg = ServerConfig::from_env();
    init_tracing(cfg.log_json);
    validate_startup_config(&cfg)?;

    let store = SqliteStore::open(cfg.store.clone())
        .map_err(|e| format!("store open failed: {e}"))?;
    info!(
        backend = store.backend_tag(),
        path = %cfg.store.path.display(),
        "store ready"
    );
    let state = AppState::with_config(Arc::new(store), cfg.api.clone());
    let app = build_router(state);

    let listener = TcpListener::bind(&cfg.bind_addr)
        .await
        .map_err(|e| format!("bind {} failed: {e}", cfg.bind_addr))?;
    info!("dealflow-server listening on {}", cfg.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
