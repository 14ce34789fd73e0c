#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use dealflow_store::{Store, StoreSession};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

mod config;
mod http;
mod middleware;
mod services;

pub use config::{
    validate_startup_config, ApiConfig, ServerConfig, ENV_BIND, ENV_DATABASE_PATH, ENV_LOG_JSON,
    ENV_MAX_BODY_BYTES, ENV_SQLITE_BUSY_TIMEOUT_MS,
};
pub use services::{deal_ribbon, requirement_confidence, sales_pipeline, ServiceError};

pub const CRATE_NAME: &str = "dealflow-server";

/// Per-process handles shared by every request. The store is injected here
/// and never reached through a global.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub api: ApiConfig,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_config(store, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(store: Arc<dyn Store>, api: ApiConfig) -> Self {
        Self {
            store,
            api,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Runs `work` against a fresh store session on the blocking pool. The
    /// session is dropped when `work` returns, whether it succeeded or not.
    pub(crate) async fn with_session<T, F>(&self, work: F) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn StoreSession) -> Result<T, ServiceError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut session = store.open_session()?;
            work(session.as_mut())
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("store task failed: {e}")))?
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handlers::health_handler))
        .route("/sales/pipeline/", get(http::handlers::pipeline_handler))
        .route("/deals/", post(http::handlers::create_deal_handler))
        .route("/deals/:deal_id/ribbon", get(http::handlers::ribbon_handler))
        .route(
            "/requirements/",
            post(http::handlers::create_requirement_handler),
        )
        .route("/tickets/", post(http::handlers::create_ticket_handler))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
