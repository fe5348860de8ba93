//! HTTP API for the pool filter controller.
//!
//! Thin CRUD endpoints over the program store plus status and override
//! operations on the scheduler core.

mod errors;
mod handlers;
mod responses;

pub use errors::ApiError;
pub use handlers::ApiState;
pub use responses::*;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::scheduler::Scheduler;
use crate::storage::ProgramStore;

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

impl ApiConfig {
    /// Create a new API config with custom host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Build the API router with all endpoints.
pub fn build_router<S: ProgramStore + 'static>(state: ApiState<S>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/program/now", get(handlers::get_current_program::<S>))
        .route("/program/all", get(handlers::get_all_programs::<S>))
        .route("/seasons/", get(handlers::get_season_dates::<S>))
        .route("/program/add", post(handlers::post_new_program::<S>))
        .route("/program/update", put(handlers::put_update_program::<S>))
        .route("/override", put(handlers::put_override::<S>))
        .route("/override/stop", put(handlers::put_override_stop::<S>))
        .route("/program/delete", delete(handlers::delete_program::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Create the API state from the scheduler and store.
pub fn create_api_state<S: ProgramStore>(
    scheduler: Arc<Scheduler<S>>,
    store: Arc<S>,
) -> ApiState<S> {
    ApiState { scheduler, store }
}

/// Start the API server.
///
/// Spawns the server and returns a handle to the task; the server runs
/// until the task is aborted or the process exits.
pub async fn start_server<S: ProgramStore + 'static>(
    config: ApiConfig,
    state: ApiState<S>,
) -> std::io::Result<tokio::task::JoinHandle<()>> {
    let router = build_router(state);
    let addr = config
        .socket_addr()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API server listening on http://{}", addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(handle)
}
