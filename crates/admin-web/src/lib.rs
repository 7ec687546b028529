//! Web admin panel: edit the remote's config file and peek at the TVs.

pub mod pages;
pub mod routes;
pub mod session;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use ecp::DeviceQuery;
use tracing::{error, info};

use session::SessionStore;

pub struct AdminState {
    pub env_path: PathBuf,
    pub device: Arc<dyn DeviceQuery>,
    pub sessions: SessionStore,
}

impl AdminState {
    pub fn new(env_path: PathBuf, device: Arc<dyn DeviceQuery>) -> Self {
        Self {
            env_path,
            device,
            sessions: SessionStore::new(),
        }
    }
}

/// Handler error rendered as a plain 500.
pub struct AdminError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for AdminError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "admin request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", self.0)).into_response()
    }
}

pub fn router(state: Arc<AdminState>) -> Router {
    routes::routes()
        .with_state(state)
        .layer(axum::middleware::from_fn(routes::log_request))
}

pub async fn serve(addr: SocketAddr, state: Arc<AdminState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, env = %state.env_path.display(), "admin panel listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Run the admin panel on its own OS thread and tokio runtime, alongside a
/// UI event loop that owns the main thread.
pub fn spawn_background(addr: SocketAddr, state: Arc<AdminState>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("admin-web".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "failed to start admin runtime");
                    return;
                }
            };
            if let Err(e) = rt.block_on(serve(addr, state)) {
                error!(error = %e, "admin panel stopped");
            }
        })
}
