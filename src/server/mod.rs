//! CORS-enabled HTTP edge.
//!
//! A single fallback route accepts any method on any path:
//!
//! - `OPTIONS`: CORS preflight, `204` with three CORS headers
//! - anything else: JSON array of UI search requests in, `{ results }` out

pub mod cors;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sigproxy_search::{SearchClient, SearchHooks};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::Result;

/// Shared state for axum handlers.
#[derive(Clone)]
struct AppState {
    /// Orchestration client wired to the signing transporter.
    client: Arc<SearchClient>,
    /// Hooks run around every search (the query boost).
    hooks: SearchHooks,
}

/// Builds the edge router.
pub fn router(client: Arc<SearchClient>, hooks: SearchHooks) -> Router {
    Router::new()
        .fallback(handlers::handle_any)
        .with_state(AppState { client, hooks })
}

/// The running edge server.
pub struct ProxyServer {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Handle to the background server task.
    handle: JoinHandle<()>,
}

impl ProxyServer {
    /// Start the edge server.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign)
    /// and begins serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(
        client: Arc<SearchClient>,
        hooks: SearchHooks,
        config: &ServerConfig,
    ) -> Result<Self> {
        let app = router(client, hooks);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr).await?;
        let addr = listener.local_addr()?;

        info!("sigproxy listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("sigproxy server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ProxyServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
