//! Edge proxy binary.
//!
//! Loads configuration, resolves credentials through the default provider
//! chain (environment, shared profile, container endpoint) and serves until
//! interrupted.

use std::sync::Arc;

use sigproxy::{ProxyConfig, ProxyServer, build_client};
use sigproxy_search::boosted_hooks;
use sigproxy_search::credentials::default_chain;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("sigproxy=info,sigproxy_search=info")
            }),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sigproxy starting");

    let config = ProxyConfig::load().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        anyhow::anyhow!("sigproxy failed to load configuration: {e}")
    })?;

    let client = build_client(&config, Arc::new(default_chain()))?;
    let server = ProxyServer::start(Arc::new(client), boosted_hooks(), &config.server).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!(addr = %server.addr(), "shutting down");
    server.shutdown();

    tracing::info!("sigproxy shut down cleanly");
    Ok(())
}
