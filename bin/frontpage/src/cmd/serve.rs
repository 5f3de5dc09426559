//! Serve command - run the site's HTTP server

use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use frontpage_render::PageRenderer;
use tokio::net::TcpListener;

use super::load_gateway;
use crate::server::{ServerState, create_router};

/// Run the serve command.
///
/// `addr` overrides `server.addr` from the configuration.
pub async fn run(config_path: &Path, addr: Option<&str>) -> Result<()> {
    tracing::info!(?config_path, "Starting server");

    let (config, gateway) = load_gateway(config_path)?;
    if !gateway.has_token() {
        tracing::warn!("no read token configured; draft mode requests will fail");
    }

    let state = Arc::new(ServerState::new(
        gateway,
        PageRenderer::new(config.site.clone()),
        config.server.draft_secret.clone(),
        config.server.revalidate_secret.clone(),
    ));
    let app = create_router(state);

    let addr = addr.unwrap_or(config.server.addr.as_str());
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Site running at http://{addr}");
    println!("  Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
