pub mod serial;
pub mod session;
pub mod commands;
pub mod server;
pub mod config;

use std::sync::Arc;

use anyhow::Context;
use config::BridgeConfig;
use serial::{PortBackend, PortDescriptor};
use session::SerialSession;

/// Log the ports the host currently exposes, as a numbered list
pub fn log_available_ports(ports: &[PortDescriptor]) {
    if ports.is_empty() {
        log::warn!("No serial ports found");
        return;
    }

    log::info!("Available serial ports:");
    for (i, port) in ports.iter().enumerate() {
        log::info!("  [{}] {} - {}", i, port.device, port.description);
    }
}

/// Open `device`, then serve the control panel until Ctrl+C.
///
/// A device that fails to open does not stop the server: the session starts
/// disconnected and a port can be picked from the page.
pub async fn run(config: BridgeConfig, backend: Arc<dyn PortBackend>, device: &str) -> anyhow::Result<()> {
    let session = Arc::new(SerialSession::new(backend, config.timings));

    if let Err(e) = session.connect(device).await {
        log::error!("Failed to connect to {}: {}. Choose a port from the web page.", device, e);
    }

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    log::info!("Open http://localhost:{} in your browser", config.http_port);
    log::info!("Press Ctrl+C to stop");

    server::serve(listener, session.clone(), shutdown_signal())
        .await
        .context("HTTP server error")?;

    log::info!("Shutting down...");
    session.disconnect().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
