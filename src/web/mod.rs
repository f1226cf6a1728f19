//! Browser dashboard for the live field table.
//!
//! The display loop publishes a [`FieldFrame`] per cycle through a
//! [`WebDisplay`]; the server exposes it as a page, a JSON endpoint and a
//! WebSocket stream.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;
pub mod websocket;

// Re-export commonly used items
pub use config::WebConfig;
pub use router::create_app;
pub use state::{DashboardState, FieldFrame, FrameField, WebDisplay};

use crate::error::{Result, SamplerError};
use std::net::SocketAddr;
use tracing::info;

/// Serve the dashboard until the server fails.
pub async fn start_web_server(config: WebConfig, state: DashboardState) -> Result<()> {
    let app = create_app(&config, state);

    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| SamplerError::config_error(format!("Invalid bind address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SamplerError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    info!("Dashboard available at http://{}/", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| SamplerError::web_server_error(format!("Server error: {}", e)))?;

    Ok(())
}
