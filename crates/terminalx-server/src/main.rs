use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;

use terminalx_server::config::Settings;
use terminalx_server::router::build_router;
use terminalx_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,terminalx_server=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("Starting TERMINALX-9000 chat server...");

    // Load configuration
    let settings = Settings::load()?;
    info!("Configuration loaded");

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    let state = AppState::from_settings(settings)?;
    let app = build_router(state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
