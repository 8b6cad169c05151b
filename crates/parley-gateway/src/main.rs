//! parley gateway binary.
//!
//! - WebSocket endpoint: /ws
//! - Endpoint discovery: /get-ws-endpoint
//! - Tracing span per connection, heartbeat ping + idle timeout

use tracing_subscriber::{fmt, EnvFilter};

use parley_core::error::{ParleyError, Result};
use parley_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = config::load_from_env()?;
    let listen = cfg.gateway.listen_addr()?;

    let state = app_state::AppState::new(cfg);
    let app = router::build_router(state);

    tracing::info!(%listen, "parley-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ParleyError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ParleyError::Internal(format!("server failed: {e}")))?;

    tracing::info!("parley-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler failed");
        std::future::pending::<()>().await;
    }
}
