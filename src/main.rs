use std::sync::Arc;

use tokio::signal;
use tracing::info;

use tradeport_api as api;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    // The in-memory collaborators back local development; deployment wires
    // the hosted session provider and database here instead.
    let state = api::AppState {
        config: cfg.clone(),
        rate_limiter: Arc::new(api::middleware::SlidingWindowLimiter::new()),
        sessions: api::auth::InMemorySessionStore::shared(),
        users: api::auth::InMemoryUserDirectory::shared(),
        back_office: api::services::InMemoryBackOffice::shared(),
    };

    tokio::spawn(api::middleware::rate_limit::run_cleanup(state.clone()));

    let app = api::app_router(state);

    let addr = format!("{}:{}", cfg.host, cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "tradeport-api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
