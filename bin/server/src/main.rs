use std::sync::Arc;

use gatehouse_server::app;
use gatehouse_server::auth::{AppState, AuthReadiness, OidcClient};
use gatehouse_server::config::ServerConfig;
use gatehouse_session::MemorySessionStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let sessions = Arc::new(MemorySessionStore::new());

    // Spawn periodic session cleanup task
    let cleanup_store = sessions.clone();
    let cleanup_interval_secs = config.session.cleanup_interval_seconds;
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(cleanup_interval_secs));
        loop {
            interval.tick().await;
            let count = cleanup_store.purge_expired().await;
            if count > 0 {
                tracing::debug!(purged_sessions = count, "Periodic session cleanup");
            }
        }
    });

    // Discover the OIDC provider. A failure here does not kill the process:
    // the server still renders pages and reports unhealthy auth, and the
    // login route fails closed until a restart.
    tracing::info!("Discovering OIDC provider...");
    let auth = match OidcClient::discover(&config.cognito).await {
        Ok(client) => {
            tracing::info!(issuer = %config.cognito.issuer_url(), "OIDC provider discovered");
            AuthReadiness::Ready(client)
        }
        Err(e) => {
            tracing::error!(error = %e, "OIDC discovery failed; authentication is unavailable");
            AuthReadiness::Failed(e.to_string())
        }
    };

    let listen_port = config.listen_port;
    let state = AppState::new(auth, sessions, config);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", listen_port))
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://0.0.0.0:{}", listen_port);

    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}
