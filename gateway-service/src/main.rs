use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common_auth::{PasswordVerifier, TierPolicy, TokenConfig, TokenService};
use gateway_service::{build_router, load_gateway_config, store::PgStore, AppState};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_gateway_config()?;
    info!(?config, "loaded gateway configuration");

    let tokens = TokenService::new(TokenConfig::new(
        config.jwt_secret.clone(),
        config.jwt_issuer.clone(),
    ))
    .context("failed to initialise token service")?;

    let store = PgStore::connect(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    if config.run_migrations {
        store.migrate().await.context("failed to run migrations")?;
    }
    let store = Arc::new(store);

    let state = AppState::new(
        store,
        tokens,
        TierPolicy::standard(),
        PasswordVerifier::with_dummy(config.password_hash_scheme, config.bcrypt_cost),
        config.audit_queue_capacity,
    )
    .context("failed to register metrics")?;
    let audit = state.audit.clone();

    let app = build_router(state, &config.allowed_origins);

    let addr = config.socket_addr();
    info!(%addr, "starting gateway-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    audit.flush().await;
    info!("gateway-service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
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
