//! Dream Journal API server.

use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dream_journal::adapters::auth::{GoTrueAuthProvider, GoTrueConfig};
use dream_journal::adapters::http::{api_router, with_http_layers, AppSettings, AppState};
use dream_journal::adapters::postgres::{
    self, PostgresProfileStore, PostgresReferralCodeStore, PostgresReferralRepository,
    PostgresRewardsStore,
};
use dream_journal::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server.log_level, config.is_production())?;

    let pool = postgres::connect(&config.database).await?;
    if config.database.run_migrations {
        postgres::migrate(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let auth = GoTrueAuthProvider::new(
        GoTrueConfig::new(config.auth.url.clone(), config.auth.anon_key.clone())
            .with_timeout(config.auth.request_timeout()),
    )?;

    let state = AppState {
        auth: Arc::new(auth),
        profiles: Arc::new(PostgresProfileStore::new(pool.clone())),
        codes: Arc::new(PostgresReferralCodeStore::new(pool.clone())),
        referrals: Arc::new(PostgresReferralRepository::new(pool.clone())),
        rewards: Arc::new(PostgresRewardsStore::new(pool)),
        settings: Arc::new(AppSettings::from_config(
            &config.referral,
            &config.provisioning,
        )),
    };

    let app = with_http_layers(api_router(state), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON lines in production, human-readable output otherwise. `RUST_LOG`
/// overrides the configured level.
fn init_tracing(log_level: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
