//! Back-office entry-point: loads settings, prepares the database and serves
//! the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backoffice::inbound::http::health::HealthState;
use backoffice::inbound::http::session_config::{BuildMode, session_settings_from_env};
use backoffice::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations_async};
use backoffice::settings::ServerSettings;
use ortho_config::OrthoConfig;

use server::{ServerConfig, create_server};

fn startup_error(context: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {error}"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|e| startup_error("invalid settings", e))?;
    let database_url = settings.database_url.clone().ok_or_else(|| {
        startup_error(
            "missing setting",
            "BACKOFFICE_DATABASE_URL (or --database-url) is required",
        )
    })?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| startup_error("invalid session configuration", e))?;
    info!(
        key_fingerprint = %session.key_fingerprint(),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    if settings.run_migrations() {
        let applied = run_pending_migrations_async(database_url.clone())
            .await
            .map_err(|e| startup_error("migrations failed", e))?;
        info!(count = applied.len(), migrations = ?applied, "database migrations applied");
    }

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .map_err(|e| startup_error("database pool", e))?;

    let health_state =
        web::Data::new(HealthState::new().with_dependency(Arc::new(pool.clone())));
    let config = ServerConfig::new(session, settings.bind_addr(), pool);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::request_metrics());

    info!(bind_addr = %settings.bind_addr(), "starting back-office API");
    create_server(health_state, config)?.await
}
