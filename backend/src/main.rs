//! Backend entry-point: loads settings and the model, then serves the API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use backend::outbound::model_store::LoadedModel;
use backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};

use server::{AppSettings, ServerConfig, create_server};

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

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| std::io::Error::other(format!("invalid session settings: {e}")))?;

    let paths = settings.artifact_paths();
    let model = LoadedModel::load(&paths).map_err(|e| {
        std::io::Error::other(format!(
            "failed to load model from {}: {e}; run train-model first",
            paths.model()
        ))
    })?;

    let mut config = ServerConfig::new(session, settings.bind_addr(), model);
    if let Some(database_url) = settings.database_url() {
        run_migrations(database_url)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
        config = config.with_db_pool(pool);
    }

    info!(bind_addr = %settings.bind_addr(), "starting server");
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
