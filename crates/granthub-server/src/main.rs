mod api;
mod digest;
mod middleware;
mod scheduler;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use granthub_pipeline::{Pipeline, PipelineError};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(granthub_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = granthub_db::PoolConfig::from_app_config(&config);
    let pool = granthub_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = granthub_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let pipeline = match Pipeline::from_config(&config, pool.clone()) {
        Ok(pipeline) => Some(Arc::new(pipeline)),
        Err(PipelineError::MissingApiKey(var)) => {
            tracing::warn!(var, "pipeline disabled; scheduled and manual runs are unavailable");
            None
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(pipeline) = &pipeline {
        match granthub_db::seed_schools(&pool, pipeline.schools()).await {
            Ok(count) => tracing::info!(count, "schools seeded"),
            Err(e) => tracing::warn!(error = %e, "failed to seed schools at startup"),
        }
    }

    let _scheduler = scheduler::build_scheduler(pipeline.clone(), &config.pipeline_cron).await?;

    let auth = AuthState::from_keys(
        &config.api_keys,
        !matches!(config.env, granthub_core::Environment::Production),
    )?;
    if config.env == granthub_core::Environment::Production && config.allows_any_origin() {
        tracing::warn!("CORS allows any origin in production");
    }
    let app = build_app(
        AppState { pool, pipeline },
        auth,
        default_rate_limit_state(),
        &config.allowed_origins,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "granthub-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
