mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use anyhow::Context;
use basketiq_core::{catalog::default_group_rules, AppConfig, GroupRule};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limiter, AppState},
    middleware::ApiKeys,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = basketiq_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = basketiq_db::PoolConfig::from_app_config(&config);
    let pool = basketiq_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = basketiq_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let feed_client =
        basketiq_ingest::FeedClient::new(config.feed_timeout_secs, &config.feed_user_agent)?;
    let state = AppState {
        store: Arc::new(basketiq_db::PgStore::new(pool)),
        group_rules: Arc::new(group_rules(&config)?),
        feeds: Arc::new(config.retailer_feeds.clone()),
        feed_client: Arc::new(feed_client),
    };

    let _scheduler = if config.sync_enabled {
        Some(scheduler::build_scheduler(state.clone(), &config.sync_cron).await?)
    } else {
        tracing::info!("scheduled retailer sync disabled");
        None
    };

    let api_keys = ApiKeys::from_env(matches!(
        config.env,
        basketiq_core::Environment::Development
    ))?;
    let app = build_app(state, api_keys, default_rate_limiter());

    tracing::info!(addr = %config.bind_addr, env = %config.env, "basketiq-server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn group_rules(config: &AppConfig) -> anyhow::Result<Vec<GroupRule>> {
    match &config.group_rules_path {
        Some(path) => {
            let rules = basketiq_core::load_group_rules(path)
                .with_context(|| format!("loading group rules from {}", path.display()))?;
            tracing::info!(count = rules.len(), path = %path.display(), "loaded group rules");
            Ok(rules)
        }
        None => Ok(default_group_rules()),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
