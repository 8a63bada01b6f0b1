mod api;
mod middleware;
mod scheduler;
mod worker;

use std::sync::Arc;

use silverline_db::PgStore;
use silverline_sentiment::{
    task_queue, AnalysisSettings, Analyzer, HttpClassifier, RedditClient, RedditCredentials,
};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = silverline_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting silverline server");

    let pool_config = silverline_db::PoolConfig::from_app_config(&config);
    let pool = silverline_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = silverline_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations complete");

    let fetcher = RedditClient::new(
        RedditCredentials {
            client_id: config.reddit_client_id.clone(),
            client_secret: config.reddit_client_secret.clone(),
            user_agent: config.reddit_user_agent.clone(),
        },
        config.http_timeout_secs,
    )?;
    let classifier = HttpClassifier::new(
        &config.classifier_url,
        &config.classifier_language,
        config.http_timeout_secs,
    )?;

    let (queue, rx) = task_queue();
    let analyzer = Arc::new(Analyzer::new(
        Arc::new(fetcher),
        Arc::new(classifier),
        Arc::new(PgStore::new(pool)),
        queue,
        AnalysisSettings::from_app_config(&config),
    ));

    let _worker = worker::spawn_worker(Arc::clone(&analyzer), rx);
    let _scheduler =
        scheduler::build_scheduler(Arc::clone(&analyzer), &config.subscription_cron).await?;

    let app = build_app(AppState { analyzer });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
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
