mod analyze;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use silverline_core::AppConfig;
use silverline_db::PgStore;
use silverline_sentiment::{
    task_queue, AnalysisSettings, Analyzer, HttpClassifier, RedditClient, RedditCredentials,
    TaskReceiver,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "silverline-cli")]
#[command(about = "Silverline approval-rating command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute (or fetch) today's approval record for a keyword
    Analyze {
        keyword: String,
        /// Subreddit to search; blank searches all of Reddit
        #[arg(long, default_value = "")]
        subreddit: String,
        /// Also backfill the previous eight days before exiting
        #[arg(long)]
        backfill: bool,
    },
    /// Recompute the record for one past day
    Backfill {
        keyword: String,
        #[arg(long, default_value = "")]
        subreddit: String,
        /// Days before today, 1 through 8
        #[arg(long)]
        days_ago: u32,
    },
    /// Print every stored record for a keyword and subreddit
    Results {
        keyword: String,
        #[arg(long, default_value = "")]
        subreddit: String,
    },
    /// Subscribe a keyword in a subreddit for daily analysis
    Subscribe {
        keyword: String,
        #[arg(long, default_value = "")]
        subreddit: String,
    },
    /// Subscription operations
    Subscriptions {
        #[command(subcommand)]
        command: SubscriptionCommands,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum SubscriptionCommands {
    /// Print today's records for every subscribed pair
    Today,
    /// Run today's analysis for every subscribed pair
    Run {
        /// Also backfill the previous eight days for newly computed records
        #[arg(long)]
        backfill: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("silverline-cli: no command given; see --help");
        return Ok(());
    };

    let config = silverline_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = silverline_db::PoolConfig::from_app_config(&config);
    let pool = silverline_db::connect_pool(&config.database_url, pool_config).await?;

    if let Commands::Db { command } = &command {
        match command {
            DbCommands::Ping => {
                silverline_db::health_check(&pool).await?;
                println!("database: ok");
            }
            DbCommands::Migrate => {
                let applied = silverline_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        }
        return Ok(());
    }

    let (analyzer, mut rx) = build_analyzer(&config, PgStore::new(pool))?;

    match command {
        Commands::Analyze {
            keyword,
            subreddit,
            backfill,
        } => analyze::run_analyze(&analyzer, &mut rx, &keyword, &subreddit, backfill).await,
        Commands::Backfill {
            keyword,
            subreddit,
            days_ago,
        } => analyze::run_backfill(&analyzer, &keyword, &subreddit, days_ago).await,
        Commands::Results { keyword, subreddit } => {
            analyze::run_results(&analyzer, &keyword, &subreddit).await
        }
        Commands::Subscribe { keyword, subreddit } => {
            let outcome = analyzer.subscribe(&keyword, &subreddit).await?;
            println!("{}", outcome.message());
            Ok(())
        }
        Commands::Subscriptions {
            command: SubscriptionCommands::Today,
        } => analyze::run_subscribed_today(&analyzer).await,
        Commands::Subscriptions {
            command: SubscriptionCommands::Run { backfill },
        } => analyze::run_subscribed(&analyzer, &mut rx, backfill).await,
        Commands::Db { .. } => Ok(()),
    }
}

fn build_analyzer(
    config: &AppConfig,
    store: PgStore,
) -> anyhow::Result<(Analyzer, TaskReceiver)> {
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

    let analyzer = Analyzer::new(
        Arc::new(fetcher),
        Arc::new(classifier),
        Arc::new(store),
        queue,
        AnalysisSettings::from_app_config(config),
    );
    Ok((analyzer, rx))
}
