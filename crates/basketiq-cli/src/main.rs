mod ingest;
mod report;

use std::path::PathBuf;

use anyhow::Context;
use basketiq_core::{catalog::default_group_rules, AppConfig, Category, GroupRule};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "basketiq-cli")]
#[command(about = "basketiq grocery price intelligence command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Ingest a JSON array of scraped listings for one retailer
    Ingest {
        /// Retailer the listings belong to (created on first use)
        #[arg(long)]
        retailer: String,

        /// Path to a JSON file holding an array of listing objects
        #[arg(long)]
        file: PathBuf,
    },
    /// Fetch and ingest every configured retailer feed, one after another
    Sync,
    /// Generate synthetic daily price history for unit-priced products
    Backfill {
        /// Maximum number of products to fill (1-1000)
        #[arg(long, default_value_t = basketiq_ingest::DEFAULT_BACKFILL_LIMIT)]
        limit: i64,

        /// Days of history to generate per product
        #[arg(long, default_value_t = basketiq_ingest::DEFAULT_BACKFILL_DAYS)]
        days: usize,
    },
    /// Rank products matching a search term by deal quality
    Deals {
        /// Search term, e.g. "bananas"
        #[arg(long)]
        name: String,

        /// Print at most this many rows
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Emit JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
    /// Show the cheapest pick per keyword group across retailers
    Groups {
        /// Only group products in this category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse::<Category>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("basketiq-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = basketiq_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = basketiq_db::PoolConfig::from_app_config(&config);
    let pool = basketiq_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("failed to connect to database")?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            basketiq_db::ping(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = basketiq_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Ingest { retailer, file } => {
            let store = basketiq_db::PgStore::new(pool);
            let report = ingest::run_ingest_file(&store, &retailer, &file).await?;
            ingest::print_batch_report(&retailer, &report);
        }
        Commands::Sync => {
            let store = basketiq_db::PgStore::new(pool);
            let results = ingest::run_sync(&store, &config).await?;
            ingest::print_sync_results(&results);
        }
        Commands::Backfill { limit, days } => {
            let store = basketiq_db::PgStore::new(pool);
            let report = ingest::run_backfill(&store, limit, days).await?;
            ingest::print_backfill_report(&report);
        }
        Commands::Deals { name, limit, json } => {
            let store = basketiq_db::PgStore::new(pool);
            let deals = report::find_deals(&store, &name, limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&deals)?);
            } else {
                report::print_deals(&name, &deals);
            }
        }
        Commands::Groups { category } => {
            let store = basketiq_db::PgStore::new(pool);
            let rules = group_rules(&config)?;
            let groups = report::keyword_groups(&store, &rules, category).await?;
            report::print_groups(&groups);
        }
    }

    Ok(())
}

fn group_rules(config: &AppConfig) -> anyhow::Result<Vec<GroupRule>> {
    match &config.group_rules_path {
        Some(path) => basketiq_core::load_group_rules(path)
            .with_context(|| format!("loading group rules from {}", path.display())),
        None => Ok(default_group_rules()),
    }
}
