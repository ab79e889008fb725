mod cache;
mod grants;
mod run;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cache::CacheCommands;

#[derive(Debug, Parser)]
#[command(name = "granthub-cli")]
#[command(about = "granthub command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the scrape -> filter -> store pipeline once, now
    Run {
        /// Print the run report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Write the configured school profiles to the database
    Seed,
    /// Manage the on-disk search response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// List stored grants
    Grants {
        /// Only grants found for this school
        #[arg(long)]
        school: Option<String>,
        /// Case-insensitive title substring
        #[arg(long)]
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = granthub_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?command, "dispatching command");

    match command {
        Commands::Run { json } => {
            let pool = connect(&config).await?;
            run::run_pipeline(pool, &config, json).await
        }
        Commands::Seed => {
            let pool = connect(&config).await?;
            grants::run_seed(&pool, &config).await
        }
        Commands::Cache { command } => cache::run_cache(&config, command).await,
        Commands::Grants { school, query } => {
            let pool = connect(&config).await?;
            grants::run_list_grants(&pool, school.as_deref(), query.as_deref()).await
        }
    }
}

/// Connect and bring the schema up to date.
async fn connect(config: &granthub_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = granthub_db::PoolConfig::from_app_config(config);
    let pool = granthub_db::connect_pool(&config.database_url, pool_config).await?;
    granthub_db::run_migrations(&pool).await?;
    Ok(pool)
}
