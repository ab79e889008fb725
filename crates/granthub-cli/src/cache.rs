use clap::Subcommand;
use granthub_search::ResponseCache;

/// Sub-commands available under `cache`.
#[derive(Debug, Subcommand)]
pub enum CacheCommands {
    /// Delete every cached search response
    Clear,
}

pub(crate) async fn run_cache(
    config: &granthub_core::AppConfig,
    command: CacheCommands,
) -> anyhow::Result<()> {
    match command {
        CacheCommands::Clear => {
            let cache = ResponseCache::new(
                config.search_cache_dir.clone(),
                config.search_cache_ttl_hours,
            );
            let removed = cache.clear().await?;
            println!(
                "removed {removed} cached responses from {}",
                cache.dir().display()
            );
        }
    }
    Ok(())
}
