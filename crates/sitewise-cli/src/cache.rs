use clap::Subcommand;
use sitewise_core::AppConfig;
use sitewise_db::{connect_pool, run_migrations, PoolConfig};

/// Sub-commands available under `cache`.
#[derive(Debug, Subcommand)]
pub enum CacheCommands {
    /// Create or upgrade the cache schema
    Migrate,
}

/// Apply pending cache migrations.
///
/// # Errors
///
/// Returns an error if `SITEWISE_CACHE_URL` is unset or the database cannot
/// be opened or migrated.
pub(crate) async fn run_cache_migrate(config: &AppConfig) -> anyhow::Result<()> {
    let url = config
        .cache_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("SITEWISE_CACHE_URL is not set; nothing to migrate"))?;

    let pool = connect_pool(url, PoolConfig::single()).await?;
    let applied = run_migrations(&pool).await?;
    pool.close().await;

    println!("cache ready ({applied} migrations applied)");
    Ok(())
}
