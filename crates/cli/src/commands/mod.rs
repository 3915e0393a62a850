use anyhow::{Context, Result};
use clap::Subcommand;
use imgcache_cache::{CacheConfig, CacheConfigLoader};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

mod cdn;
mod inspect;
mod optimize;
mod warm;

pub use cdn::CdnUrlArgs;
pub use optimize::OptimizeArgs;
pub use warm::WarmArgs;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive responsive variants and thumbnails from local images
    Optimize(OptimizeArgs),
    /// Report format, dimensions, color profile and recommendations
    Analyze {
        /// Image file to inspect
        path: PathBuf,
    },
    /// Score an image 0-100 and list quality issues
    Assess {
        /// Image file to inspect
        path: PathBuf,
    },
    /// Print the CDN URL for an asset
    CdnUrl(CdnUrlArgs),
    /// Fetch remote images into the cache, skipping ones already cached
    Warm(WarmArgs),
}

impl Commands {
    pub async fn execute(self, config: Option<&Path>) -> Result<()> {
        match self {
            Commands::Optimize(args) => optimize::execute(args, config).await,
            Commands::Analyze { path } => inspect::analyze(&path).await,
            Commands::Assess { path } => inspect::assess(&path).await,
            Commands::CdnUrl(args) => cdn::execute(args, config),
            Commands::Warm(args) => warm::execute(args, config).await,
        }
    }
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<CacheConfig> {
    let loaded = CacheConfigLoader::load(path).context("failed to load cache configuration")?;
    debug!(source = ?loaded.source, "Loaded cache configuration");
    Ok(loaded.config)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
