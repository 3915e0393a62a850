use super::{load_config, print_json};
use anyhow::{Context, Result};
use clap::Args;
use imgcache_cache::CacheEngine;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct WarmArgs {
    /// Image URLs to fetch
    pub urls: Vec<String>,

    /// File with one URL per line; blank lines and `#` comments are skipped
    #[arg(long)]
    pub from_file: Option<PathBuf>,

    /// Fetch even when the image is already cached
    #[arg(long)]
    pub force: bool,
}

pub async fn execute(args: WarmArgs, config: Option<&Path>) -> Result<()> {
    let mut urls = args.urls;
    if let Some(path) = &args.from_file {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        urls.extend(parse_url_list(&raw));
    }
    if urls.is_empty() {
        warn!("No URLs given, nothing to warm");
        return Ok(());
    }

    let engine = CacheEngine::new(load_config(config)?).await?;
    let report = if args.force {
        engine.prefetch_images(&urls).await
    } else {
        engine.warm_cache(&urls).await
    };
    info!(
        cached = report.cached.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "Warm finished"
    );
    print_json(&report)
}

fn parse_url_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}
