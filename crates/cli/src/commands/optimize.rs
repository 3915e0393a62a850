use super::{load_config, print_json};
use anyhow::{bail, Context, Result};
use clap::Args;
use imgcache_cache::CacheEngine;
use imgcache_core::ImageFormat;
use imgcache_optimize::{
    cache_result, BatchCoordinator, BatchFailure, CancellationToken, OptimizationOptions,
    OptimizationPipeline, SizeVariant, SourceImage,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Source images
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output format; repeat for several (default: webp and jpeg)
    #[arg(short, long = "format")]
    pub formats: Vec<ImageFormat>,

    /// Size as WIDTHxHEIGHT[:label]; repeat for several
    #[arg(short, long = "size", value_parser = parse_size)]
    pub sizes: Vec<SizeVariant>,

    /// JSON file with pipeline options; flags override it
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Stretch to the target size instead of cover-cropping
    #[arg(long)]
    pub stretch: bool,

    /// Write variants and thumbnails into this directory
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Store variants and thumbnails in the configured cache
    #[arg(long)]
    pub cache: bool,

    /// Images processed at once
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,
}

#[derive(Serialize)]
struct Report<'a> {
    results: Vec<Summary<'a>>,
    failures: &'a [BatchFailure],
}

#[derive(Serialize)]
struct Summary<'a> {
    source: &'a str,
    variants: usize,
    thumbnails: usize,
    omitted: usize,
    original_bytes: u64,
    total_savings: i64,
    processing_time_ms: u64,
}

pub async fn execute(args: OptimizeArgs, config: Option<&Path>) -> Result<()> {
    let options = build_options(&args)?;

    let mut sources = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        sources.push(SourceImage::new(path.display().to_string(), data));
    }

    let coordinator =
        BatchCoordinator::new(OptimizationPipeline::new()).with_concurrency(args.concurrency);
    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after current derivations");
                cancel.cancel();
            }
        })
    };
    let outcome = coordinator.optimize_batch(sources, &options, &cancel).await;
    ctrl_c.abort();

    if let Some(dir) = &args.out_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
        for result in &outcome.results {
            for artifact in result.variants.iter().chain(&result.thumbnails) {
                let target = dir.join(&artifact.path);
                tokio::fs::write(&target, &artifact.data)
                    .await
                    .with_context(|| format!("failed to write {}", target.display()))?;
            }
        }
        info!(dir = %dir.display(), "Wrote derived images");
    }

    if args.cache {
        let engine = CacheEngine::new(load_config(config)?).await?;
        let mut stored = 0;
        for result in &outcome.results {
            stored += cache_result(&engine, result).await?.len();
        }
        info!(entries = stored, "Cached derived images");
    }

    let summaries: Vec<Summary<'_>> = outcome
        .results
        .iter()
        .map(|r| Summary {
            source: &r.source_name,
            variants: r.variants.len(),
            thumbnails: r.thumbnails.len(),
            omitted: r.omitted.len(),
            original_bytes: r.original_size_bytes,
            total_savings: r.total_savings,
            processing_time_ms: r.processing_time_ms,
        })
        .collect();
    print_json(&Report {
        results: summaries,
        failures: &outcome.failures,
    })?;

    if outcome.results.is_empty() {
        bail!("no image could be optimized");
    }
    Ok(())
}

fn build_options(args: &OptimizeArgs) -> Result<OptimizationOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid options in {}", path.display()))?
        }
        None => OptimizationOptions::default(),
    };
    if !args.formats.is_empty() {
        options.formats = args.formats.clone();
    }
    if !args.sizes.is_empty() {
        options.sizes = args.sizes.clone();
    }
    if args.stretch {
        options.maintain_aspect_ratio = false;
    }
    Ok(options)
}

/// `800x600:tablet`, or `800x600` labelled by its dimensions
fn parse_size(raw: &str) -> std::result::Result<SizeVariant, String> {
    let (dims, label) = match raw.split_once(':') {
        Some((dims, label)) if !label.is_empty() => (dims, label.to_string()),
        Some(_) => return Err(format!("empty label in '{raw}'")),
        None => (raw, raw.to_string()),
    };
    let (w, h) = dims
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{dims}'"))?;
    let width: u32 = w.trim().parse().map_err(|_| format!("bad width '{w}'"))?;
    let height: u32 = h.trim().parse().map_err(|_| format!("bad height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("'{dims}' has a zero dimension"));
    }
    let size = SizeVariant::new(width, height, label);
    if !size.has_safe_label() {
        return Err(format!("label '{}' must be letters, digits, '-', '_' or '.'", size.label));
    }
    Ok(size)
}
