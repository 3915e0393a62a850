use super::print_json;
use anyhow::{Context, Result};
use imgcache_optimize::{OptimizationPipeline, SourceImage};
use std::path::Path;

async fn read_source(path: &Path) -> Result<SourceImage> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(SourceImage::new(path.display().to_string(), data))
}

pub async fn analyze(path: &Path) -> Result<()> {
    let source = read_source(path).await?;
    let report = OptimizationPipeline::new().analyze_image(&source).await?;
    print_json(&report)
}

pub async fn assess(path: &Path) -> Result<()> {
    let source = read_source(path).await?;
    let report = OptimizationPipeline::new()
        .assess_image_quality(&source)
        .await?;
    print_json(&report)
}
