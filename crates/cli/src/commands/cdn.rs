use super::load_config;
use anyhow::Result;
use clap::Args;
use imgcache_cache::{build_cdn_url, Transformations};
use imgcache_core::ImageFormat;
use std::path::Path;

#[derive(Args, Debug)]
pub struct CdnUrlArgs {
    /// Asset identifier, e.g. `products/boot-42`
    pub image_id: String,

    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    #[arg(short, long)]
    pub quality: Option<u8>,

    #[arg(short, long)]
    pub format: Option<ImageFormat>,

    /// Provider crop mode, e.g. `fill`
    #[arg(long)]
    pub crop: Option<String>,

    /// Overrides the configured CDN base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

impl CdnUrlArgs {
    fn transformations(&self) -> Option<Transformations> {
        let t = Transformations {
            width: self.width,
            height: self.height,
            quality: self.quality,
            format: self.format,
            crop: self.crop.clone(),
        };
        (t != Transformations::default()).then_some(t)
    }
}

pub fn execute(args: CdnUrlArgs, config: Option<&Path>) -> Result<()> {
    let base = match &args.base_url {
        Some(base) => base.clone(),
        None => load_config(config)?.cdn_base_url,
    };
    let url = build_cdn_url(&base, &args.image_id, args.transformations().as_ref());
    println!("{url}");
    Ok(())
}
