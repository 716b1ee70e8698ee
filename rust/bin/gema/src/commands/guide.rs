//! Download of the guide to technical locations.

use std::path::Path;

use anyhow::Result;

use crate::commands::{anonymous_service, current_context};
use crate::config::ClientConfig;

/// Save the guide PDF into `out_dir` and mark it as seen on the current
/// context, so `gema login` stops suggesting it.
pub async fn download(out_dir: &Path, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    let ctx = current_context(&config)?.clone();

    let service = anonymous_service(&ctx)?;
    let guide = service.client().download_guide().await?;
    let path = guide.save_to(out_dir)?;

    if let Some(ctx) = config.current_mut() {
        ctx.guide_seen = true;
    }
    config.save(client_config_path)?;
    println!("Saved {}.", path.display());
    Ok(())
}
