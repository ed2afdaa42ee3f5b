//! Add an image overlay.

use std::path::PathBuf;

use mememaker_common::config::AppConfig;
use mememaker_meme_model::source::FileImageSource;

use super::Workspace;

pub async fn run(config: &AppConfig, query: &str, file: PathBuf) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(config)?;
    let mut session = workspace.edit(query)?;

    let layer = session
        .pick_overlay(&mut FileImageSource::new(&file))
        .map_err(|e| anyhow::anyhow!("Failed to add {}: {e}", file.display()))?
        .ok_or_else(|| anyhow::anyhow!("No image picked"))?;

    workspace.save(&mut session).await?;
    println!("Added image layer: {layer}");
    Ok(())
}
