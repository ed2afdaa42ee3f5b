//! Replace a meme's background image.

use std::path::PathBuf;

use mememaker_common::config::AppConfig;
use mememaker_meme_model::source::FileImageSource;

use super::Workspace;

pub async fn run(config: &AppConfig, query: &str, file: PathBuf) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(config)?;
    let mut session = workspace.edit(query)?;

    session
        .pick_background(&mut FileImageSource::new(&file))
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", file.display()))?;

    let record = workspace.save(&mut session).await?;
    println!("Background replaced for {}", record.title());
    Ok(())
}
