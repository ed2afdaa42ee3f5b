//! Create a meme from a background image.

use std::path::PathBuf;

use mememaker_common::config::AppConfig;
use mememaker_editor::EditorSession;
use mememaker_meme_model::source::FileImageSource;

use super::Workspace;

pub async fn run(
    config: &AppConfig,
    background: PathBuf,
    title: String,
) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(config)?;
    let mut session = EditorSession::new(config.editor.clone());

    session
        .pick_background(&mut FileImageSource::new(&background))
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", background.display()))?;
    session.set_title(title);

    let record = workspace.save(&mut session).await?;
    println!("Created meme: {}", record.title());
    println!("  ID: {}", record.id());
    Ok(())
}
