//! List saved memes.

use mememaker_common::config::AppConfig;

use super::{short_id, Workspace};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let workspace = Workspace::open(config)?;

    if workspace.library.is_empty() {
        println!("No memes saved in {}", config.library_dir.display());
        return Ok(());
    }

    for meme in workspace.library.iter() {
        let size = meme
            .base_image()
            .and_then(|b| b.dimensions().ok())
            .map(|(w, h)| format!("{w}x{h}"))
            .unwrap_or_else(|| "no background".to_string());
        println!(
            "{}  {:<24}  {:>2} layers  {}",
            short_id(meme.id()),
            meme.title(),
            meme.layer_count(),
            size
        );
    }
    Ok(())
}
