//! Remove one layer.

use mememaker_common::config::AppConfig;

use super::{resolve_layer, Workspace};

pub async fn run(config: &AppConfig, query: &str, layer: &str) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(config)?;
    let mut session = workspace.edit(query)?;
    let layer = resolve_layer(session.meme(), layer)?;

    session.remove_layer(layer)?;
    workspace.save(&mut session).await?;
    println!("Removed layer: {layer}");
    Ok(())
}
