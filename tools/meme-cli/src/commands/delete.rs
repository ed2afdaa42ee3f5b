//! Delete a meme from the library.

use mememaker_common::config::AppConfig;

use super::Workspace;

pub fn run(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(config)?;
    let id = workspace.find(query)?.id();

    let removed = workspace
        .library
        .remove(id)
        .ok_or_else(|| anyhow::anyhow!("No meme matches '{query}'"))?;
    workspace.persist()?;
    println!("Deleted meme: {} ({})", removed.title(), id);
    Ok(())
}
