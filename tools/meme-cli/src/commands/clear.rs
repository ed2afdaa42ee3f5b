//! Remove a meme's background, layers, and title.

use mememaker_common::config::AppConfig;

use super::Workspace;

pub fn run(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(config)?;
    let mut session = workspace.edit(query)?;

    session.clear();
    // a cleared meme has nothing to render, so it is stored as a draft
    let meme = session.into_meme();
    let id = meme.id();
    workspace.store_record(meme)?;
    println!("Cleared meme: {id}");
    Ok(())
}
