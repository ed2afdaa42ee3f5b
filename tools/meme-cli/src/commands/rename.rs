//! Set a meme's title.

use mememaker_common::config::AppConfig;

use super::Workspace;

pub async fn run(config: &AppConfig, query: &str, title: String) -> anyhow::Result<()> {
    let mut workspace = Workspace::open(config)?;
    let mut session = workspace.edit(query)?;

    session.set_title(title);
    let record = workspace.save(&mut session).await?;
    println!("Renamed to: {}", record.title());
    Ok(())
}
