//! Add a text overlay.

use mememaker_common::config::AppConfig;
use mememaker_meme_model::color::ColorComponents;

use super::Workspace;

pub async fn run(
    config: &AppConfig,
    query: &str,
    text: String,
    color: Option<String>,
    font: Option<String>,
) -> anyhow::Result<()> {
    let color = match color {
        Some(hex) => Some(
            ColorComponents::from_hex(&hex)
                .ok_or_else(|| anyhow::anyhow!("Invalid color: {hex}. Use #rrggbb or #rrggbbaa"))?,
        ),
        None => None,
    };
    let font = font.unwrap_or_else(|| config.fonts.default_family.clone());
    if !config.fonts.offered.iter().any(|f| f.eq_ignore_ascii_case(&font)) {
        tracing::warn!(font = %font, "Font is not in the offered list");
    }

    let mut workspace = Workspace::open(config)?;
    let mut session = workspace.edit(query)?;
    let layer = session
        .add_text(text.replace("\\n", "\n"), color, font)
        .map_err(|e| anyhow::anyhow!("Failed to add text: {e}"))?;

    workspace.save(&mut session).await?;
    println!("Added text layer: {layer}");
    Ok(())
}
