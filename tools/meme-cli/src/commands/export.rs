//! Write a flattened meme to a PNG file.

use std::io::Write;
use std::path::PathBuf;

use mememaker_common::config::AppConfig;
use mememaker_render_engine::export::{ExportOptions, ProgressCallback, RenderStage};

use super::{short_id, Workspace};

pub async fn run(
    config: &AppConfig,
    query: &str,
    output: Option<PathBuf>,
    guides: bool,
) -> anyhow::Result<()> {
    let workspace = Workspace::open(config)?;
    let meme = workspace.find(query)?.clone();

    let output_path = output.unwrap_or_else(|| {
        let stem: String = meme
            .title()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        let stem = stem.trim_matches('-');
        let stem = if stem.is_empty() { "meme" } else { stem };
        PathBuf::from(format!("{stem}-{}.png", short_id(meme.id())))
    });

    println!("Exporting meme: {}", meme.title());
    println!("  Output: {}", output_path.display());

    let mut options = ExportOptions::new(&output_path);
    options.guides = guides;

    let progress_cb: ProgressCallback = Box::new(|p| {
        if p.stage == RenderStage::Complete || p.stage == RenderStage::Failed {
            return;
        }
        print!(
            "\r  Progress: {:.0}% ({:?}, {}/{} layers)  ",
            p.progress * 100.0,
            p.stage,
            p.layers_done,
            p.total_layers,
        );
        std::io::stdout().flush().ok();
    });

    let service = workspace.render_service();
    match service
        .export(&meme, workspace.canvas(), options, Some(progress_cb))
        .await
    {
        Ok(path) => {
            println!("\nExport complete: {}", path.display());
            Ok(())
        }
        Err(e) => {
            println!("\nExport failed: {e}");
            Err(e.into())
        }
    }
}
