//! Show or write the effective configuration.

use std::path::PathBuf;

use mememaker_common::config::{config_file_path, AppConfig};

pub fn run(config: &AppConfig, path: Option<PathBuf>, write: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);

    if write {
        config
            .save_to(&path)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))?;
        println!("Wrote config: {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
