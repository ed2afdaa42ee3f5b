//! List font families and where they load from.

use mememaker_common::config::AppConfig;
use mememaker_render_engine::FontCatalog;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = FontCatalog::new(config.fonts.clone());

    println!("Fonts (default: {}):", config.fonts.default_family);
    for family in catalog.offered() {
        let status = match catalog.locate(family) {
            Some(path) if catalog.is_available(family) => path.display().to_string(),
            Some(path) => format!("unreadable ({})", path.display()),
            None => "not installed, falls back to default".to_string(),
        };
        println!("  {family:<16} {status}");
    }
    Ok(())
}
