//! MemeMaker CLI: command-line interface for building and exporting memes.
//!
//! Usage:
//!   meme new <BACKGROUND>        Create a meme from a background image
//!   meme list                    List saved memes
//!   meme info <ID>               Show a meme and its layers
//!   meme add-image <ID> <FILE>   Add an image overlay
//!   meme add-text <ID> <TEXT>    Add a text overlay
//!   meme transform <ID> <LAYER>  Move, rotate, or scale a layer
//!   meme export <ID>             Write the flattened meme to a PNG
//!   meme fonts                   List font families
//!   meme config [--write]        Show or write the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mememaker_common::config::AppConfig;
use mememaker_meme_model::geometry::CanvasSize;

mod commands;

#[derive(Parser)]
#[command(
    name = "meme",
    about = "Layer images and text over a picture and save it as a meme",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preview canvas size that layer transforms are relative to, as WxH
    #[arg(long, global = true, value_parser = parse_canvas)]
    canvas: Option<CanvasSize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new meme from a background image
    New {
        /// Background image file
        background: PathBuf,

        /// Meme title
        #[arg(short, long, default_value = "")]
        title: String,
    },

    /// List saved memes
    List,

    /// Show a meme and its layers
    Info {
        /// Meme id or unique id prefix
        id: String,
    },

    /// Replace a meme's background image
    Background {
        /// Meme id or unique id prefix
        id: String,

        /// Background image file
        file: PathBuf,
    },

    /// Add an image overlay
    AddImage {
        /// Meme id or unique id prefix
        id: String,

        /// Overlay image file
        file: PathBuf,
    },

    /// Add a text overlay
    AddText {
        /// Meme id or unique id prefix
        id: String,

        /// Text to draw; use \n for line breaks
        text: String,

        /// Text color as #rrggbb or #rrggbbaa
        #[arg(long)]
        color: Option<String>,

        /// Font family
        #[arg(long)]
        font: Option<String>,
    },

    /// Move, rotate, or scale a layer as one gesture per channel
    Transform {
        /// Meme id or unique id prefix
        id: String,

        /// Layer index in paint order, or layer id prefix
        layer: String,

        /// Horizontal drag in canvas units
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dx: f64,

        /// Vertical drag in canvas units
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dy: f64,

        /// Rotation in degrees, clockwise
        #[arg(long, allow_hyphen_values = true)]
        rotate: Option<f64>,

        /// Pinch scale factor
        #[arg(long)]
        scale: Option<f64>,
    },

    /// Remove one layer
    RemoveLayer {
        /// Meme id or unique id prefix
        id: String,

        /// Layer index in paint order, or layer id prefix
        layer: String,
    },

    /// Set a meme's title
    Rename {
        /// Meme id or unique id prefix
        id: String,

        /// New title
        title: String,
    },

    /// Write the flattened meme to a PNG file
    Export {
        /// Meme id or unique id prefix
        id: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Outline each layer's box
        #[arg(long)]
        guides: bool,
    },

    /// Remove the background, every layer, and the title
    Clear {
        /// Meme id or unique id prefix
        id: String,
    },

    /// Delete a meme from the library
    Delete {
        /// Meme id or unique id prefix
        id: String,
    },

    /// List font families and where they load from
    Fonts,

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        write: bool,
    },
}

fn parse_canvas(value: &str) -> Result<CanvasSize, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{value}'"))?;
    let width: f64 = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: f64 = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if !(width > 0.0 && height > 0.0) {
        return Err("canvas dimensions must be positive".to_string());
    }
    Ok(CanvasSize::new(width, height))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    mememaker_common::logging::init_logging(&config.logging);

    if let Some(canvas) = cli.canvas {
        config.editor.canvas_width = canvas.width;
        config.editor.canvas_height = canvas.height;
    }

    match cli.command {
        Commands::New { background, title } => commands::new::run(&config, background, title).await,
        Commands::List => commands::list::run(&config),
        Commands::Info { id } => commands::info::run(&config, &id),
        Commands::Background { id, file } => commands::background::run(&config, &id, file).await,
        Commands::AddImage { id, file } => commands::add_image::run(&config, &id, file).await,
        Commands::AddText {
            id,
            text,
            color,
            font,
        } => commands::add_text::run(&config, &id, text, color, font).await,
        Commands::Transform {
            id,
            layer,
            dx,
            dy,
            rotate,
            scale,
        } => commands::transform::run(&config, &id, &layer, dx, dy, rotate, scale).await,
        Commands::RemoveLayer { id, layer } => {
            commands::remove_layer::run(&config, &id, &layer).await
        }
        Commands::Rename { id, title } => commands::rename::run(&config, &id, title).await,
        Commands::Export { id, output, guides } => {
            commands::export::run(&config, &id, output, guides).await
        }
        Commands::Clear { id } => commands::clear::run(&config, &id),
        Commands::Delete { id } => commands::delete::run(&config, &id),
        Commands::Fonts => commands::fonts::run(&config),
        Commands::Config { write } => commands::config::run(&config, cli.config, write),
    }
}
