//! Application configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory backing the key-value store that holds the meme library.
    pub library_dir: PathBuf,

    /// Editor defaults for new layers and the preview canvas.
    pub editor: EditorDefaults,

    /// Font lookup configuration.
    pub fonts: FontConfig,

    /// Presentation settings handed to the UI layer.
    pub appearance: AppearanceConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default sizes and values used when the editor creates something new.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    /// Preview canvas width that layer transforms are expressed against.
    pub canvas_width: f64,
    /// Preview canvas height.
    pub canvas_height: f64,

    /// Box size of a freshly added image overlay.
    pub image_layer_width: f64,
    pub image_layer_height: f64,

    /// Box size of a freshly added text overlay.
    pub text_layer_width: f64,
    pub text_layer_height: f64,

    /// Font size of a freshly added text overlay.
    pub font_size: f64,

    /// Text color of a freshly added text overlay (`#rrggbb` or `#rrggbbaa`).
    pub text_color: String,
}

/// Where fonts come from and which families the editor offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Directories scanned for `.ttf` / `.otf` files.
    pub dirs: Vec<PathBuf>,

    /// Explicit family name to font file mapping. Wins over directory scans.
    pub files: BTreeMap<String, PathBuf>,

    /// Family used when a layer's family cannot be resolved.
    pub default_family: String,

    /// Families offered by the text options picker, in display order.
    pub offered: Vec<String>,
}

/// Navigation bar styling. Passed explicitly to whatever draws the chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub navigation_background: String,
    pub title_color: String,
    pub title_font: String,
    pub title_font_size: f64,
    pub large_title_font_size: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "mememaker=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library_dir: dirs_default_library(),
            editor: EditorDefaults::default(),
            fonts: FontConfig::default(),
            appearance: AppearanceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            canvas_width: 320.0,
            canvas_height: 400.0,
            image_layer_width: 80.0,
            image_layer_height: 80.0,
            text_layer_width: 200.0,
            text_layer_height: 50.0,
            font_size: 20.0,
            text_color: "#000000".to_string(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            dirs: default_font_dirs(),
            files: BTreeMap::new(),
            default_family: "Arial".to_string(),
            offered: [
                "Arial",
                "Times New Roman",
                "Courier New",
                "Helvetica",
                "Verdana",
                "Georgia",
                "Futura",
                "Gill Sans",
                "Baskerville",
                "Palatino",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            navigation_background: "#edf9ff".to_string(),
            title_color: "#000000".to_string(),
            title_font: "Quicksand-Bold".to_string(),
            title_font_size: 18.0,
            large_title_font_size: 34.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    base.join("mememaker").join("config.json")
}

/// Default library directory.
fn dirs_default_library() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"));
    base.join("mememaker").join("library")
}

fn default_font_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        home_dir().join(".local").join("share").join("fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
    ]
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}
