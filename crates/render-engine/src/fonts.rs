//! Font lookup for text layers.
//!
//! Families resolve through the explicit `fonts.files` map first, then by
//! scanning the configured font directories for a file whose name matches
//! the family. A family that cannot be loaded falls back to the configured
//! default family, then to the first loadable font in the font directories.
//! Loaded fonts are cached for the life of the catalog.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ab_glyph::FontArc;

use mememaker_common::config::FontConfig;
use mememaker_common::error::{MemeError, MemeResult};

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];
const MAX_SCAN_DEPTH: usize = 4;
/// Cache key of the last-resort font. Never produced by `normalize`.
const ANY_FONT_KEY: &str = "*";

/// Resolves font family names to loaded fonts.
#[derive(Debug)]
pub struct FontCatalog {
    config: FontConfig,
    cache: Mutex<HashMap<String, Option<FontArc>>>,
}

impl FontCatalog {
    pub fn new(config: FontConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    /// Families offered to the user in the font picker.
    pub fn offered(&self) -> &[String] {
        &self.config.offered
    }

    /// Register an already loaded font under `family`.
    pub fn insert(&self, family: impl Into<String>, font: FontArc) {
        self.lock_cache().insert(normalize(&family.into()), Some(font));
    }

    /// The font for `family`, falling back to the default family and then to
    /// any font in the configured directories.
    ///
    /// `FontUnavailable` only when no font file loads at all.
    pub fn resolve(&self, family: &str) -> MemeResult<FontArc> {
        if let Some(font) = self.load(family) {
            return Ok(font);
        }

        let fallback = &self.config.default_family;
        if normalize(fallback) != normalize(family) {
            if let Some(font) = self.load(fallback) {
                tracing::warn!(
                    requested = family,
                    fallback = %fallback,
                    "Font unavailable, using default family"
                );
                return Ok(font);
            }
        }

        if let Some(font) = self.load_any() {
            tracing::warn!(
                requested = family,
                default_family = %fallback,
                "Font and default family unavailable, using first installed font"
            );
            return Ok(font);
        }

        Err(MemeError::font_unavailable(family))
    }

    /// Whether `family` resolves without falling back.
    pub fn is_available(&self, family: &str) -> bool {
        self.load(family).is_some()
    }

    /// Path of the file `family` would be loaded from.
    pub fn locate(&self, family: &str) -> Option<PathBuf> {
        if let Some(path) = self
            .config
            .files
            .iter()
            .find(|(name, _)| normalize(name) == normalize(family))
            .map(|(_, path)| path.clone())
        {
            return Some(path);
        }

        let wanted = normalize(family);
        if wanted.is_empty() {
            return None;
        }
        self.config
            .dirs
            .iter()
            .find_map(|dir| scan_dir(dir, &wanted, 0))
    }

    fn load(&self, family: &str) -> Option<FontArc> {
        let key = normalize(family);
        if let Some(cached) = self.lock_cache().get(&key) {
            return cached.clone();
        }

        let font = self.locate(family).and_then(|path| read_font(&path));
        self.lock_cache().insert(key, font.clone());
        font
    }

    /// First font file in the configured directories that parses, in the
    /// same sorted order as the family scan.
    fn load_any(&self) -> Option<FontArc> {
        if let Some(cached) = self.lock_cache().get(ANY_FONT_KEY) {
            return cached.clone();
        }

        let font = self
            .config
            .dirs
            .iter()
            .find_map(|dir| scan_any(dir, 0));
        self.lock_cache().insert(ANY_FONT_KEY.to_string(), font.clone());
        font
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Option<FontArc>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_font(path: &Path) -> Option<FontArc> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read font file");
            return None;
        }
    };
    match FontArc::try_from_vec(bytes) {
        Ok(font) => {
            tracing::debug!(path = %path.display(), "Loaded font");
            Some(font)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Invalid font file");
            None
        }
    }
}

fn scan_dir(dir: &Path, wanted: &str, depth: usize) -> Option<PathBuf> {
    if depth > MAX_SCAN_DEPTH {
        return None;
    }
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    let mut subdirs = Vec::new();
    for path in entries {
        if path.is_dir() {
            subdirs.push(path);
        } else if is_font_file(&path) && file_matches(&path, wanted) {
            return Some(path);
        }
    }
    subdirs
        .iter()
        .find_map(|sub| scan_dir(sub, wanted, depth + 1))
}

fn scan_any(dir: &Path, depth: usize) -> Option<FontArc> {
    if depth > MAX_SCAN_DEPTH {
        return None;
    }
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    let mut subdirs = Vec::new();
    for path in entries {
        if path.is_dir() {
            subdirs.push(path);
        } else if is_font_file(&path) {
            if let Some(font) = read_font(&path) {
                return Some(font);
            }
        }
    }
    subdirs.iter().find_map(|sub| scan_any(sub, depth + 1))
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// `Times New Roman` matches `TimesNewRoman.ttf`, `times_new_roman.ttf`,
/// `TimesNewRoman-Regular.ttf`, and `TimesNewRomanMT.ttf`.
fn file_matches(path: &Path, wanted: &str) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let stem = normalize(stem);
    stem == wanted
        || stem
            .strip_prefix(wanted)
            .is_some_and(|rest| matches!(rest, "regular" | "mt" | "roman" | "book"))
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
