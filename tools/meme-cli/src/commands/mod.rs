//! Subcommand implementations and the library plumbing they share.

pub mod add_image;
pub mod add_text;
pub mod background;
pub mod clear;
pub mod config;
pub mod delete;
pub mod export;
pub mod fonts;
pub mod info;
pub mod list;
pub mod new;
pub mod remove_layer;
pub mod rename;
pub mod transform;

use mememaker_common::config::AppConfig;
use mememaker_editor::EditorSession;
use mememaker_meme_model::geometry::CanvasSize;
use mememaker_meme_model::layer::LayerId;
use mememaker_meme_model::library::{JsonFileStore, MemeLibrary};
use mememaker_meme_model::meme::Meme;
use mememaker_render_engine::{Compositor, FontCatalog, RenderService};

/// The on-disk library plus everything needed to edit and save memes in it.
pub struct Workspace {
    pub config: AppConfig,
    store: JsonFileStore,
    pub library: MemeLibrary,
}

impl Workspace {
    pub fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let store = JsonFileStore::new(&config.library_dir);
        let library = MemeLibrary::load(&store)
            .map_err(|e| anyhow::anyhow!("Failed to load library: {e}"))?;
        Ok(Self {
            config: config.clone(),
            store,
            library,
        })
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(
            self.config.editor.canvas_width,
            self.config.editor.canvas_height,
        )
    }

    pub fn find(&self, query: &str) -> anyhow::Result<&Meme> {
        self.library
            .find_by_prefix(query)
            .map_err(|e| anyhow::anyhow!("{e}"))
    }

    /// Open a saved meme for editing.
    pub fn edit(&self, query: &str) -> anyhow::Result<EditorSession> {
        let meme = self.find(query)?.clone();
        Ok(EditorSession::open(meme, self.config.editor.clone()))
    }

    pub fn render_service(&self) -> RenderService {
        RenderService::new(Compositor::new(FontCatalog::new(self.config.fonts.clone())))
    }

    /// Flatten the session's meme and write it to the library.
    pub async fn save(&mut self, session: &mut EditorSession) -> anyhow::Result<Meme> {
        let service = self.render_service();
        let record = session
            .save(&service, None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to save meme: {e}"))?;
        self.store_record(record.clone())?;
        Ok(record)
    }

    /// Write a meme to the library as is, without re-rendering.
    pub fn store_record(&mut self, meme: Meme) -> anyhow::Result<()> {
        self.library.upsert(meme);
        self.persist()
    }

    pub fn persist(&mut self) -> anyhow::Result<()> {
        self.library
            .persist(&mut self.store)
            .map_err(|e| anyhow::anyhow!("Failed to write library: {e}"))
    }
}

/// Resolve a layer by paint-order index or by id prefix.
pub fn resolve_layer(meme: &Meme, query: &str) -> anyhow::Result<LayerId> {
    let ids = meme.layer_ids();
    if let Ok(index) = query.parse::<usize>() {
        if let Some(id) = ids.get(index) {
            return Ok(*id);
        }
    }

    let needle = query.trim().to_ascii_lowercase();
    let matches: Vec<LayerId> = ids
        .into_iter()
        .filter(|id| !needle.is_empty() && id.to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(anyhow::anyhow!("No layer matches '{query}'")),
        many => Err(anyhow::anyhow!("'{query}' matches {} layers", many.len())),
    }
}

/// First eight characters of an id, for listings.
pub fn short_id(id: impl ToString) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mememaker_common::config::EditorDefaults;
    use mememaker_meme_model::color::ColorComponents;

    fn png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_resolve_layer_by_index_and_prefix() {
        let canvas = CanvasSize::new(100.0, 100.0);
        let defaults = EditorDefaults::default();
        let mut meme = Meme::create("t", &png()).unwrap();
        let text = meme
            .add_text_layer("x", ColorComponents::BLACK, "Arial", canvas, &defaults)
            .unwrap();
        let image = meme.add_image_layer(&png(), canvas, &defaults).unwrap();

        assert_eq!(resolve_layer(&meme, "0").unwrap(), image);
        assert_eq!(resolve_layer(&meme, "1").unwrap(), text);
        assert_eq!(
            resolve_layer(&meme, &text.to_string()[..8].to_ascii_uppercase()).unwrap(),
            text
        );
        assert!(resolve_layer(&meme, "").is_err());
        assert!(resolve_layer(&meme, "zz").is_err());
    }

    #[test]
    fn test_workspace_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.library_dir = dir.path().join("library");

        let mut workspace = Workspace::open(&config).unwrap();
        assert!(workspace.library.is_empty());

        let meme = Meme::new("draft");
        let id = meme.id();
        workspace.store_record(meme).unwrap();

        let reopened = Workspace::open(&config).unwrap();
        assert_eq!(reopened.find(&short_id(id)).unwrap().title(), "draft");
    }
}
