//! Where picked images come from.

use std::path::{Path, PathBuf};

use mememaker_common::error::MemeResult;

/// An external image picker.
///
/// `Ok(None)` means the user dismissed the picker without choosing anything,
/// which callers treat as a no-op rather than an error.
pub trait ImageSource {
    fn pick(&mut self) -> MemeResult<Option<Vec<u8>>>;
}

/// Picks the bytes of a file on disk, or nothing when no path is set.
#[derive(Debug, Clone, Default)]
pub struct FileImageSource {
    path: Option<PathBuf>,
}

impl FileImageSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// A source that always reports no selection.
    pub fn none() -> Self {
        Self::default()
    }
}

impl ImageSource for FileImageSource {
    fn pick(&mut self) -> MemeResult<Option<Vec<u8>>> {
        match &self.path {
            Some(path) => Ok(Some(std::fs::read(path)?)),
            None => Ok(None),
        }
    }
}
