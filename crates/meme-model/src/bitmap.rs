//! Immutable encoded bitmaps owned by memes and layers.

use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat, ImageReader};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use mememaker_common::error::{MemeError, MemeResult};

/// Encoded image bytes (PNG unless loaded from an older record).
///
/// The bytes are shared and never mutated after construction, so cloning a
/// meme for a background render is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    bytes: Arc<[u8]>,
}

impl Bitmap {
    /// Validate picker output and normalize it to a format that keeps
    /// transparency. PNG input is kept byte for byte.
    pub fn from_encoded(bytes: &[u8]) -> MemeResult<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| MemeError::decode(format!("unreadable image data: {e}")))?;

        if matches!(image::guess_format(bytes), Ok(ImageFormat::Png)) {
            return Ok(Self::from_raw(bytes.to_vec()));
        }
        Self::from_image(&decoded)
    }

    /// Encode a decoded image as PNG.
    pub fn from_image(image: &DynamicImage) -> MemeResult<Self> {
        // PNG has no float pixel formats
        let converted;
        let encodable = match image {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                converted = DynamicImage::ImageRgba8(image.to_rgba8());
                &converted
            }
            other => other,
        };

        let mut out = Cursor::new(Vec::new());
        encodable
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| MemeError::encode(format!("png encoding failed: {e}")))?;
        Ok(Self::from_raw(out.into_inner()))
    }

    /// Wrap bytes without validating them. Used for persisted records, whose
    /// bytes were validated when they were first picked.
    pub fn from_raw(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode into pixels.
    pub fn decode(&self) -> MemeResult<DynamicImage> {
        image::load_from_memory(&self.bytes)
            .map_err(|e| MemeError::decode(format!("unreadable image data: {e}")))
    }

    /// Pixel dimensions, read from the header only.
    pub fn dimensions(&self) -> MemeResult<(u32, u32)> {
        ImageReader::new(Cursor::new(&self.bytes[..]))
            .with_guessed_format()
            .map_err(|e| MemeError::decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| MemeError::decode(e.to_string()))
    }

    fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        STANDARD.decode(encoded).map(Self::from_raw)
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Serialize for Bitmap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Bitmap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Bitmap::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for a base image that may not be picked yet. An absent
/// image is stored as an empty string, keeping `imageData` always present.
pub(crate) mod optional_empty {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Bitmap>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(bitmap) => bitmap.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Bitmap>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        if encoded.is_empty() {
            return Ok(None);
        }
        Bitmap::from_base64(&encoded)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
