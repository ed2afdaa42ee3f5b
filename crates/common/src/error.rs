//! Error types shared across MemeMaker crates.

/// Top-level error type for MemeMaker operations.
///
/// Every variant describes an operation that did not complete; callers can
/// rely on the state they passed in being left as it was.
#[derive(Debug, thiserror::Error)]
pub enum MemeError {
    /// Image bytes could not be parsed.
    #[error("Failed to decode image: {message}")]
    DecodeFailure { message: String },

    /// The compositor could not produce output bytes.
    #[error("Failed to encode image: {message}")]
    EncodeFailure { message: String },

    /// Saving or compositing was requested before a background was picked.
    #[error("Meme has no background image")]
    MissingBaseImage,

    #[error("Invalid gesture input: {message}")]
    InvalidGesture { message: String },

    #[error("Layer not found: {id}")]
    LayerNotFound { id: String },

    #[error("No usable font for family '{family}'")]
    FontUnavailable { family: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MemeError.
pub type MemeResult<T> = Result<T, MemeError>;

impl MemeError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeFailure {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::EncodeFailure {
            message: msg.into(),
        }
    }

    pub fn invalid_gesture(msg: impl Into<String>) -> Self {
        Self::InvalidGesture {
            message: msg.into(),
        }
    }

    pub fn layer_not_found(id: impl ToString) -> Self {
        Self::LayerNotFound { id: id.to_string() }
    }

    pub fn font_unavailable(family: impl Into<String>) -> Self {
        Self::FontUnavailable {
            family: family.into(),
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage {
            message: msg.into(),
        }
    }

    /// Whether the user can fix this by acting in the editor (for example by
    /// picking a background first) rather than it being a data problem.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::MissingBaseImage | Self::InvalidGesture { .. } | Self::LayerNotFound { .. }
        )
    }
}
