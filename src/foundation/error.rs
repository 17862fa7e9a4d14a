/// Convenience result type used across labelkit.
pub type LabelResult<T> = Result<T, LabelError>;

/// Top-level error taxonomy used by the crate's APIs.
#[derive(thiserror::Error, Debug)]
pub enum LabelError {
    /// Invalid user-provided or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Shape name not present in the static registry.
    #[error("unknown shape '{0}'")]
    UnknownShape(String),

    /// Upload bytes are not one of the accepted raster formats.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Upload exceeds the fixed byte threshold for its slot.
    #[error("upload of {actual} bytes exceeds limit of {limit} bytes")]
    SizeLimitExceeded {
        /// Maximum accepted payload size in bytes.
        limit: usize,
        /// Actual payload size in bytes.
        actual: usize,
    },

    /// Malformed or undecodable image payload.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// Persisted scene state is absent or corrupt.
    #[error("persistence read error: {0}")]
    PersistenceRead(String),

    /// Persisted scene state could not be written.
    #[error("persistence write error: {0}")]
    PersistenceWrite(String),

    /// Failure while rasterizing or encoding a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LabelError {
    /// Build a [`LabelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LabelError::ImageDecode`] value.
    pub fn image_decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    /// Build a [`LabelError::PersistenceRead`] value.
    pub fn persistence_read(msg: impl Into<String>) -> Self {
        Self::PersistenceRead(msg.into())
    }

    /// Build a [`LabelError::PersistenceWrite`] value.
    pub fn persistence_write(msg: impl Into<String>) -> Self {
        Self::PersistenceWrite(msg.into())
    }

    /// Build a [`LabelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
