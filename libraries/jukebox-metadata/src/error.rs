/// Metadata-specific errors
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Embedded picture exceeds the size limit
    #[error("Artwork too large: {0} bytes (max {1} bytes)")]
    ArtworkTooLarge(usize, usize),

    /// Lofty error
    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),
}

impl From<MetadataError> for jukebox_core::JukeboxError {
    fn from(err: MetadataError) -> Self {
        jukebox_core::JukeboxError::metadata(err.to_string())
    }
}
