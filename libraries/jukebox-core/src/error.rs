/// Core error types for the jukebox
use thiserror::Error;

/// Result type alias using `JukeboxError`
pub type Result<T> = std::result::Result<T, JukeboxError>;

/// Core error type shared across the jukebox crates
#[derive(Error, Debug)]
pub enum JukeboxError {
    /// Audio decoding/output errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// Metadata parsing errors
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Output device errors; carries the device's own message
    #[error("Device error: {0}")]
    Device(String),
}

impl JukeboxError {
    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Create a metadata error
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    /// Create an output device error
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    /// The underlying message, without the category prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::Audio(msg) | Self::Metadata(msg) | Self::Device(msg) => msg,
        }
    }
}
