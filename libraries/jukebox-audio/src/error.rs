/// Audio-specific errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// Track could not be opened or probed
    #[error("error open file: {0}")]
    TrackOpen(String),

    /// Unrecoverable decode or container error
    #[error("error reading audio source: {0}")]
    Decode(String),

    /// Output device could not be opened
    #[error("error open audio sink for playback: {0}")]
    DeviceOpen(String),

    /// Output device failed while writing
    #[error("error writing audio data: {0}")]
    DeviceWrite(String),
}

impl From<AudioError> for jukebox_core::JukeboxError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::DeviceOpen(cause) | AudioError::DeviceWrite(cause) => {
                jukebox_core::JukeboxError::device(cause)
            }
            other => jukebox_core::JukeboxError::audio(other.to_string()),
        }
    }
}
