//! Error types for playback management

use std::path::PathBuf;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Folder has no entries at all
    #[error("Folder {0} is empty")]
    EmptyFolder(PathBuf),

    /// Every eligible track is in history and history is exhausted
    #[error("Cannot find any unplayed files in {0}")]
    NoUnplayedTracks(PathBuf),

    /// Step-back found fewer than two history entries
    #[error("End of queue")]
    EndOfQueue,

    /// A command arrived while another was still handing off
    #[error("Command rejected: session {pending} is still handing off")]
    OverlappingCommandRejected {
        /// Session that owns the pending handoff
        pending: u64,
    },

    /// Folder listing failed
    #[error("Cannot read folder {path}: {source}")]
    FolderRead {
        /// Folder that was listed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// No async runtime to spawn the session on
    #[error("No runtime available to run the session")]
    NoRuntime,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
