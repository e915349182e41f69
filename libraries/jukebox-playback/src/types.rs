//! Command and session types

use crate::history::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Button press classification resolved by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressKind {
    /// Released before the long-press window elapsed
    Short,
    /// Still held when the long-press window elapsed
    Long,
}

/// What a session does first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Pick random unplayed tracks
    Forward,
    /// Replay the previous track from history, then continue forward
    StepBack,
}

impl From<PressKind> for PlaybackMode {
    fn from(press: PressKind) -> Self {
        match press {
            PressKind::Short => PlaybackMode::Forward,
            PressKind::Long => PlaybackMode::StepBack,
        }
    }
}

/// Inbound playback command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// How the button was pressed
    pub press: PressKind,
    /// Folder to shuffle, or a single file to play once
    pub source: PathBuf,
}

impl Command {
    /// Create a command
    pub fn new(press: PressKind, source: impl Into<PathBuf>) -> Self {
        Self {
            press,
            source: source.into(),
        }
    }

    /// Short press: start forward playback
    pub fn forward(source: impl AsRef<Path>) -> Self {
        Self::new(PressKind::Short, source.as_ref())
    }

    /// Long press: step back one track
    pub fn step_back(source: impl AsRef<Path>) -> Self {
        Self::new(PressKind::Long, source.as_ref())
    }

    /// Playback mode this command starts
    pub fn mode(&self) -> PlaybackMode {
        self.press.into()
    }
}

/// Controller state as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session
    Idle,
    /// A new session is waiting for the previous one to vacate the device
    AwaitingHandoff,
    /// A session is playing
    Playing(PlaybackMode),
    /// A session is paused
    Paused(PlaybackMode),
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Step-back found fewer than two history entries
    EndOfQueue,
    /// Folder had no entries
    EmptyFolder(PathBuf),
    /// Every track was played and history ran dry
    NoUnplayedTracks(PathBuf),
    /// Folder listing failed
    FolderUnreadable(String),
    /// Stopped by a newer command or an external stop
    Stopped,
    /// Output device failed
    DeviceFailed(String),
    /// Explicit file played once
    SingleShotComplete,
    /// Every recent attempt failed to open or decode
    NoPlayableTracks,
    /// Session task panicked
    Crashed(String),
}

impl SessionEnd {
    /// The one status line reported when the session exits
    pub fn message(&self) -> String {
        match self {
            SessionEnd::EndOfQueue => "end of queue".to_string(),
            SessionEnd::EmptyFolder(folder) => format!("folder {} is empty", folder.display()),
            SessionEnd::NoUnplayedTracks(_) => "cannot find any unplayed files - giving up".to_string(),
            SessionEnd::FolderUnreadable(msg) => format!("cannot read folder: {}", msg),
            SessionEnd::Stopped => "playback stopped".to_string(),
            SessionEnd::DeviceFailed(msg) => msg.clone(),
            SessionEnd::SingleShotComplete => "playback finished".to_string(),
            SessionEnd::NoPlayableTracks => "cannot play any files - giving up".to_string(),
            SessionEnd::Crashed(msg) => format!("playback failed: {}", msg),
        }
    }
}

/// Session controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// History entries kept per folder
    pub history_capacity: usize,

    /// How long a new session waits for the previous one to release the device
    pub handoff_grace: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            handoff_grace: Duration::from_millis(200),
        }
    }
}
