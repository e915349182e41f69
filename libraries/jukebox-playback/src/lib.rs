//! Folder Jukebox - Playback Control
//!
//! Everything between a button press and the decode pump:
//! - Per-folder play history (bounded, oldest evicted first)
//! - Biased shuffle and history-aware track selection
//! - Session controller (stop handoff, step back, forward loop)
//! - Short/long press classification
//!
//! # Architecture
//!
//! `jukebox-playback` never touches audio hardware or codecs. Decoding and
//! output are provided through the `TrackPlayer` trait from `jukebox-core`,
//! so the controller can be driven by a scripted player in tests.
//!
//! # Example: Track Selection
//!
//! ```rust,no_run
//! use jukebox_playback::{HistoryQueue, TrackSelector};
//! use std::path::Path;
//!
//! let mut selector = TrackSelector::new();
//! let mut history = HistoryQueue::new(50);
//!
//! let selection = selector.select(Path::new("/music/rock"), &mut history)?;
//! history.push(selection.track().name.clone());
//! # Ok::<(), jukebox_playback::PlaybackError>(())
//! ```

mod controller;
mod error;
pub mod history;
mod press;
pub mod selector;
pub mod shuffle;
pub mod types;

// Public exports
pub use controller::SessionController;
pub use error::{PlaybackError, Result};
pub use history::{HistoryMap, HistoryQueue, DEFAULT_HISTORY_CAPACITY};
pub use press::{PressClassifier, DEFAULT_LONG_PRESS};
pub use selector::{FolderScan, Selection, TrackSelector};
pub use types::{Command, ControllerConfig, PlaybackMode, PressKind, SessionEnd, SessionPhase};
