//! Folder Jukebox Core
//!
//! Platform-agnostic types, traits, and error handling shared by the
//! playback engine, the decoders and the host binary.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackFormat`, `PcmBuffer`, `OutputSpec`
//! - **Session Signals**: the stop/pause channel pair through which a running
//!   session is interrupted
//! - **Collaborator Traits**: `TrackPlayer`, `AudioSink`, `SinkFactory`,
//!   `StatusReporter`, `DeviceControl`, `TrackInfoReader`
//! - **Error Handling**: Unified `JukeboxError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use jukebox_core::{signal_pair, SessionSignal, Track, TrackFormat};
//! use std::path::Path;
//!
//! let track = Track::in_folder(Path::new("/music"), "song.flac").unwrap();
//! assert_eq!(track.format, TrackFormat::Lossless);
//!
//! let (handle, signals) = signal_pair(1);
//! handle.request_stop();
//! assert_eq!(signals.poll(), Some(SessionSignal::Stop));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod signals;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{JukeboxError, Result};
pub use signals::{signal_pair, SessionSignal, SessionSignals, SignalHandle};
pub use traits::{
    AudioSink, DeviceControl, SinkFactory, StatusReporter, TrackInfoReader, TrackPlayer,
};
pub use types::{
    ArtworkData, OutputSpec, PcmBuffer, SampleWidth, SinkWriteError, Track, TrackFormat,
    TrackInfo, TrackOutcome,
};
