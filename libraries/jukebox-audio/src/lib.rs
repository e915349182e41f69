//! Folder Jukebox Audio
//!
//! Decoding and output for the folder jukebox.
//!
//! This crate provides:
//! - Block decoders via Symphonia (MP3 as 16-bit chunks, FLAC at native width)
//! - The decode pump that plays one track and honours stop/pause signals
//! - A CPAL output sink, opened lazily once the stream format is known
//!
//! # Example: Playing a Track
//!
//! ```rust,no_run
//! use jukebox_audio::{CpalSinkFactory, DecodePump, PumpConfig};
//! use jukebox_core::{
//!     signal_pair, DeviceControl, StatusReporter, Track, TrackInfo, TrackInfoReader, TrackPlayer,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct Quiet;
//!
//! impl StatusReporter for Quiet {
//!     fn report_status(&self, _: &str) {}
//!     fn report_now_playing(&self, _: &str) {}
//!     fn report_artwork(&self, _: &[u8], _: &str) {}
//! }
//!
//! impl DeviceControl for Quiet {
//!     fn unmute_output(&self) {}
//!     fn stop_other_audio(&self) {}
//! }
//!
//! impl TrackInfoReader for Quiet {
//!     fn read(&self, _: &Track) -> jukebox_core::Result<TrackInfo> {
//!         Ok(TrackInfo::default())
//!     }
//! }
//!
//! let quiet = Arc::new(Quiet);
//! let pump = DecodePump::new(
//!     CpalSinkFactory::new(),
//!     quiet.clone(),
//!     quiet.clone(),
//!     quiet,
//!     PumpConfig::default(),
//! );
//!
//! let (_handle, signals) = signal_pair(1);
//! let track = Track::single_file(Path::new("/music/song.flac"));
//! let outcome = pump.play(&track, &signals);
//! println!("{:?}", outcome);
//! ```

mod decoder;
mod error;
mod output;
mod pump;

pub use decoder::{
    BlockDecoder, DecodeStep, DecoderOpener, LosslessDecoder, LossyDecoder, SymphoniaOpener,
    DEFAULT_LOSSY_CHUNK_FRAMES,
};
pub use error::{AudioError, Result};
pub use output::{CpalSink, CpalSinkFactory};
pub use pump::{DecodePump, PumpConfig};
