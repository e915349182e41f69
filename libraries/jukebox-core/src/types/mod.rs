mod audio;
mod info;
mod track;

pub use audio::{OutputSpec, PcmBuffer, SampleWidth, SinkWriteError};
pub use info::{ArtworkData, TrackInfo};
pub use track::{Track, TrackFormat, TrackOutcome};
