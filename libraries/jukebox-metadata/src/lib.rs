//! Folder Jukebox Metadata
//!
//! Builds the now-playing text ("title - artist - album", printable ASCII
//! only) and extracts embedded cover art, using lofty.

mod artwork;
mod display;
mod error;
mod reader;

pub use artwork::{cover_from_tag, MAX_ARTWORK_SIZE};
pub use display::{display_text, strip_control_and_extended};
pub use error::{MetadataError, Result};
pub use reader::LoftyTrackInfoReader;
