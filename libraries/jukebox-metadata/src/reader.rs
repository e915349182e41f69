/// Track info reader using lofty
use crate::artwork::cover_from_tag;
use crate::display::display_text;
use crate::error::MetadataError;
use jukebox_core::{Track, TrackInfo, TrackInfoReader};
use lofty::{ItemKey, TaggedFileExt};
use tracing::{debug, warn};

/// Reads display text and cover art with lofty
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTrackInfoReader;

impl LoftyTrackInfoReader {
    /// Create a new reader
    pub fn new() -> Self {
        Self
    }
}

impl TrackInfoReader for LoftyTrackInfoReader {
    fn read(&self, track: &Track) -> jukebox_core::Result<TrackInfo> {
        if !track.path.exists() {
            return Err(MetadataError::FileNotFound(track.path.display().to_string()).into());
        }

        let tagged_file = lofty::read_from_path(&track.path).map_err(MetadataError::from)?;

        // Get primary tag or first available tag
        let Some(tag) = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
        else {
            debug!(track = %track.name, "no tags");
            return Ok(TrackInfo {
                display: track.name.clone(),
                artwork: None,
            });
        };

        let title = tag.get_string(&ItemKey::TrackTitle);
        let artist = tag.get_string(&ItemKey::TrackArtist);
        let album = tag.get_string(&ItemKey::AlbumTitle);
        debug!(?title, ?artist, ?album, "tags");

        let mut display = display_text(title, artist, album);
        if display.is_empty() {
            display = track.name.clone();
        }

        let artwork = match cover_from_tag(tag) {
            Ok(artwork) => artwork,
            Err(e) => {
                warn!(track = %track.name, error = %e, "skipping artwork");
                None
            }
        };

        Ok(TrackInfo { display, artwork })
    }
}
