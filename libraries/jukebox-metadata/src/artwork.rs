//! Embedded cover art

use crate::error::{MetadataError, Result};
use jukebox_core::ArtworkData;
use lofty::{PictureType, Tag};

/// Maximum artwork size (5MB)
pub const MAX_ARTWORK_SIZE: usize = 5 * 1024 * 1024;

/// Pick the cover from a tag
///
/// Prefers the front cover, otherwise takes the first picture. Returns
/// `Ok(None)` if the tag carries no pictures.
pub fn cover_from_tag(tag: &Tag) -> Result<Option<ArtworkData>> {
    let pictures = tag.pictures();

    let Some(picture) = pictures
        .iter()
        .find(|p| matches!(p.pic_type(), PictureType::CoverFront))
        .or_else(|| pictures.first())
    else {
        return Ok(None);
    };

    let data = picture.data();
    if data.len() > MAX_ARTWORK_SIZE {
        return Err(MetadataError::ArtworkTooLarge(data.len(), MAX_ARTWORK_SIZE));
    }

    // Default to "image/jpeg" if not specified
    let mime_type = picture
        .mime_type()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "image/jpeg".to_string());

    Ok(Some(ArtworkData::new(data.to_vec(), mime_type)))
}
