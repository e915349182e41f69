/// Artwork extracted from an audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkData {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub mime_type: String,
}

impl ArtworkData {
    /// Create new artwork data
    pub fn new(data: Vec<u8>, mime_type: String) -> Self {
        Self { data, mime_type }
    }
}

/// What the status display shows for a track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    /// Single-line display text (title - artist - album)
    pub display: String,
    /// Embedded cover, if any
    pub artwork: Option<ArtworkData>,
}
