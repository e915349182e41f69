/// Track types
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Container/codec family of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackFormat {
    /// Streaming lossy format (MP3)
    Lossy,
    /// Frame-oriented lossless format (FLAC)
    Lossless,
}

impl TrackFormat {
    /// File extension recognised for this format
    pub fn extension(self) -> &'static str {
        match self {
            TrackFormat::Lossy => "mp3",
            TrackFormat::Lossless => "flac",
        }
    }

    /// Classify a file name by suffix
    ///
    /// Matching is case-sensitive; names without a recognised suffix are
    /// not tracks.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".flac") {
            Some(TrackFormat::Lossless)
        } else if name.ends_with(".mp3") {
            Some(TrackFormat::Lossy)
        } else {
            None
        }
    }
}

/// A track selected for playback
///
/// Identified by its file name within the source folder. Immutable once
/// selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track {
    /// File name (history identifier)
    pub name: String,
    /// Full path to the file
    pub path: PathBuf,
    /// Format tag
    pub format: TrackFormat,
}

impl Track {
    /// Build a track for `name` inside `folder`
    ///
    /// Returns `None` if the name does not carry a recognised extension.
    pub fn in_folder(folder: &Path, name: &str) -> Option<Self> {
        let format = TrackFormat::from_file_name(name)?;
        Some(Self {
            name: name.to_string(),
            path: folder.join(name),
            format,
        })
    }

    /// Build a track for an explicit file path
    ///
    /// Anything that is not lossless is handed to the lossy decoder.
    pub fn single_file(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let format = TrackFormat::from_file_name(&name).unwrap_or(TrackFormat::Lossy);
        Self {
            name,
            path: path.to_path_buf(),
            format,
        }
    }
}

/// How playback of a single track ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Track played to its end
    Finished,
    /// Track could not be opened or failed to decode; the session continues
    Skipped(String),
    /// A stop signal was received
    Stopped,
    /// The output device failed; the session must end
    DeviceFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_suffix() {
        assert_eq!(TrackFormat::from_file_name("a.mp3"), Some(TrackFormat::Lossy));
        assert_eq!(TrackFormat::from_file_name("b.flac"), Some(TrackFormat::Lossless));
        assert_eq!(TrackFormat::from_file_name("c.ogg"), None);
        assert_eq!(TrackFormat::from_file_name("mp3"), None);
        assert_eq!(TrackFormat::from_file_name("LOUD.MP3"), None);
    }

    #[test]
    fn track_in_folder_joins_path() {
        let track = Track::in_folder(Path::new("/music"), "song.mp3").unwrap();
        assert_eq!(track.name, "song.mp3");
        assert_eq!(track.path, PathBuf::from("/music/song.mp3"));
        assert_eq!(track.format, TrackFormat::Lossy);

        assert!(Track::in_folder(Path::new("/music"), "cover.jpg").is_none());
    }

    #[test]
    fn single_file_defaults_to_lossy() {
        let track = Track::single_file(Path::new("/music/odd.wav"));
        assert_eq!(track.name, "odd.wav");
        assert_eq!(track.format, TrackFormat::Lossy);

        let track = Track::single_file(Path::new("/music/hi.flac"));
        assert_eq!(track.format, TrackFormat::Lossless);
    }
}
