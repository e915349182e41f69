//! History-aware random track selection

use crate::error::{PlaybackError, Result};
use crate::history::HistoryQueue;
use crate::shuffle;
use jukebox_core::Track;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of a successful selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A track picked from a folder; the session keeps looping
    Folder(Track),
    /// The source was an explicit file; play it once
    SingleFile(Track),
}

impl Selection {
    /// The selected track
    pub fn track(&self) -> &Track {
        match self {
            Selection::Folder(track) | Selection::SingleFile(track) => track,
        }
    }

    /// Consume the selection
    pub fn into_track(self) -> Track {
        match self {
            Selection::Folder(track) | Selection::SingleFile(track) => track,
        }
    }

    /// Whether the session ends after this track
    pub fn is_single_shot(&self) -> bool {
        matches!(self, Selection::SingleFile(_))
    }
}

/// One folder entry as seen by the selector
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    is_dir: bool,
}

/// Picks the next track to play from a folder
pub struct TrackSelector<R = StdRng> {
    rng: R,
}

impl TrackSelector<StdRng> {
    /// Create a selector seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for TrackSelector<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TrackSelector<R> {
    /// Create a selector with a caller-provided random source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Select the next track from `source`
    ///
    /// Reads the folder and picks from it in one go; see [`FolderScan::read`]
    /// and [`TrackSelector::pick`] for the two halves.
    ///
    /// # Errors
    /// - `EmptyFolder` if the folder has no entries
    /// - `NoUnplayedTracks` if nothing can be selected even with empty history
    /// - `FolderRead` if the folder cannot be listed
    pub fn select(&mut self, source: &Path, history: &mut HistoryQueue) -> Result<Selection> {
        let scan = FolderScan::read(source)?;
        self.pick(scan, history)
    }

    /// Pick a track from an already listed folder
    ///
    /// Tracks named in `history` are skipped. When no candidate is left, the
    /// oldest history entry is evicted and the folder is reshuffled, until
    /// either a track is found or history runs empty. Does no I/O.
    ///
    /// # Errors
    /// Returns `NoUnplayedTracks` if nothing can be selected even with empty history
    pub fn pick(&mut self, scan: FolderScan, history: &mut HistoryQueue) -> Result<Selection> {
        let (folder, mut entries) = match scan {
            FolderScan::SingleFile(track) => return Ok(Selection::SingleFile(track)),
            FolderScan::Folder { path, entries } => (path, entries),
        };

        loop {
            shuffle::randomize(&mut entries, &mut self.rng);

            if let Some(track) = first_unplayed(&folder, &entries, history) {
                debug!(track = %track.name, format = ?track.format, "selected");
                return Ok(Selection::Folder(track));
            }

            match history.pop_oldest() {
                Some(evicted) => {
                    info!(
                        folder = %folder.display(),
                        evicted = %evicted,
                        "found no unplayed track; retrying after evicting oldest history entry"
                    );
                }
                None => {
                    info!(folder = %folder.display(), "found no unplayed track; giving up");
                    return Err(PlaybackError::NoUnplayedTracks(folder));
                }
            }
        }
    }
}

/// A source as listed from disk, ready for [`TrackSelector::pick`]
#[derive(Debug, Clone)]
pub enum FolderScan {
    /// The source is not a directory and is played as one file
    SingleFile(Track),
    /// Entries of a non-empty folder
    Folder { path: PathBuf, entries: Vec<Entry> },
}

impl FolderScan {
    /// List `source`
    ///
    /// A `source` that is not a directory is treated as an explicit file.
    ///
    /// # Errors
    /// - `EmptyFolder` if the folder has no entries
    /// - `FolderRead` if the folder cannot be listed
    pub fn read(source: &Path) -> Result<Self> {
        if !source.is_dir() {
            debug!(path = %source.display(), "source is not a folder; single file playback");
            return Ok(FolderScan::SingleFile(Track::single_file(source)));
        }

        let entries = list_entries(source)?;
        if entries.is_empty() {
            return Err(PlaybackError::EmptyFolder(source.to_path_buf()));
        }

        Ok(FolderScan::Folder {
            path: source.to_path_buf(),
            entries,
        })
    }
}

/// First entry in listing order that is a playable, not recently played file
fn first_unplayed(folder: &Path, entries: &[Entry], history: &HistoryQueue) -> Option<Track> {
    entries
        .iter()
        .filter(|entry| !entry.is_dir)
        .filter(|entry| {
            let played = history.contains(&entry.name);
            if played {
                debug!(track = %entry.name, "in history - skip");
            }
            !played
        })
        .find_map(|entry| Track::in_folder(folder, &entry.name))
}

fn list_entries(folder: &Path) -> Result<Vec<Entry>> {
    let read_err = |source| PlaybackError::FolderRead {
        path: folder.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for dir_entry in std::fs::read_dir(folder).map_err(read_err)? {
        let dir_entry = dir_entry.map_err(read_err)?;
        // Follow symlinks so a linked folder still counts as a folder
        let is_dir = dir_entry.path().is_dir();
        entries.push(Entry {
            name: dir_entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jukebox_core::TrackFormat;
    use std::fs;
    use tempfile::TempDir;

    fn seeded(seed: u64) -> TrackSelector<StdRng> {
        TrackSelector::with_rng(StdRng::seed_from_u64(seed))
    }

    fn folder_with(files: &[&str], dirs: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            fs::write(dir.path().join(file), b"not really audio").unwrap();
        }
        for sub in dirs {
            fs::create_dir(dir.path().join(sub)).unwrap();
        }
        dir
    }

    #[test]
    fn empty_folder_is_an_error() {
        let dir = folder_with(&[], &[]);
        let mut history = HistoryQueue::new(50);

        let result = seeded(1).select(dir.path(), &mut history);
        assert!(matches!(result, Err(PlaybackError::EmptyFolder(_))));
    }

    #[test]
    fn never_selects_directories_or_unknown_files() {
        let dir = folder_with(&["cover.jpg", "notes.txt", "song.flac"], &["sub.mp3"]);

        for seed in 0..20 {
            let mut history = HistoryQueue::new(50);
            let selection = seeded(seed).select(dir.path(), &mut history).unwrap();
            assert_eq!(selection.track().name, "song.flac");
            assert_eq!(selection.track().format, TrackFormat::Lossless);
            assert!(!selection.is_single_shot());
        }
    }

    #[test]
    fn skips_tracks_in_history() {
        let dir = folder_with(&["a.mp3", "b.flac"], &["dir"]);
        let mut history = HistoryQueue::new(50);
        history.push("a.mp3");

        let selection = seeded(3).select(dir.path(), &mut history).unwrap();
        assert_eq!(selection.track().name, "b.flac");
        // Nothing was evicted
        assert_eq!(history.get_all(), vec!["a.mp3"]);
    }

    #[test]
    fn exhausted_folder_evicts_oldest_and_retries() {
        let dir = folder_with(&["a.mp3", "b.flac"], &[]);
        let mut history = HistoryQueue::new(50);
        history.push("a.mp3");
        history.push("b.flac");

        let selection = seeded(5).select(dir.path(), &mut history).unwrap();
        // Oldest (a.mp3) was evicted, so it is the only candidate
        assert_eq!(selection.track().name, "a.mp3");
        assert_eq!(history.get_all(), vec!["b.flac"]);
    }

    #[test]
    fn gives_up_when_history_runs_dry() {
        let dir = folder_with(&["readme.txt"], &["nested"]);
        let mut history = HistoryQueue::new(50);
        history.push("gone.mp3");

        let result = seeded(8).select(dir.path(), &mut history);
        assert!(matches!(result, Err(PlaybackError::NoUnplayedTracks(_))));
        assert!(history.is_empty());
    }

    #[test]
    fn picking_works_from_the_listing_alone() {
        let dir = folder_with(&["a.mp3", "b.flac"], &[]);
        let path = dir.path().to_path_buf();
        let scan = FolderScan::read(&path).unwrap();
        drop(dir);
        assert!(!path.exists());

        let mut history = HistoryQueue::new(50);
        history.push("a.mp3");
        let selection = seeded(4).pick(scan, &mut history).unwrap();
        assert_eq!(selection.track().name, "b.flac");
        assert_eq!(selection.track().path, path.join("b.flac"));
    }

    #[test]
    fn empty_folder_is_reported_by_the_scan() {
        let dir = folder_with(&[], &[]);
        let result = FolderScan::read(dir.path());
        assert!(matches!(result, Err(PlaybackError::EmptyFolder(_))));
    }

    #[test]
    fn non_directory_is_single_file() {
        let dir = folder_with(&["one.mp3"], &[]);
        let path = dir.path().join("one.mp3");
        let mut history = HistoryQueue::new(50);

        let selection = seeded(2).select(&path, &mut history).unwrap();
        assert!(selection.is_single_shot());
        assert_eq!(selection.track().path, path);
        assert_eq!(selection.into_track().name, "one.mp3");
    }

    #[test]
    fn plays_every_track_before_repeating() {
        let names: Vec<String> = (0..12).map(|i| format!("t{i:02}.mp3")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let dir = folder_with(&refs, &[]);

        let mut selector = seeded(11);
        let mut history = HistoryQueue::new(50);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..names.len() {
            let track = selector.select(dir.path(), &mut history).unwrap().into_track();
            assert!(seen.insert(track.name.clone()), "{} repeated", track.name);
            history.push(track.name);
        }
        assert_eq!(seen.len(), names.len());
    }
}
