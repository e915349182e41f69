/// Integration tests for the track info reader
use jukebox_core::{Track, TrackInfoReader};
use jukebox_metadata::LoftyTrackInfoReader;
use std::fs;
use std::path::Path;

#[test]
fn missing_file_is_an_error() {
    let reader = LoftyTrackInfoReader::new();
    let track = Track::in_folder(Path::new("/nonexistent"), "song.mp3").unwrap();

    let err = reader.read(&track).unwrap_err();
    assert!(err.to_string().contains("not found"), "{}", err);
}

#[test]
fn garbage_file_is_an_error_not_a_panic() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("noise.flac"), b"definitely not a flac stream").unwrap();

    let reader = LoftyTrackInfoReader::new();
    let track = Track::in_folder(dir.path(), "noise.flac").unwrap();
    assert!(reader.read(&track).is_err());
}
