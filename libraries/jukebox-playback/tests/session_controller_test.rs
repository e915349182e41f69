//! Session controller tests
//!
//! Drive the controller with scripted players against real temp folders and
//! real (short) handoff timing.

use jukebox_core::{
    DeviceControl, SessionSignal, SessionSignals, StatusReporter, Track, TrackOutcome, TrackPlayer,
};
use jukebox_playback::{
    Command, ControllerConfig, PlaybackError, PlaybackMode, SessionController, SessionEnd,
    SessionPhase, TrackSelector,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ===== Test Helpers =====

#[derive(Default)]
struct RecordingReporter {
    statuses: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }
}

impl StatusReporter for RecordingReporter {
    fn report_status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_string());
    }

    fn report_now_playing(&self, _display: &str) {}

    fn report_artwork(&self, _data: &[u8], _mime_type: &str) {}
}

#[derive(Default)]
struct CountingDevice {
    stop_other: AtomicUsize,
}

impl DeviceControl for CountingDevice {
    fn unmute_output(&self) {}

    fn stop_other_audio(&self) {
        self.stop_other.fetch_add(1, Ordering::SeqCst);
    }
}

/// How the mock player behaves for each track
#[derive(Clone, Copy)]
enum Script {
    /// Finish every track, then report a stop once `limit` tracks were played
    StopAfter(usize),
    /// Play until a stop signal arrives
    UntilStopped,
    /// Every track fails to open
    AlwaysSkip,
    /// Panic inside the player
    Panic,
}

#[derive(Clone)]
struct MockPlayer {
    script: Script,
    played: Arc<Mutex<Vec<String>>>,
}

impl MockPlayer {
    fn new(script: Script) -> Self {
        Self {
            script,
            played: Arc::default(),
        }
    }

    fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

impl TrackPlayer for MockPlayer {
    fn play(&self, track: &Track, signals: &SessionSignals) -> TrackOutcome {
        let count = {
            let mut played = self.played.lock().unwrap();
            played.push(track.name.clone());
            played.len()
        };

        match self.script {
            Script::StopAfter(limit) if count >= limit => TrackOutcome::Stopped,
            Script::StopAfter(_) => TrackOutcome::Finished,
            Script::UntilStopped => {
                for _ in 0..2500 {
                    if signals.poll() == Some(SessionSignal::Stop) {
                        return TrackOutcome::Stopped;
                    }
                    std::thread::sleep(Duration::from_millis(2));
                }
                TrackOutcome::Finished
            }
            Script::AlwaysSkip => TrackOutcome::Skipped("error open file".to_string()),
            Script::Panic => panic!("decoder exploded"),
        }
    }
}

struct Harness {
    controller: SessionController<MockPlayer>,
    player: MockPlayer,
    reporter: Arc<RecordingReporter>,
    device: Arc<CountingDevice>,
}

fn harness(script: Script, history_capacity: usize) -> Harness {
    let player = MockPlayer::new(script);
    let reporter = Arc::new(RecordingReporter::default());
    let device = Arc::new(CountingDevice::default());
    let config = ControllerConfig {
        history_capacity,
        handoff_grace: Duration::from_millis(20),
    };

    let controller = SessionController::with_selector(
        player.clone(),
        reporter.clone(),
        device.clone(),
        config,
        TrackSelector::with_rng(StdRng::seed_from_u64(7)),
    );

    Harness {
        controller,
        player,
        reporter,
        device,
    }
}

fn folder_with(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        fs::write(dir.path().join(file), b"").unwrap();
    }
    dir
}

async fn wait_for_phase(controller: &SessionController<MockPlayer>, phase: SessionPhase) {
    for _ in 0..400 {
        if controller.phase() == phase {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("controller never reached {:?}", phase);
}

// ===== Step Back =====

#[tokio::test]
async fn step_back_with_one_entry_is_end_of_queue() {
    let h = harness(Script::StopAfter(1), 50);
    let dir = folder_with(&["a.mp3", "b.mp3", "c.mp3"]);

    let end = h.controller.dispatch(Command::forward(dir.path())).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::Stopped);
    assert_eq!(h.controller.history(dir.path()).len(), 1);

    let end = h.controller.dispatch(Command::step_back(dir.path())).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::EndOfQueue);
    assert_eq!(h.reporter.statuses().last().map(String::as_str), Some("end of queue"));

    // both the current entry and nothing else were consumed
    assert!(h.controller.history(dir.path()).is_empty());
    assert_eq!(h.player.played().len(), 1);
}

#[tokio::test]
async fn step_back_on_fresh_folder_is_end_of_queue() {
    let h = harness(Script::StopAfter(1), 50);
    let dir = folder_with(&["a.mp3"]);

    let end = h.controller.dispatch(Command::step_back(dir.path())).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::EndOfQueue);
    assert!(h.player.played().is_empty());
}

#[tokio::test]
async fn step_back_replays_previous_track() {
    let h = harness(Script::StopAfter(3), 50);
    let dir = folder_with(&["a.mp3", "b.flac", "c.mp3", "d.mp3"]);

    let end = h.controller.dispatch(Command::forward(dir.path())).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::Stopped);
    let first_three = h.player.played();
    assert_eq!(first_three.len(), 3);
    assert_eq!(h.controller.history(dir.path()), first_three);

    // the player stops again right after the replay
    let end = h.controller.dispatch(Command::step_back(dir.path())).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::Stopped);

    let played = h.player.played();
    assert_eq!(played.len(), 4);
    assert_eq!(played[3], first_three[1]);
    assert_eq!(h.controller.history(dir.path()), first_three[..2].to_vec());
}

// ===== Forward Loop =====

#[tokio::test]
async fn forward_plays_every_track_before_repeating() {
    let files = ["1.mp3", "2.mp3", "3.mp3", "4.flac", "5.mp3"];
    let h = harness(Script::StopAfter(5), 50);
    let dir = folder_with(&files);

    let end = h.controller.dispatch(Command::forward(dir.path())).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::Stopped);

    let mut played = h.player.played();
    played.sort();
    assert_eq!(played, files.iter().map(|f| f.to_string()).collect::<Vec<_>>());
}

#[tokio::test]
async fn empty_folder_ends_session() {
    let h = harness(Script::StopAfter(1), 50);
    let dir = folder_with(&[]);

    let end = h.controller.dispatch(Command::forward(dir.path())).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::EmptyFolder(dir.path().to_path_buf()));
    assert_eq!(
        h.reporter.statuses(),
        vec![format!("folder {} is empty", dir.path().display())]
    );
}

#[tokio::test]
async fn folder_without_audio_gives_up() {
    let h = harness(Script::StopAfter(1), 50);
    let dir = folder_with(&["cover.jpg", "readme.txt"]);

    let end = h.controller.dispatch(Command::forward(dir.path())).unwrap().await.unwrap();
    assert!(matches!(end, SessionEnd::NoUnplayedTracks(_)));
    assert_eq!(
        h.reporter.statuses(),
        vec!["cannot find any unplayed files - giving up".to_string()]
    );
}

#[tokio::test]
async fn single_file_plays_once() {
    let h = harness(Script::StopAfter(100), 50);
    let dir = folder_with(&["only.flac"]);
    let file = dir.path().join("only.flac");

    let end = h.controller.dispatch(Command::forward(&file)).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::SingleShotComplete);
    assert_eq!(h.player.played(), vec!["only.flac".to_string()]);
    assert_eq!(h.controller.history(&file), vec!["only.flac".to_string()]);
    assert_eq!(h.controller.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn unplayable_folder_gives_up_after_repeated_skips() {
    let h = harness(Script::AlwaysSkip, 3);
    let dir = folder_with(&["a.mp3", "b.mp3"]);

    let end = h.controller.dispatch(Command::forward(dir.path())).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::NoPlayableTracks);
    assert_eq!(h.player.played().len(), 3);
}

// ===== Handoff =====

#[tokio::test]
async fn overlapping_command_is_rejected() {
    let h = harness(Script::StopAfter(1), 50);
    let dir = folder_with(&["a.mp3"]);

    let first = h.controller.dispatch(Command::forward(dir.path())).unwrap();
    assert_eq!(h.controller.phase(), SessionPhase::AwaitingHandoff);

    let second = h.controller.dispatch(Command::forward(dir.path()));
    assert!(matches!(
        second,
        Err(PlaybackError::OverlappingCommandRejected { pending: 1 })
    ));

    assert_eq!(first.await.unwrap(), SessionEnd::Stopped);
    assert_eq!(h.player.played().len(), 1);
}

#[tokio::test]
async fn new_command_stops_running_session() {
    let h = harness(Script::UntilStopped, 50);
    let rock = folder_with(&["r1.mp3", "r2.mp3"]);
    let jazz = folder_with(&["j1.mp3", "j2.mp3"]);

    let first = h.controller.dispatch(Command::forward(rock.path())).unwrap();
    wait_for_phase(&h.controller, SessionPhase::Playing(PlaybackMode::Forward)).await;
    assert_eq!(h.device.stop_other.load(Ordering::SeqCst), 1);

    let second = h.controller.dispatch(Command::forward(jazz.path())).unwrap();
    assert_eq!(first.await.unwrap(), SessionEnd::Stopped);

    wait_for_phase(&h.controller, SessionPhase::Playing(PlaybackMode::Forward)).await;
    assert!(h.controller.stop_playback());
    assert_eq!(second.await.unwrap(), SessionEnd::Stopped);

    // only the first session had to silence foreign audio
    assert_eq!(h.device.stop_other.load(Ordering::SeqCst), 1);
    assert_eq!(h.controller.phase(), SessionPhase::Idle);
    assert!(!h.controller.stop_playback());

    let played = h.player.played();
    assert_eq!(played.len(), 2);
    assert!(played[0].starts_with('r'));
    assert!(played[1].starts_with('j'));
    assert_eq!(h.controller.history(rock.path()).len(), 1);
    assert_eq!(h.controller.history(jazz.path()).len(), 1);
}

#[tokio::test]
async fn pause_is_reflected_in_phase() {
    let h = harness(Script::UntilStopped, 50);
    let dir = folder_with(&["a.mp3"]);

    assert!(!h.controller.toggle_pause());

    let session = h.controller.dispatch(Command::forward(dir.path())).unwrap();
    wait_for_phase(&h.controller, SessionPhase::Playing(PlaybackMode::Forward)).await;

    assert!(h.controller.toggle_pause());
    assert_eq!(h.controller.phase(), SessionPhase::Paused(PlaybackMode::Forward));
    assert!(h.controller.toggle_pause());
    assert_eq!(h.controller.phase(), SessionPhase::Playing(PlaybackMode::Forward));

    h.controller.stop_playback();
    assert_eq!(session.await.unwrap(), SessionEnd::Stopped);
}

// ===== Failure Recovery =====

#[tokio::test]
async fn panicking_player_releases_the_device() {
    let h = harness(Script::Panic, 50);
    let dir = folder_with(&["a.mp3"]);

    let end = h.controller.dispatch(Command::forward(dir.path())).unwrap().await.unwrap();
    assert_eq!(end, SessionEnd::Crashed("decoder exploded".to_string()));
    assert_eq!(h.controller.phase(), SessionPhase::Idle);
    assert_eq!(
        h.reporter.statuses(),
        vec!["playback failed: decoder exploded".to_string()]
    );

    // the controller is still usable
    let again = h.controller.dispatch(Command::step_back(dir.path())).unwrap();
    assert_eq!(again.await.unwrap(), SessionEnd::EndOfQueue);
}

#[test]
fn dispatch_outside_runtime_fails() {
    let h = harness(Script::StopAfter(1), 50);
    let result = h.controller.dispatch(Command::forward("/music"));
    assert!(matches!(result, Err(PlaybackError::NoRuntime)));
}
