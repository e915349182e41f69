//! Session controller
//!
//! Owns "the one active playback job". Every accepted command spawns a task
//! that first makes the previous session vacate the output device, then runs
//! the step-back and/or forward folder loop against a `TrackPlayer`.
//!
//! All shared state (per-folder history, the active-session marker, the
//! signal handles) sits behind one mutex. Handoff is time based: the new
//! session sends stop to the old one and waits a fixed grace period before
//! it may touch the device. Sessions only ever clear markers they own.

use crate::error::{PlaybackError, Result};
use crate::history::HistoryMap;
use crate::selector::{FolderScan, TrackSelector};
use crate::types::{Command, ControllerConfig, PlaybackMode, SessionEnd, SessionPhase};
use jukebox_core::{
    signal_pair, DeviceControl, SessionSignals, SignalHandle, StatusReporter, Track, TrackOutcome,
    TrackPlayer,
};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Session currently allowed to write to the output device
#[derive(Debug, Clone, Copy)]
struct ActiveSession {
    id: u64,
    mode: PlaybackMode,
}

/// State mutated under the controller lock
struct ControllerState {
    histories: HistoryMap,
    selector: TrackSelector,
    next_session: u64,
    /// Session that is waiting out a handoff
    handoff: Option<u64>,
    active: Option<ActiveSession>,
    signals: Option<SignalHandle>,
    paused: bool,
}

struct Shared<P> {
    player: P,
    reporter: Arc<dyn StatusReporter>,
    device: Arc<dyn DeviceControl>,
    config: ControllerConfig,
    state: Mutex<ControllerState>,
}

impl<P> Shared<P> {
    /// A panicked session must not wedge the controller
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// How a new session clears the device before it starts
enum Handoff {
    /// One of our sessions is active; stop it through its handle
    StopSession(Option<SignalHandle>),
    /// None of ours is active; ask the host to silence anything else
    StopOtherAudio,
}

/// Drives playback sessions for folder commands
///
/// Cheap to clone; clones share the same state.
pub struct SessionController<P> {
    shared: Arc<Shared<P>>,
}

impl<P> Clone for SessionController<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P: TrackPlayer + 'static> SessionController<P> {
    /// Create a controller around a track player and host callbacks
    pub fn new(
        player: P,
        reporter: Arc<dyn StatusReporter>,
        device: Arc<dyn DeviceControl>,
        config: ControllerConfig,
    ) -> Self {
        Self::with_selector(player, reporter, device, config, TrackSelector::new())
    }

    /// Create a controller with a specific selector (e.g. a seeded one)
    pub fn with_selector(
        player: P,
        reporter: Arc<dyn StatusReporter>,
        device: Arc<dyn DeviceControl>,
        config: ControllerConfig,
        selector: TrackSelector,
    ) -> Self {
        let state = ControllerState {
            histories: HistoryMap::new(config.history_capacity),
            selector,
            next_session: 0,
            handoff: None,
            active: None,
            signals: None,
            paused: false,
        };

        Self {
            shared: Arc::new(Shared {
                player,
                reporter,
                device,
                config,
                state: Mutex::new(state),
            }),
        }
    }

    /// Accept a command and start its session in the background
    ///
    /// Returns immediately. The returned handle resolves once the session
    /// has exited and released the device.
    ///
    /// # Errors
    /// - `OverlappingCommandRejected` if another command is still handing off
    /// - `NoRuntime` if called outside a tokio runtime
    pub fn dispatch(&self, command: Command) -> Result<JoinHandle<SessionEnd>> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| PlaybackError::NoRuntime)?;

        let (session_id, handoff) = {
            let mut state = self.shared.lock();
            if let Some(pending) = state.handoff {
                warn!(
                    pending,
                    source = %command.source.display(),
                    "handoff still in progress; rejecting command"
                );
                return Err(PlaybackError::OverlappingCommandRejected { pending });
            }

            state.next_session += 1;
            let session_id = state.next_session;
            state.handoff = Some(session_id);

            let handoff = if state.active.is_some() {
                Handoff::StopSession(state.signals.clone())
            } else {
                Handoff::StopOtherAudio
            };
            (session_id, handoff)
        };

        info!(
            session = session_id,
            mode = ?command.mode(),
            source = %command.source.display(),
            "command accepted"
        );

        let guard = SessionGuard {
            shared: Arc::clone(&self.shared),
            session_id,
            owns_signals: false,
        };
        Ok(runtime.spawn(supervise(guard, command, handoff)))
    }

    /// Stop the active session, if any
    pub fn stop_playback(&self) -> bool {
        let state = self.shared.lock();
        match &state.signals {
            Some(handle) => {
                debug!(session = handle.session_id(), "external stop");
                handle.request_stop()
            }
            None => false,
        }
    }

    /// Toggle pause on the active session, if any
    pub fn toggle_pause(&self) -> bool {
        let mut state = self.shared.lock();
        let delivered = state
            .signals
            .as_ref()
            .is_some_and(SignalHandle::toggle_pause);
        if delivered {
            state.paused = !state.paused;
            debug!(paused = state.paused, "pause toggled");
        }
        delivered
    }

    /// Current controller phase
    pub fn phase(&self) -> SessionPhase {
        let state = self.shared.lock();
        if state.handoff.is_some() {
            return SessionPhase::AwaitingHandoff;
        }
        match state.active {
            Some(active) if state.paused => SessionPhase::Paused(active.mode),
            Some(active) => SessionPhase::Playing(active.mode),
            None => SessionPhase::Idle,
        }
    }

    /// History of the folder a source plays against (oldest first)
    pub fn history(&self, source: &Path) -> Vec<String> {
        let key = HistoryMap::key_for(source);
        let state = self.shared.lock();
        state
            .histories
            .get(&key)
            .map(|queue| queue.get_all().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Releases a session's markers on every exit path, unwinding included
struct SessionGuard<P> {
    shared: Arc<Shared<P>>,
    session_id: u64,
    owns_signals: bool,
}

impl<P> Drop for SessionGuard<P> {
    fn drop(&mut self) {
        let id = self.session_id;
        let mut state = self.shared.lock();

        if state.handoff == Some(id) {
            state.handoff = None;
        }

        if state.active.is_some_and(|active| active.id == id) {
            state.active = None;
            state.paused = false;
        }

        if self.owns_signals {
            match state.signals.as_ref().map(SignalHandle::session_id) {
                Some(owner) if owner == id => state.signals = None,
                Some(owner) => {
                    warn!(session = id, owner, "signal handles already taken over by another session");
                }
                None => {}
            }
        }

        debug!(session = id, "session released");
    }
}

async fn supervise<P: TrackPlayer + 'static>(
    mut guard: SessionGuard<P>,
    command: Command,
    handoff: Handoff,
) -> SessionEnd {
    let shared = Arc::clone(&guard.shared);
    let session_id = guard.session_id;

    perform_handoff(&shared, session_id, handoff).await;

    let worker = tokio::task::spawn_blocking(move || {
        let end = run_session(&mut guard, &command);
        info!(session = guard.session_id, end = ?end, "session exit");
        guard.shared.reporter.report_status(&end.message());
        end
    });

    match worker.await {
        Ok(end) => end,
        Err(err) => {
            let reason = if err.is_panic() {
                panic_message(err.into_panic())
            } else {
                err.to_string()
            };
            error!(session = session_id, reason = %reason, "session task failed");
            let end = SessionEnd::Crashed(reason);
            shared.reporter.report_status(&end.message());
            end
        }
    }
}

async fn perform_handoff<P>(shared: &Shared<P>, session_id: u64, handoff: Handoff) {
    match handoff {
        Handoff::StopSession(Some(handle)) => {
            debug!(session = session_id, previous = handle.session_id(), "stopping previous session");
            if !handle.request_stop() {
                debug!(session = session_id, "previous session already gone");
            }
        }
        Handoff::StopSession(None) => {
            warn!(session = session_id, "previous session is active but has no signal handles");
        }
        Handoff::StopOtherAudio => {
            debug!(session = session_id, "no session active; stopping other audio");
            shared.device.stop_other_audio();
        }
    }

    tokio::time::sleep(shared.config.handoff_grace).await;
}

/// Install this session's signal pair and mark it active
fn begin<P>(guard: &mut SessionGuard<P>, mode: PlaybackMode) -> SessionSignals {
    let id = guard.session_id;
    let (handle, signals) = signal_pair(id);

    let mut state = guard.shared.lock();
    if state.handoff == Some(id) {
        state.handoff = None;
    }
    if let Some(previous) = state.signals.replace(handle) {
        debug!(session = id, previous = previous.session_id(), "replacing signal handles");
    }
    state.active = Some(ActiveSession { id, mode });
    state.paused = false;
    guard.owns_signals = true;

    signals
}

fn run_session<P: TrackPlayer>(guard: &mut SessionGuard<P>, command: &Command) -> SessionEnd {
    let mode = command.mode();
    let signals = begin(guard, mode);
    let shared = &guard.shared;
    let id = guard.session_id;
    let folder = HistoryMap::key_for(&command.source);

    if mode == PlaybackMode::StepBack {
        info!(session = id, "start step back");
        let Some(previous) = pop_previous(shared, &folder) else {
            info!(session = id, "end of queue");
            return SessionEnd::EndOfQueue;
        };

        let track = Track::in_folder(&folder, &previous)
            .unwrap_or_else(|| Track::single_file(&folder.join(&previous)));
        if let Some(end) = session_end(id, play(shared, &folder, &track, &signals)) {
            return end;
        }
    }

    info!(session = id, folder = %folder.display(), "start folder loop");
    let skip_limit = shared.config.history_capacity.max(1);
    let mut consecutive_skips = 0;

    loop {
        if signals.stop_requested() {
            return SessionEnd::Stopped;
        }

        // List the folder before locking; only the history lookup is shared
        let selection = FolderScan::read(&command.source).and_then(|scan| {
            let mut state = shared.lock();
            let ControllerState {
                histories,
                selector,
                ..
            } = &mut *state;
            selector.pick(scan, histories.queue_mut(&folder))
        });

        let selection = match selection {
            Ok(selection) => selection,
            Err(PlaybackError::EmptyFolder(path)) => {
                warn!(session = id, folder = %path.display(), "folder is empty");
                return SessionEnd::EmptyFolder(path);
            }
            Err(PlaybackError::NoUnplayedTracks(path)) => {
                return SessionEnd::NoUnplayedTracks(path);
            }
            Err(e) => {
                warn!(session = id, error = %e, "selection failed");
                return SessionEnd::FolderUnreadable(e.to_string());
            }
        };

        let single_shot = selection.is_single_shot();
        let outcome = play(shared, &folder, selection.track(), &signals);

        consecutive_skips = match outcome {
            TrackOutcome::Skipped(_) => consecutive_skips + 1,
            _ => 0,
        };
        if let Some(end) = session_end(id, outcome) {
            return end;
        }
        if single_shot {
            return SessionEnd::SingleShotComplete;
        }
        if consecutive_skips >= skip_limit {
            warn!(session = id, consecutive_skips, "no track could be played");
            return SessionEnd::NoPlayableTracks;
        }
    }
}

/// Drop the current track from history and return the one before it
fn pop_previous<P>(shared: &Shared<P>, folder: &Path) -> Option<String> {
    let mut state = shared.lock();
    let queue = state.histories.queue_mut(folder);
    let _current = queue.pop()?;
    queue.pop()
}

fn play<P: TrackPlayer>(
    shared: &Shared<P>,
    folder: &Path,
    track: &Track,
    signals: &SessionSignals,
) -> TrackOutcome {
    shared
        .lock()
        .histories
        .queue_mut(folder)
        .push(track.name.clone());

    debug!(session = signals.session_id(), track = %track.name, "play");
    shared.player.play(track, signals)
}

/// Map a track outcome to a session end, if the session must stop
fn session_end(session_id: u64, outcome: TrackOutcome) -> Option<SessionEnd> {
    match outcome {
        TrackOutcome::Finished => None,
        TrackOutcome::Skipped(reason) => {
            debug!(session = session_id, reason = %reason, "track skipped");
            None
        }
        TrackOutcome::Stopped => {
            debug!(session = session_id, "manually aborted");
            Some(SessionEnd::Stopped)
        }
        TrackOutcome::DeviceFailed(msg) => {
            error!(session = session_id, error = %msg, "output device failed");
            Some(SessionEnd::DeviceFailed(msg))
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_are_readable() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
        assert_eq!(panic_message(Box::new(5_u8)), "unknown panic");
    }

    #[test]
    fn stop_and_device_failure_end_the_session() {
        assert_eq!(session_end(1, TrackOutcome::Finished), None);
        assert_eq!(session_end(1, TrackOutcome::Skipped("x".into())), None);
        assert_eq!(session_end(1, TrackOutcome::Stopped), Some(SessionEnd::Stopped));
        assert_eq!(
            session_end(1, TrackOutcome::DeviceFailed("gone".into())),
            Some(SessionEnd::DeviceFailed("gone".into()))
        );
    }
}
