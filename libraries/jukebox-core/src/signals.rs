//! Session stop/pause signalling
//!
//! Each playback session owns one stop channel and one pause channel. The
//! sending half (`SignalHandle`) is parked with the controller so later
//! commands can interrupt the session; the receiving half (`SessionSignals`)
//! travels with the decode pump, which polls it once per written buffer.
//!
//! Cancellation is cooperative: nothing here can interrupt a codec call that
//! is already in progress.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

/// Pending pause toggles beyond this are dropped
const PAUSE_QUEUE_DEPTH: usize = 8;

/// A signal delivered to a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// Abort the current track and end the session
    Stop,
    /// Flip between paused and playing
    TogglePause,
}

/// Sending half of a session's signal pair
#[derive(Debug, Clone)]
pub struct SignalHandle {
    session_id: u64,
    stop_tx: Sender<()>,
    pause_tx: Sender<()>,
}

/// Receiving half of a session's signal pair
#[derive(Debug)]
pub struct SessionSignals {
    session_id: u64,
    stop_rx: Receiver<()>,
    pause_rx: Receiver<()>,
}

/// Create the stop/pause pair for a session
pub fn signal_pair(session_id: u64) -> (SignalHandle, SessionSignals) {
    let (stop_tx, stop_rx) = bounded(1);
    let (pause_tx, pause_rx) = bounded(PAUSE_QUEUE_DEPTH);

    (
        SignalHandle {
            session_id,
            stop_tx,
            pause_tx,
        },
        SessionSignals {
            session_id,
            stop_rx,
            pause_rx,
        },
    )
}

impl SignalHandle {
    /// Session this handle belongs to
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Ask the session to stop
    ///
    /// Returns `false` if the session has already gone away.
    pub fn request_stop(&self) -> bool {
        match self.stop_tx.try_send(()) {
            // A full channel means a stop is already pending
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        }
    }

    /// Ask the session to toggle its pause state
    ///
    /// Returns `false` if the session has gone away or too many toggles are
    /// queued.
    pub fn toggle_pause(&self) -> bool {
        self.pause_tx.try_send(()).is_ok()
    }
}

impl SessionSignals {
    /// Session these signals belong to
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Non-blocking check for a pending stop, leaving pause toggles queued
    pub fn stop_requested(&self) -> bool {
        match self.stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }

    /// Non-blocking check for a pending signal
    ///
    /// Stop wins over pause. A dropped handle counts as a stop so a session
    /// can never outlive the controller that owns it.
    pub fn poll(&self) -> Option<SessionSignal> {
        match self.stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => return Some(SessionSignal::Stop),
            Err(TryRecvError::Empty) => {}
        }

        match self.pause_rx.try_recv() {
            Ok(()) => Some(SessionSignal::TogglePause),
            Err(_) => None,
        }
    }
}
