/// Collaborator traits for the jukebox
///
/// The playback engine only talks to decoders, the output device and the
/// host through these seams.
use crate::error::Result;
use crate::signals::SessionSignals;
use crate::types::{OutputSpec, PcmBuffer, SinkWriteError, Track, TrackInfo, TrackOutcome};

/// Plays a single track to completion
///
/// Implementers own the decoder and output device for the duration of the
/// call and must release both before returning, on every exit path.
pub trait TrackPlayer: Send + Sync {
    /// Play `track`, polling `signals` between buffer writes
    fn play(&self, track: &Track, signals: &SessionSignals) -> TrackOutcome;
}

/// Output device accepting interleaved PCM
pub trait AudioSink {
    /// Write one buffer, blocking until the device has accepted it
    ///
    /// # Errors
    /// `SinkWriteError::Underflow` is transient; anything else is fatal for the session.
    fn write(&mut self, buffer: &PcmBuffer) -> std::result::Result<(), SinkWriteError>;

    /// Block until everything written so far has been played
    fn drain(&mut self) {}
}

/// Opens output sinks once the stream format is known
pub trait SinkFactory: Send + Sync {
    /// Sink type produced by this factory
    type Sink: AudioSink;

    /// Open and start a sink
    ///
    /// # Errors
    /// Returns an error if the device cannot be opened or started
    fn open(&self, spec: &OutputSpec) -> Result<Self::Sink>;
}

/// User-visible status callbacks
pub trait StatusReporter: Send + Sync {
    /// Transient message (errors, "folder empty", "end of queue")
    fn report_status(&self, message: &str);

    /// Display text of the track that just started
    fn report_now_playing(&self, display: &str);

    /// Embedded artwork of the track that just started
    fn report_artwork(&self, data: &[u8], mime_type: &str);
}

/// Host-side device control
pub trait DeviceControl: Send + Sync {
    /// Unmute the output after a sink has been opened
    fn unmute_output(&self);

    /// Ask an unrelated audio player to release the output device
    fn stop_other_audio(&self);
}

/// Reads the now-playing display text and artwork of a track
pub trait TrackInfoReader: Send + Sync {
    /// Read tags from `track`
    ///
    /// # Errors
    /// Returns an error if the tags cannot be read
    fn read(&self, track: &Track) -> Result<TrackInfo>;
}
