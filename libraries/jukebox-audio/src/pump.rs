//! Decode pump
//!
//! Moves one track from decoder to output device. The sink is opened lazily
//! on the first decoded block, since only then is the output format known.
//! Stop and pause signals are checked after every buffer; while paused the
//! pump sleeps and keeps the device open.

use crate::decoder::{BlockDecoder, DecodeStep, DecoderOpener, SymphoniaOpener};
use crate::error::AudioError;
use jukebox_core::{
    AudioSink, DeviceControl, OutputSpec, SessionSignal, SessionSignals, SinkFactory,
    SinkWriteError, StatusReporter, Track, TrackInfo, TrackInfoReader, TrackOutcome, TrackPlayer,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Decode pump configuration
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Sleep between signal checks while paused
    pub pause_poll: Duration,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            pause_poll: Duration::from_millis(500),
        }
    }
}

/// Plays tracks through a decoder opener and a sink factory
pub struct DecodePump<S, O = SymphoniaOpener> {
    sinks: S,
    opener: O,
    info: Arc<dyn TrackInfoReader>,
    reporter: Arc<dyn StatusReporter>,
    device: Arc<dyn DeviceControl>,
    config: PumpConfig,
}

impl<S: SinkFactory> DecodePump<S, SymphoniaOpener> {
    /// Create a pump decoding with Symphonia
    pub fn new(
        sinks: S,
        info: Arc<dyn TrackInfoReader>,
        reporter: Arc<dyn StatusReporter>,
        device: Arc<dyn DeviceControl>,
        config: PumpConfig,
    ) -> Self {
        Self::with_opener(sinks, SymphoniaOpener::default(), info, reporter, device, config)
    }
}

impl<S: SinkFactory, O: DecoderOpener> DecodePump<S, O> {
    /// Create a pump with a custom decoder opener
    pub fn with_opener(
        sinks: S,
        opener: O,
        info: Arc<dyn TrackInfoReader>,
        reporter: Arc<dyn StatusReporter>,
        device: Arc<dyn DeviceControl>,
        config: PumpConfig,
    ) -> Self {
        Self {
            sinks,
            opener,
            info,
            reporter,
            device,
            config,
        }
    }

    fn announce(&self, track: &Track) {
        let info = match self.info.read(track) {
            Ok(info) => info,
            Err(e) => {
                warn!(track = %track.name, error = %e, "cannot read tags");
                TrackInfo::default()
            }
        };

        let shown = if info.display.is_empty() {
            track.name.as_str()
        } else {
            info.display.as_str()
        };
        info!(track = %track.name, display = %shown, "now playing");
        self.reporter.report_now_playing(shown);

        if let Some(artwork) = &info.artwork {
            debug!(bytes = artwork.data.len(), mime = %artwork.mime_type, "artwork");
            self.reporter.report_artwork(&artwork.data, &artwork.mime_type);
        }
    }

    fn open_sink(&self, spec: &OutputSpec) -> Result<S::Sink, AudioError> {
        debug!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            bits = spec.width.bits(),
            frames = spec.frames_per_buffer,
            "opening output"
        );

        let sink = self
            .sinks
            .open(spec)
            .map_err(|e| AudioError::DeviceOpen(e.detail().to_string()))?;
        self.device.unmute_output();
        Ok(sink)
    }

    fn pump(&self, decoder: &mut dyn BlockDecoder, signals: &SessionSignals) -> TrackOutcome {
        let mut sink: Option<S::Sink> = None;
        let mut paused = false;

        loop {
            if paused {
                std::thread::sleep(self.config.pause_poll);
            } else {
                match decoder.next_block() {
                    Ok(DecodeStep::Block(block)) => {
                        if sink.is_none() {
                            match self.open_sink(&decoder.spec()) {
                                Ok(opened) => sink = Some(opened),
                                Err(e) => {
                                    error!(error = %e, "output unavailable");
                                    return TrackOutcome::DeviceFailed(e.to_string());
                                }
                            }
                        }

                        if let Some(out) = sink.as_mut() {
                            match out.write(&block) {
                                Ok(()) => {}
                                Err(SinkWriteError::Underflow) => {
                                    warn!("output underflowed; continuing");
                                }
                                Err(SinkWriteError::Device(cause)) => {
                                    let e = AudioError::DeviceWrite(cause);
                                    error!(error = %e, "output failed");
                                    return TrackOutcome::DeviceFailed(e.to_string());
                                }
                            }
                        }
                    }
                    Ok(DecodeStep::Resync(reason)) => {
                        debug!(reason = %reason, "lost frame sync; skipping frame");
                    }
                    Ok(DecodeStep::EndOfStream) => {
                        if let Some(out) = sink.as_mut() {
                            out.drain();
                        }
                        return TrackOutcome::Finished;
                    }
                    Err(e) => {
                        warn!(error = %e, "decode failed");
                        self.reporter.report_status("error reading audio source");
                        return TrackOutcome::Skipped(e.to_string());
                    }
                }
            }

            match signals.poll() {
                Some(SessionSignal::Stop) => {
                    info!("manually aborted");
                    return TrackOutcome::Stopped;
                }
                Some(SessionSignal::TogglePause) => {
                    paused = !paused;
                    info!(paused, "pause toggled");
                }
                None => {}
            }
        }
    }
}

impl<S: SinkFactory, O: DecoderOpener> TrackPlayer for DecodePump<S, O> {
    fn play(&self, track: &Track, signals: &SessionSignals) -> TrackOutcome {
        let mut decoder = match self.opener.open(track) {
            Ok(decoder) => decoder,
            Err(e) => {
                warn!(track = %track.name, error = %e, "cannot open track");
                self.reporter.report_status("error open file");
                return TrackOutcome::Skipped(e.to_string());
            }
        };

        self.announce(track);

        let outcome = self.pump(decoder.as_mut(), signals);
        debug!(track = %track.name, outcome = ?outcome, "track done");
        outcome
    }
}
