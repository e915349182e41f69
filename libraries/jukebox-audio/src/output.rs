/// CPAL-based audio sink
///
/// Decoded blocks are handed to the device callback through a bounded
/// channel, so `write` blocks once the device is that many blocks behind.
use crate::error::AudioError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, SampleFormat, SizedSample, Stream, StreamConfig, SupportedBufferSize,
};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use jukebox_core::{AudioSink, OutputSpec, PcmBuffer, SampleWidth, SinkFactory, SinkWriteError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Blocks queued ahead of the device callback
const QUEUE_DEPTH: usize = 4;

/// How long `write` waits for the callback before declaring the device stuck
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens `CpalSink`s on the default (or a named) output device
#[derive(Debug, Clone, Default)]
pub struct CpalSinkFactory {
    device_name: Option<String>,
}

impl CpalSinkFactory {
    /// Use the host's default output device
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific device by name
    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    fn find_device(&self) -> Result<Device, AudioError> {
        let host = cpal::default_host();

        match &self.device_name {
            Some(name) => host
                .output_devices()
                .map_err(|e| AudioError::DeviceOpen(e.to_string()))?
                .find(|device| device.name().map(|n| &n == name).unwrap_or(false))
                .ok_or_else(|| AudioError::DeviceOpen(format!("no output device named {}", name))),
            None => host
                .default_output_device()
                .ok_or_else(|| AudioError::DeviceOpen("no default output device".to_string())),
        }
    }
}

impl SinkFactory for CpalSinkFactory {
    type Sink = CpalSink;

    fn open(&self, spec: &OutputSpec) -> jukebox_core::Result<CpalSink> {
        let device = self.find_device()?;
        Ok(CpalSink::open(&device, spec, QUEUE_DEPTH)?)
    }
}

/// State shared between the writer and the device callback
#[derive(Default)]
struct StreamShared {
    /// Samples written but not yet played
    pending: AtomicUsize,
    /// The callback ran dry after playback had started
    underflow: AtomicBool,
    /// Last error reported by the stream
    error: Mutex<Option<String>>,
}

impl StreamShared {
    fn take_error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Sending half, typed by sample width
enum BlockSender {
    S16(Sender<Vec<i16>>),
    S32(Sender<Vec<i32>>),
}

/// Callback-side reader of queued blocks
struct Playhead<T> {
    rx: Receiver<Vec<T>>,
    current: Vec<T>,
    position: usize,
    started: bool,
}

impl<T: Copy + Default> Playhead<T> {
    fn new(rx: Receiver<Vec<T>>) -> Self {
        Self {
            rx,
            current: Vec::new(),
            position: 0,
            started: false,
        }
    }

    fn fill(&mut self, output: &mut [T], shared: &StreamShared) {
        let mut written = 0;

        while written < output.len() {
            if self.position >= self.current.len() {
                if let Ok(block) = self.rx.try_recv() {
                    self.current = block;
                    self.position = 0;
                    self.started = true;
                    continue;
                }

                if self.started {
                    shared.underflow.store(true, Ordering::Relaxed);
                }
                output[written..].fill(T::default());
                return;
            }

            let n = (self.current.len() - self.position).min(output.len() - written);
            output[written..written + n]
                .copy_from_slice(&self.current[self.position..self.position + n]);
            self.position += n;
            written += n;
            shared.pending.fetch_sub(n, Ordering::AcqRel);
        }
    }
}

/// Output sink writing interleaved PCM to a CPAL stream
///
/// Dropping the sink stops the stream and releases the device.
pub struct CpalSink {
    stream: Stream,
    sender: BlockSender,
    shared: Arc<StreamShared>,
    spec: OutputSpec,
}

impl CpalSink {
    fn open(device: &Device, spec: &OutputSpec, depth: usize) -> Result<Self, AudioError> {
        let config = StreamConfig {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            buffer_size: buffer_size_for(device, spec),
        };
        let shared = Arc::new(StreamShared::default());

        let (stream, sender) = match spec.width {
            SampleWidth::S16 => {
                let (tx, rx) = bounded::<Vec<i16>>(depth);
                let stream = build_stream(device, &config, rx, &shared)?;
                (stream, BlockSender::S16(tx))
            }
            SampleWidth::S32 => {
                let (tx, rx) = bounded::<Vec<i32>>(depth);
                let stream = build_stream(device, &config, rx, &shared)?;
                (stream, BlockSender::S32(tx))
            }
        };

        stream
            .play()
            .map_err(|e| AudioError::DeviceOpen(e.to_string()))?;

        debug!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            bits = spec.width.bits(),
            buffer = ?config.buffer_size,
            "output stream started"
        );

        Ok(Self {
            stream,
            sender,
            shared,
            spec: *spec,
        })
    }

    fn send<T>(&self, tx: &Sender<Vec<T>>, samples: &[T]) -> Result<(), SinkWriteError>
    where
        T: Copy,
    {
        self.shared.pending.fetch_add(samples.len(), Ordering::AcqRel);

        match tx.send_timeout(samples.to_vec(), WRITE_TIMEOUT) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.shared.pending.fetch_sub(samples.len(), Ordering::AcqRel);
                Err(SinkWriteError::Device(match e {
                    SendTimeoutError::Timeout(_) => "output device stalled".to_string(),
                    SendTimeoutError::Disconnected(_) => "output stream closed".to_string(),
                }))
            }
        }
    }
}

/// Device buffer holding one decoded block, within what the device accepts
fn buffer_size_for(device: &Device, spec: &OutputSpec) -> BufferSize {
    let target_format = match spec.width {
        SampleWidth::S16 => SampleFormat::I16,
        SampleWidth::S32 => SampleFormat::I32,
    };

    let supported = match device.supported_output_configs() {
        Ok(configs) => configs
            .filter(|c| c.channels() == spec.channels && c.sample_format() == target_format)
            .find(|c| (c.min_sample_rate()..=c.max_sample_rate()).contains(&spec.sample_rate)),
        Err(e) => {
            debug!(error = %e, "cannot query output configs");
            None
        }
    };

    match supported {
        Some(config) => clamp_buffer(spec.frames_per_buffer, config.buffer_size()),
        None => BufferSize::Default,
    }
}

fn clamp_buffer(frames: usize, supported: &SupportedBufferSize) -> BufferSize {
    let frames = u32::try_from(frames).unwrap_or(u32::MAX).max(1);
    match supported {
        SupportedBufferSize::Range { min, max } => BufferSize::Fixed(frames.clamp(*min, *max)),
        SupportedBufferSize::Unknown => BufferSize::Fixed(frames),
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    rx: Receiver<Vec<T>>,
    shared: &Arc<StreamShared>,
) -> Result<Stream, AudioError>
where
    T: SizedSample + Copy + Default + Send + 'static,
{
    let mut playhead = Playhead::new(rx);
    let data_shared = Arc::clone(shared);
    let error_shared = Arc::clone(shared);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _| playhead.fill(data, &data_shared),
            move |err| {
                error!(error = %err, "output stream error");
                *error_shared
                    .error
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(err.to_string());
            },
            None,
        )
        .map_err(|e| AudioError::DeviceOpen(e.to_string()))
}

impl AudioSink for CpalSink {
    fn write(&mut self, buffer: &PcmBuffer) -> Result<(), SinkWriteError> {
        if let Some(err) = self.shared.take_error() {
            return Err(SinkWriteError::Device(err));
        }
        if buffer.is_empty() {
            return Ok(());
        }

        match (&self.sender, buffer) {
            (BlockSender::S16(tx), PcmBuffer::S16(samples)) => self.send(tx, samples)?,
            (BlockSender::S32(tx), PcmBuffer::S32(samples)) => self.send(tx, samples)?,
            _ => {
                return Err(SinkWriteError::Device(format!(
                    "sample width mismatch: sink is {} bit, buffer is {} bit",
                    self.spec.width.bits(),
                    buffer.width().bits()
                )));
            }
        }

        if self.shared.underflow.swap(false, Ordering::Relaxed) {
            return Err(SinkWriteError::Underflow);
        }
        Ok(())
    }

    fn drain(&mut self) {
        let pending = self.shared.pending.load(Ordering::Acquire);
        let channels = u64::from(self.spec.channels.max(1));
        let rate = u64::from(self.spec.sample_rate.max(1));
        let expected = Duration::from_millis(pending as u64 * 1000 / (channels * rate));
        let deadline = Instant::now() + expected + Duration::from_secs(1);

        while self.shared.pending.load(Ordering::Acquire) > 0 {
            if Instant::now() >= deadline {
                warn!("output did not drain in time");
                return;
            }
            if self.shared.error.lock().unwrap_or_else(PoisonError::into_inner).is_some() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        if let Err(e) = self.stream.pause() {
            debug!(error = %e, "pausing stream on release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playhead_plays_blocks_in_order() {
        let shared = StreamShared::default();
        let (tx, rx) = bounded(4);
        let mut playhead = Playhead::new(rx);

        shared.pending.store(6, Ordering::Relaxed);
        tx.send(vec![1_i16, 2, 3]).unwrap();
        tx.send(vec![4_i16, 5, 6]).unwrap();

        let mut out = [0_i16; 4];
        playhead.fill(&mut out, &shared);
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(shared.pending.load(Ordering::Relaxed), 2);
        assert!(!shared.underflow.load(Ordering::Relaxed));

        let mut out = [9_i16; 4];
        playhead.fill(&mut out, &shared);
        assert_eq!(out, [5, 6, 0, 0]);
        assert_eq!(shared.pending.load(Ordering::Relaxed), 0);
        assert!(shared.underflow.load(Ordering::Relaxed));
    }

    #[test]
    fn silence_before_first_block_is_not_an_underflow() {
        let shared = StreamShared::default();
        let (_tx, rx) = bounded::<Vec<i32>>(1);
        let mut playhead = Playhead::new(rx);

        let mut out = [7_i32; 8];
        playhead.fill(&mut out, &shared);
        assert_eq!(out, [0; 8]);
        assert!(!shared.underflow.load(Ordering::Relaxed));
    }

    #[test]
    fn buffer_is_sized_to_the_block_within_device_limits() {
        let range = SupportedBufferSize::Range { min: 64, max: 2048 };

        assert_eq!(clamp_buffer(1152, &range), BufferSize::Fixed(1152));
        assert_eq!(clamp_buffer(4608, &range), BufferSize::Fixed(2048));
        assert_eq!(clamp_buffer(16, &range), BufferSize::Fixed(64));
        assert_eq!(
            clamp_buffer(4096, &SupportedBufferSize::Unknown),
            BufferSize::Fixed(4096)
        );
    }

    #[test]
    fn stream_errors_are_taken_once() {
        let shared = StreamShared::default();
        *shared.error.lock().unwrap() = Some("device unplugged".to_string());

        assert_eq!(shared.take_error().as_deref(), Some("device unplugged"));
        assert_eq!(shared.take_error(), None);
    }
}
