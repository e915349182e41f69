//! Block decoders built on Symphonia
//!
//! Lossy tracks (MP3) are always decoded to signed 16-bit and handed out in
//! fixed-size chunks. Lossless tracks (FLAC) keep their native bit depth and
//! are handed out one codec frame at a time; frames that fail to decode are
//! skipped so that a damaged file keeps playing after the next sync point.

use crate::error::{AudioError, Result};
use jukebox_core::{OutputSpec, PcmBuffer, SampleWidth, Track, TrackFormat};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

/// Frames per chunk handed out by the lossy decoder
pub const DEFAULT_LOSSY_CHUNK_FRAMES: usize = 4096;

/// Fallback block size when the codec does not announce one
const DEFAULT_FRAMES_PER_PACKET: usize = 4096;

/// Result of one decode step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeStep {
    /// Interleaved samples ready for the sink
    Block(PcmBuffer),
    /// A frame could not be decoded and was skipped
    Resync(String),
    /// No more audio
    EndOfStream,
}

/// A decoder producing sink-ready PCM blocks
pub trait BlockDecoder {
    /// Output format; accurate once the first block has been produced
    fn spec(&self) -> OutputSpec;

    /// Decode the next block
    ///
    /// # Errors
    /// Returns an error if the stream cannot be read any further
    fn next_block(&mut self) -> Result<DecodeStep>;
}

/// Opens the right decoder for a track
pub trait DecoderOpener: Send + Sync {
    /// Open `track` for decoding
    ///
    /// # Errors
    /// Returns `AudioError::TrackOpen` if the file cannot be opened or probed
    fn open(&self, track: &Track) -> Result<Box<dyn BlockDecoder>>;
}

/// Opens Symphonia decoders by track format
#[derive(Debug, Clone, Copy)]
pub struct SymphoniaOpener {
    lossy_chunk_frames: usize,
}

impl SymphoniaOpener {
    /// Create an opener handing out lossy chunks of `lossy_chunk_frames` frames
    pub fn new(lossy_chunk_frames: usize) -> Self {
        Self {
            lossy_chunk_frames: lossy_chunk_frames.max(1),
        }
    }
}

impl Default for SymphoniaOpener {
    fn default() -> Self {
        Self::new(DEFAULT_LOSSY_CHUNK_FRAMES)
    }
}

impl DecoderOpener for SymphoniaOpener {
    fn open(&self, track: &Track) -> Result<Box<dyn BlockDecoder>> {
        match track.format {
            TrackFormat::Lossy => Ok(Box::new(LossyDecoder::open(
                &track.path,
                self.lossy_chunk_frames,
            )?)),
            TrackFormat::Lossless => Ok(Box::new(LosslessDecoder::open(&track.path)?)),
        }
    }
}

/// Container reader plus codec for the default track of a file
struct SymphoniaStream {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: u16,
    bits_per_sample: Option<u32>,
    max_frames_per_packet: Option<u64>,
}

impl SymphoniaStream {
    fn open(path: &Path, extension: &str) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| AudioError::TrackOpen(format!("{}: {}", path.display(), e)))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        hint.with_extension(extension);

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::TrackOpen(format!("Failed to probe file: {}", e)))?;

        let format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| AudioError::TrackOpen("No audio tracks found".to_string()))?;

        let params = &track.codec_params;
        let decoder = symphonia::default::get_codecs()
            .make(params, &DecoderOptions::default())
            .map_err(|e| AudioError::TrackOpen(format!("Failed to create decoder: {}", e)))?;

        Ok(Self {
            track_id: track.id,
            sample_rate: params.sample_rate.unwrap_or(44100),
            channels: params.channels.map(|c| c.count() as u16).unwrap_or(2),
            bits_per_sample: params.bits_per_sample,
            max_frames_per_packet: params.max_frames_per_packet,
            format,
            decoder,
        })
    }

    /// Next packet of our track; `None` at end of file
    fn next_packet(&mut self) -> std::result::Result<Option<Packet>, SymphoniaError> {
        loop {
            match self.format.next_packet() {
                Ok(packet) if packet.track_id() == self.track_id => return Ok(Some(packet)),
                Ok(_) => continue,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Pick up rate and channel count from a decoded buffer
    fn observe(&mut self, spec: &SignalSpec) {
        self.sample_rate = spec.rate;
        self.channels = spec.channels.count() as u16;
    }
}

/// MP3 decoder emitting signed 16-bit chunks
pub struct LossyDecoder {
    stream: SymphoniaStream,
    chunk_frames: usize,
    pending: Vec<i16>,
    finished: bool,
}

impl LossyDecoder {
    /// Open an MP3 file
    pub fn open(path: &Path, chunk_frames: usize) -> Result<Self> {
        let stream = SymphoniaStream::open(path, TrackFormat::Lossy.extension())?;
        debug!(
            path = %path.display(),
            sample_rate = stream.sample_rate,
            channels = stream.channels,
            "lossy stream opened"
        );

        Ok(Self {
            stream,
            chunk_frames: chunk_frames.max(1),
            pending: Vec::new(),
            finished: false,
        })
    }

    fn chunk_samples(&self) -> usize {
        self.chunk_frames * usize::from(self.stream.channels.max(1))
    }
}

impl BlockDecoder for LossyDecoder {
    fn spec(&self) -> OutputSpec {
        OutputSpec {
            sample_rate: self.stream.sample_rate,
            channels: self.stream.channels,
            width: SampleWidth::S16,
            frames_per_buffer: self.chunk_frames,
        }
    }

    fn next_block(&mut self) -> Result<DecodeStep> {
        while !self.finished && self.pending.len() < self.chunk_samples() {
            let packet = self
                .stream
                .next_packet()
                .map_err(|e| AudioError::Decode(e.to_string()))?;

            let Some(packet) = packet else {
                self.finished = true;
                break;
            };

            let decoded = self
                .stream
                .decoder
                .decode(&packet)
                .map_err(|e| AudioError::Decode(e.to_string()))?;

            let spec = *decoded.spec();
            let mut samples = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
            samples.copy_interleaved_ref(decoded);
            self.stream.observe(&spec);
            self.pending.extend_from_slice(samples.samples());
        }

        if self.pending.is_empty() {
            return Ok(DecodeStep::EndOfStream);
        }

        let take = self.chunk_samples().min(self.pending.len());
        let block: Vec<i16> = self.pending.drain(..take).collect();
        Ok(DecodeStep::Block(PcmBuffer::S16(block)))
    }
}

/// FLAC decoder emitting one codec frame per block at native width
pub struct LosslessDecoder {
    stream: SymphoniaStream,
    width: SampleWidth,
    /// Frames in the first decoded block
    first_block_frames: Option<usize>,
}

impl LosslessDecoder {
    /// Open a FLAC file
    pub fn open(path: &Path) -> Result<Self> {
        let stream = SymphoniaStream::open(path, TrackFormat::Lossless.extension())?;
        let bits = stream.bits_per_sample.unwrap_or(16);
        let width = SampleWidth::for_bits_per_sample(bits);

        info!(
            path = %path.display(),
            bits_per_sample = bits,
            sample_rate = stream.sample_rate,
            channels = stream.channels,
            "lossless stream opened"
        );

        Ok(Self {
            stream,
            width,
            first_block_frames: None,
        })
    }
}

impl BlockDecoder for LosslessDecoder {
    fn spec(&self) -> OutputSpec {
        OutputSpec {
            sample_rate: self.stream.sample_rate,
            channels: self.stream.channels,
            width: self.width,
            frames_per_buffer: self.first_block_frames.unwrap_or_else(|| {
                self.stream
                    .max_frames_per_packet
                    .map_or(DEFAULT_FRAMES_PER_PACKET, |frames| frames as usize)
            }),
        }
    }

    fn next_block(&mut self) -> Result<DecodeStep> {
        let packet = match self.stream.next_packet() {
            Ok(Some(packet)) => packet,
            Ok(None) => return Ok(DecodeStep::EndOfStream),
            Err(SymphoniaError::DecodeError(e)) => return Ok(DecodeStep::Resync(e.to_string())),
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        let decoded = match self.stream.decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => return Ok(DecodeStep::Resync(e.to_string())),
            // A frame cut short by the end of the file
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(DecodeStep::Resync(e.to_string()));
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        let capacity = decoded.capacity() as u64;
        let frames = decoded.frames();
        let spec = *decoded.spec();
        let block = match self.width {
            SampleWidth::S16 => {
                let mut samples = SampleBuffer::<i16>::new(capacity, spec);
                samples.copy_interleaved_ref(decoded);
                PcmBuffer::S16(samples.samples().to_vec())
            }
            // 24-bit samples land in the upper bits of the word
            SampleWidth::S32 => {
                let mut samples = SampleBuffer::<i32>::new(capacity, spec);
                samples.copy_interleaved_ref(decoded);
                PcmBuffer::S32(samples.samples().to_vec())
            }
        };
        self.stream.observe(&spec);
        self.first_block_frames.get_or_insert(frames);

        Ok(DecodeStep::Block(block))
    }
}
