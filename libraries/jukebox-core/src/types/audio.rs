/// PCM types exchanged between decoders and the output sink
use serde::{Deserialize, Serialize};

/// Native sample width of the output sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleWidth {
    /// 16-bit signed samples
    S16,
    /// 24-bit samples packed into the upper bits of a 32-bit word, or native 32-bit
    S32,
}

impl SampleWidth {
    /// Pick the container width for a source bit depth
    pub fn for_bits_per_sample(bits: u32) -> Self {
        if bits <= 16 {
            SampleWidth::S16
        } else {
            SampleWidth::S32
        }
    }

    /// Container size in bits
    pub fn bits(self) -> u16 {
        match self {
            SampleWidth::S16 => 16,
            SampleWidth::S32 => 32,
        }
    }
}

/// Parameters the output sink is opened with
///
/// Known only after the first block of a track has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSpec {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
    /// Sample container width
    pub width: SampleWidth,
    /// Frames per buffer, sized from the first decoded block
    pub frames_per_buffer: usize,
}

/// One block of interleaved PCM samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PcmBuffer {
    /// 16-bit samples
    S16(Vec<i16>),
    /// 32-bit samples
    S32(Vec<i32>),
}

impl PcmBuffer {
    /// Sample width of this buffer
    pub fn width(&self) -> SampleWidth {
        match self {
            PcmBuffer::S16(_) => SampleWidth::S16,
            PcmBuffer::S32(_) => SampleWidth::S32,
        }
    }

    /// Number of samples (all channels)
    pub fn len(&self) -> usize {
        match self {
            PcmBuffer::S16(samples) => samples.len(),
            PcmBuffer::S32(samples) => samples.len(),
        }
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self, channels: u16) -> usize {
        self.len() / usize::from(channels.max(1))
    }
}

/// Error returned by `AudioSink::write`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkWriteError {
    /// The device ran dry before this buffer arrived; playback continues
    Underflow,
    /// Any other device failure
    Device(String),
}

impl std::fmt::Display for SinkWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkWriteError::Underflow => write!(f, "Output underflowed"),
            SinkWriteError::Device(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SinkWriteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_from_bit_depth() {
        assert_eq!(SampleWidth::for_bits_per_sample(16), SampleWidth::S16);
        assert_eq!(SampleWidth::for_bits_per_sample(8), SampleWidth::S16);
        assert_eq!(SampleWidth::for_bits_per_sample(24), SampleWidth::S32);
        assert_eq!(SampleWidth::for_bits_per_sample(32), SampleWidth::S32);
    }

    #[test]
    fn buffer_frames_calculation() {
        // 8 samples with 2 channels = 4 frames
        let buffer = PcmBuffer::S16(vec![0; 8]);
        assert_eq!(buffer.frames(2), 4);
        assert_eq!(buffer.width(), SampleWidth::S16);

        let buffer = PcmBuffer::S32(vec![0; 9]);
        assert_eq!(buffer.frames(3), 3);
        assert_eq!(buffer.frames(0), 9);
    }
}
