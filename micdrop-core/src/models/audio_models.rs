use serde::{Deserialize, Serialize};

/// One contiguous range of input formats a device advertises.
///
/// `buffer_frames` is `None` when the device does not report a buffer size range,
/// in which case any buffer size is assumed acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportedFormatRange {
    pub channels: u16,
    pub min_sample_rate: f64,
    pub max_sample_rate: f64,
    pub buffer_frames: Option<(u32, u32)>,
}

impl SupportedFormatRange {
    pub fn contains(&self, format: &StreamFormat) -> bool {
        let rate_ok = format.sample_rate >= self.min_sample_rate && format.sample_rate <= self.max_sample_rate;
        let buffer_ok = match self.buffer_frames {
            Some((min, max)) => (min..=max).contains(&format.frames_per_buffer),
            None => true,
        };
        self.channels == format.channels && rate_ok && buffer_ok
    }
}

/// A capture device and the input formats it accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub id: String,
    pub name: String,
    pub max_input_channels: u16,
    pub default_sample_rate: f64,
    pub is_default: bool,
    pub supported: Vec<SupportedFormatRange>,
}

/// Input-only stream parameters used both to probe and to open a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamFormat {
    pub sample_rate: f64,
    pub channels: u16,
    pub frames_per_buffer: u32,
}

impl StreamFormat {
    /// Number of interleaved samples in one full block.
    pub fn block_len(&self) -> usize {
        self.frames_per_buffer as usize * self.channels as usize
    }
}

/// A buffer of interleaved 16-bit samples as read from the device.
///
/// `samples[0]` is channel 0 of frame 0, `samples[1]` channel 1 of frame 0, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlock {
    samples: Vec<i16>,
    channels: u16,
}

impl AudioBlock {
    pub fn new(samples: Vec<i16>, channels: u16) -> Self {
        Self { samples, channels }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of complete frames held by the block.
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Real-time level metering of the transformed output (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioLevels {
    pub rms: f32,
    pub peak: f32,
}

/// Counters for debugging a recording session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureSessionDiagnostics {
    pub blocks_read: u64,
    pub short_blocks: u64,
    pub frames_written: u64,
    pub bytes_written: u64,
}
