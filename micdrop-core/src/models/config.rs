use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Sample rates tried in order when none are configured.
pub const DEFAULT_CANDIDATE_RATES: [f64; 4] = [44100.0, 48000.0, 16000.0, 32000.0];

/// How multi-channel input is reduced to a single output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonoDownmix {
    /// Mean of every input channel in the frame.
    #[default]
    Average,
    /// Channel 0 only.
    FirstChannel,
}

/// Configuration for a recording session.
///
/// Built once by the caller and validated at session start; components copy
/// the values they need at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingConfiguration {
    /// Device id or enumeration index, or None for the host default.
    pub device_id: Option<String>,

    /// Channels requested from the device (default: 1).
    pub input_channels: u16,

    /// Channels written to the WAV file (default: 1).
    pub output_channels: u16,

    /// Linear gain applied before clamping (default: 1.0).
    pub gain: f32,

    /// Bit depth for PCM output (default: 16). Valid values: 16, 24, 32.
    pub bit_depth: u16,

    /// Frames per device read (default: 512).
    pub frames_per_buffer: u32,

    /// Sample rates in order of preference.
    pub candidate_rates: Vec<f64>,

    pub mono_downmix: MonoDownmix,

    /// Destination WAV file.
    pub output_path: PathBuf,

    /// Maximum recording duration in seconds (None = until stopped).
    pub max_duration_secs: Option<f64>,

    /// Write a `.metadata.json` sidecar next to the recording.
    pub write_metadata: bool,

    /// Fail a device read that produces no data for this many seconds
    /// (None = wait indefinitely).
    pub stall_timeout_secs: Option<f64>,
}

impl RecordingConfiguration {
    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout_secs.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.input_channels == 0 {
            return Err(CaptureError::ConfigurationFailed("input channel count must be at least 1".into()));
        }
        if self.output_channels == 0 {
            return Err(CaptureError::ConfigurationFailed("output channel count must be at least 1".into()));
        }
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(CaptureError::ConfigurationFailed(format!(
                "gain must be a non-negative number, got {}",
                self.gain
            )));
        }
        if ![16, 24, 32].contains(&self.bit_depth) {
            return Err(CaptureError::ConfigurationFailed(format!("unsupported bit depth: {}", self.bit_depth)));
        }
        if self.frames_per_buffer == 0 {
            return Err(CaptureError::ConfigurationFailed("frames per buffer must be positive".into()));
        }
        if self.candidate_rates.is_empty() {
            return Err(CaptureError::ConfigurationFailed("no candidate sample rates".into()));
        }
        if let Some(rate) = self
            .candidate_rates
            .iter()
            .find(|r| !r.is_finite() || **r <= 0.0 || **r > u32::MAX as f64)
        {
            return Err(CaptureError::ConfigurationFailed(format!("invalid sample rate: {}", rate)));
        }
        // WAV stores block align in 16 bits and byte rate in 32 bits.
        let block_align = self.output_channels as u64 * self.bit_depth as u64 / 8;
        if block_align > u16::MAX as u64 {
            return Err(CaptureError::ConfigurationFailed(format!(
                "{} channels at {} bits exceed the WAV frame size limit",
                self.output_channels, self.bit_depth
            )));
        }
        if let Some(rate) = self
            .candidate_rates
            .iter()
            .find(|r| r.round() * block_align as f64 > u32::MAX as f64)
        {
            return Err(CaptureError::ConfigurationFailed(format!(
                "{} Hz with {} channels at {} bits exceeds the WAV byte rate limit",
                rate, self.output_channels, self.bit_depth
            )));
        }
        if let Some(max) = self.max_duration_secs {
            if !max.is_finite() || max <= 0.0 {
                return Err(CaptureError::ConfigurationFailed(format!("invalid max duration: {}", max)));
            }
        }
        if let Some(timeout) = self.stall_timeout_secs {
            if !timeout.is_finite() || timeout <= 0.0 {
                return Err(CaptureError::ConfigurationFailed(format!("invalid stall timeout: {}", timeout)));
            }
        }
        Ok(())
    }
}

impl Default for RecordingConfiguration {
    fn default() -> Self {
        Self {
            device_id: None,
            input_channels: 1,
            output_channels: 1,
            gain: 1.0,
            bit_depth: 16,
            frames_per_buffer: 512,
            candidate_rates: DEFAULT_CANDIDATE_RATES.to_vec(),
            mono_downmix: MonoDownmix::Average,
            output_path: PathBuf::from("micdropper.wav"),
            max_duration_secs: None,
            write_metadata: false,
            stall_timeout_secs: None,
        }
    }
}
