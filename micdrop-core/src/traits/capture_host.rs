use crate::models::audio_models::{AudioBlock, DeviceCapabilities, StreamFormat};
use crate::models::error::CaptureError;

/// An open input stream on a capture device.
///
/// Reads are blocking and return whole blocks of `frames_per_buffer` frames.
pub trait CaptureStream {
    /// Start delivering audio.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Block until the next buffer is captured.
    ///
    /// Returns `Ok(None)` when the source has no more audio (e.g. a finite test source).
    fn read_block(&mut self) -> Result<Option<AudioBlock>, CaptureError>;

    /// Stop capturing and release device resources.
    fn stop(&mut self) -> Result<(), CaptureError>;
}

/// Interface for platform-specific audio hosts.
///
/// Implemented by:
/// - `CpalHost` (micdrop-cpal)
/// - in-memory fakes in tests
pub trait CaptureHost {
    type Stream: CaptureStream;

    /// List devices that can capture audio.
    fn devices(&self) -> Result<Vec<DeviceCapabilities>, CaptureError>;

    /// Open an input-only stream with exactly the given format.
    fn open_stream(&self, device: &DeviceCapabilities, format: StreamFormat) -> Result<Self::Stream, CaptureError>;

    /// The device used when none is configured: the host default, else the first listed.
    fn default_device(&self) -> Result<DeviceCapabilities, CaptureError> {
        let devices = self.devices()?;
        devices
            .iter()
            .find(|d| d.is_default)
            .or_else(|| devices.first())
            .cloned()
            .ok_or(CaptureError::DeviceNotAvailable)
    }
}

/// Answers whether a device accepts a given stream format.
pub trait FormatProbe {
    fn is_format_supported(&self, format: &StreamFormat) -> bool;
}

impl FormatProbe for DeviceCapabilities {
    fn is_format_supported(&self, format: &StreamFormat) -> bool {
        format.channels <= self.max_input_channels && self.supported.iter().any(|r| r.contains(format))
    }
}

/// Resolve a device selector: exact id, then exact name, then enumeration index.
pub fn find_device(devices: &[DeviceCapabilities], selector: &str) -> Result<DeviceCapabilities, CaptureError> {
    if let Some(device) = devices.iter().find(|d| d.id == selector || d.name == selector) {
        return Ok(device.clone());
    }
    selector
        .parse::<usize>()
        .ok()
        .and_then(|index| devices.get(index))
        .cloned()
        .ok_or_else(|| CaptureError::DeviceError(format!("no capture device matches '{}'", selector)))
}
