//! Input device enumeration on the default cpal host.
//!
//! Lists capture devices with every input configuration range they advertise,
//! restricted to sample formats the stream can convert to 16-bit.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{SampleFormat, SupportedBufferSize, SupportedStreamConfigRange};

use micdrop_core::models::audio_models::{DeviceCapabilities, SupportedFormatRange};

use crate::error::BackendError;

/// Audio device enumerator over a cpal host.
pub struct DeviceEnumerator {
    host: cpal::Host,
}

impl DeviceEnumerator {
    /// Enumerator for the platform's default host (ALSA, CoreAudio, WASAPI, ...).
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    pub fn host_name(&self) -> &'static str {
        self.host.id().name()
    }

    /// List capture devices in enumeration order.
    ///
    /// Devices whose configurations cannot be queried are skipped with a warning.
    pub fn list_capture_devices(&self) -> Result<Vec<DeviceCapabilities>, BackendError> {
        let default_name = self.host.default_input_device().and_then(|d| d.name().ok());

        let mut devices = Vec::new();
        for (index, device) in self.host.input_devices()?.enumerate() {
            let name = device.name().unwrap_or_else(|_| format!("Input {}", index));
            let is_default = default_name.as_deref() == Some(name.as_str());

            match capabilities(&device, name.clone(), is_default) {
                Ok(caps) => devices.push(caps),
                Err(e) => log::warn!("Skipping input device '{}': {}", name, e),
            }
        }

        log::debug!("{} input device(s) on host {}", devices.len(), self.host_name());
        Ok(devices)
    }

    /// Look up a capture device by the id reported in `list_capture_devices`.
    pub fn find_capture_device(&self, id: &str) -> Result<Option<cpal::Device>, BackendError> {
        Ok(self
            .host
            .input_devices()?
            .find(|d| d.name().map(|n| n == id).unwrap_or(false)))
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

/// cpal exposes no stable device id, so the device name doubles as one.
fn capabilities(device: &cpal::Device, name: String, is_default: bool) -> Result<DeviceCapabilities, BackendError> {
    let supported: Vec<SupportedFormatRange> = device
        .supported_input_configs()?
        .filter(|config| is_convertible(config.sample_format()))
        .map(|config| to_format_range(&config))
        .collect();

    let default_sample_rate = match device.default_input_config() {
        Ok(config) => config.sample_rate().0 as f64,
        Err(_) => supported.first().map(|r| r.max_sample_rate).unwrap_or(0.0),
    };
    let max_input_channels = supported.iter().map(|r| r.channels).max().unwrap_or(0);

    Ok(DeviceCapabilities {
        id: name.clone(),
        name,
        max_input_channels,
        default_sample_rate,
        is_default,
        supported,
    })
}

/// Sample formats the input stream converts to 16-bit.
pub(crate) fn is_convertible(format: SampleFormat) -> bool {
    matches!(format, SampleFormat::I16 | SampleFormat::F32 | SampleFormat::U16)
}

pub(crate) fn to_format_range(config: &SupportedStreamConfigRange) -> SupportedFormatRange {
    let buffer_frames = match *config.buffer_size() {
        SupportedBufferSize::Range { min, max } => Some((min, max)),
        SupportedBufferSize::Unknown => None,
    };
    SupportedFormatRange {
        channels: config.channels(),
        min_sample_rate: config.min_sample_rate().0 as f64,
        max_sample_rate: config.max_sample_rate().0 as f64,
        buffer_frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpal::SampleRate;
    use micdrop_core::models::audio_models::StreamFormat;

    fn range(buffer: SupportedBufferSize, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(2, SampleRate(8000), SampleRate(48000), buffer, format)
    }

    #[test]
    fn buffer_range_is_carried_over() {
        let converted = to_format_range(&range(SupportedBufferSize::Range { min: 64, max: 4096 }, SampleFormat::I16));
        assert_eq!(converted.channels, 2);
        assert_eq!(converted.min_sample_rate, 8000.0);
        assert_eq!(converted.max_sample_rate, 48000.0);
        assert_eq!(converted.buffer_frames, Some((64, 4096)));

        let fits = StreamFormat {
            sample_rate: 44100.0,
            channels: 2,
            frames_per_buffer: 512,
        };
        assert!(converted.contains(&fits));
        assert!(!converted.contains(&StreamFormat {
            frames_per_buffer: 8192,
            ..fits
        }));
    }

    #[test]
    fn unknown_buffer_size_accepts_any_block() {
        let converted = to_format_range(&range(SupportedBufferSize::Unknown, SampleFormat::F32));
        assert_eq!(converted.buffer_frames, None);
    }

    #[test]
    fn only_integer_and_float_formats_are_convertible() {
        assert!(is_convertible(SampleFormat::I16));
        assert!(is_convertible(SampleFormat::F32));
        assert!(is_convertible(SampleFormat::U16));
        assert!(!is_convertible(SampleFormat::I32));
        assert!(!is_convertible(SampleFormat::F64));
    }
}
