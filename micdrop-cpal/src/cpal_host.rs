use std::time::Duration;

use micdrop_core::models::audio_models::{DeviceCapabilities, StreamFormat};
use micdrop_core::models::error::CaptureError;
use micdrop_core::traits::capture_host::CaptureHost;

use crate::device_enumerator::DeviceEnumerator;
use crate::input_stream::CpalInputStream;

/// `CaptureHost` backed by the platform's default cpal host.
#[derive(Default)]
pub struct CpalHost {
    enumerator: DeviceEnumerator,
    stall_timeout: Option<Duration>,
}

impl CpalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail reads that see no audio for `timeout`. Reads wait indefinitely by default.
    pub fn with_stall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stall_timeout = timeout;
        self
    }

    /// Backend name, e.g. "ALSA" or "CoreAudio".
    pub fn name(&self) -> &'static str {
        self.enumerator.host_name()
    }
}

impl CaptureHost for CpalHost {
    type Stream = CpalInputStream;

    fn devices(&self) -> Result<Vec<DeviceCapabilities>, CaptureError> {
        Ok(self.enumerator.list_capture_devices()?)
    }

    fn open_stream(&self, device: &DeviceCapabilities, format: StreamFormat) -> Result<CpalInputStream, CaptureError> {
        let handle = self
            .enumerator
            .find_capture_device(&device.id)?
            .ok_or(CaptureError::DeviceNotAvailable)?;
        CpalInputStream::open(&handle, &device.name, format, self.stall_timeout)
    }
}
