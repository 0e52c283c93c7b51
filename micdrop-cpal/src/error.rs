use thiserror::Error;

use micdrop_core::models::error::CaptureError;

/// Failures reported by cpal, before they are folded into `CaptureError`.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to enumerate input devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to query input configurations: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("failed to pause input stream: {0}")]
    Pause(#[from] cpal::PauseStreamError),
}

impl From<BackendError> for CaptureError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::BuildStream(cpal::BuildStreamError::DeviceNotAvailable)
            | BackendError::SupportedConfigs(cpal::SupportedStreamConfigsError::DeviceNotAvailable) => {
                CaptureError::DeviceNotAvailable
            }
            BackendError::BuildStream(
                cpal::BuildStreamError::StreamConfigNotSupported | cpal::BuildStreamError::InvalidArgument,
            ) => CaptureError::ConfigurationFailed(err.to_string()),
            other => CaptureError::DeviceError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_config_maps_to_configuration_failed() {
        let err: CaptureError = BackendError::from(cpal::BuildStreamError::StreamConfigNotSupported).into();
        assert!(matches!(err, CaptureError::ConfigurationFailed(_)));
    }

    #[test]
    fn missing_device_maps_to_not_available() {
        let err: CaptureError = BackendError::from(cpal::BuildStreamError::DeviceNotAvailable).into();
        assert_eq!(err, CaptureError::DeviceNotAvailable);
    }
}
