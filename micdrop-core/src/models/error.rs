use thiserror::Error;

/// Errors that can occur while negotiating, capturing or writing a recording.
///
/// Every variant is fatal for the session. Short blocks are not errors; they
/// are reported through `TransformOutput::dropped_samples`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaptureError {
    #[error("device not available")]
    DeviceNotAvailable,

    #[error("device error: {0}")]
    DeviceError(String),

    #[error("no supported sample rate for {channels} channel(s) among {candidates:?}")]
    NoSupportedRate { channels: u16, candidates: Vec<f64> },

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl CaptureError {
    /// Wrap an I/O failure with a short description of the operation.
    pub fn storage(context: &str, err: std::io::Error) -> Self {
        Self::StorageError(format!("{}: {}", context, err))
    }
}
