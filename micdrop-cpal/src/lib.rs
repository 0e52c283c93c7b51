//! # micdrop-cpal
//!
//! Cross-platform capture backend for micdrop built on cpal.
//!
//! Provides:
//! - `CpalHost`: `CaptureHost` over the default cpal host (ALSA, CoreAudio, WASAPI)
//! - `CpalInputStream`: blocking fixed-size block reads over cpal's callback stream
//! - `DeviceEnumerator`: input devices with their supported configuration ranges
//! - `permissions`: where to grant microphone access when a stream stays silent
//!
//! ## Usage
//! ```ignore
//! use micdrop_core::{RecordingConfiguration, RecordingSession, StopSignal};
//! use micdrop_cpal::CpalHost;
//!
//! let mut session = RecordingSession::new(CpalHost::new(), RecordingConfiguration::default())?;
//! let result = session.record(&StopSignal::new())?;
//! ```

pub mod cpal_host;
pub mod device_enumerator;
pub mod error;
pub mod input_stream;
pub mod permissions;

pub use cpal_host::CpalHost;
pub use device_enumerator::DeviceEnumerator;
pub use error::BackendError;
pub use input_stream::CpalInputStream;
