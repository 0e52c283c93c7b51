//! # micdrop-core
//!
//! Platform-agnostic microphone capture core library.
//!
//! Provides sample-rate negotiation, sample transformation (gain, clamp,
//! channel mapping), streaming WAV I/O and session orchestration.
//! Device backends implement the `CaptureHost` trait and plug into the
//! generic `RecordingSession`.
//!
//! ## Architecture
//!
//! ```text
//! micdrop-core (this crate)
//! ├── traits/       ← CaptureHost, CaptureStream, FormatProbe, RecordingDelegate, SeekableWriter
//! ├── models/       ← CaptureError, RecordingState, RecordingConfiguration, StreamFormat, etc.
//! ├── processing/   ← RateNegotiator, SampleTransform, RingBuffer, WAV header encode/parse
//! ├── session/      ← RecordingSession (generic orchestrator), StopSignal
//! └── storage/      ← WavWriter, checksum, metadata sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{
    AudioBlock, AudioLevels, CaptureSessionDiagnostics, DeviceCapabilities, StreamFormat, SupportedFormatRange,
};
pub use models::config::{MonoDownmix, RecordingConfiguration, DEFAULT_CANDIDATE_RATES};
pub use models::error::CaptureError;
pub use models::recording_result::{RecordingMetadata, RecordingResult, StopReason};
pub use models::state::{ContainerState, RecordingState};
pub use processing::rate_negotiator::RateNegotiator;
pub use processing::ring_buffer::RingBuffer;
pub use processing::sample_transform::{SampleTransform, TransformOutput};
pub use processing::wav_format::{WavHeader, WavSpec, WAV_HEADER_SIZE};
pub use session::recorder::RecordingSession;
pub use session::stop_signal::StopSignal;
pub use storage::inspect_wav;
pub use storage::wav_writer::WavWriter;
pub use traits::capture_delegate::RecordingDelegate;
pub use traits::capture_host::{find_device, CaptureHost, CaptureStream, FormatProbe};
pub use traits::seekable_writer::SeekableWriter;
