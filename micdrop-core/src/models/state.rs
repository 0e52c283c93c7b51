use super::error::CaptureError;
use super::recording_result::RecordingResult;

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → negotiating → ready → capturing → stopping → completed
///             ↓                    ↓           ↓
///           failed              stopping     failed
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingState {
    Idle,
    Negotiating,
    Ready { sample_rate: f64 },
    Capturing { duration_secs: f64 },
    Stopping,
    Completed(Box<RecordingResult>),
    Failed(CaptureError),
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    /// Returns the current duration if in a state that tracks it.
    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Capturing { duration_secs } => Some(*duration_secs),
            Self::Completed(result) => Some(result.duration_secs),
            _ => None,
        }
    }

    /// Short lowercase name for logs and status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Negotiating => "negotiating",
            Self::Ready { .. } => "ready",
            Self::Capturing { .. } => "capturing",
            Self::Stopping => "stopping",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }
}

/// Lifecycle of a WAV container.
///
/// ```text
/// unopened → header_written → streaming → finalized
///                 └──────────────────────────↑
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Unopened,
    HeaderWritten,
    Streaming,
    Finalized,
}

impl ContainerState {
    /// Whether samples may still be appended.
    pub fn is_writable(self) -> bool {
        matches!(self, Self::HeaderWritten | Self::Streaming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_only_for_timed_states() {
        assert_eq!(RecordingState::Capturing { duration_secs: 1.5 }.duration(), Some(1.5));
        assert_eq!(RecordingState::Ready { sample_rate: 48000.0 }.duration(), None);
        assert!(RecordingState::Failed(CaptureError::DeviceNotAvailable).is_terminal());
        assert!(!RecordingState::Stopping.is_terminal());
    }

    #[test]
    fn container_writable_states() {
        assert!(!ContainerState::Unopened.is_writable());
        assert!(ContainerState::HeaderWritten.is_writable());
        assert!(ContainerState::Streaming.is_writable());
        assert!(!ContainerState::Finalized.is_writable());
    }
}
