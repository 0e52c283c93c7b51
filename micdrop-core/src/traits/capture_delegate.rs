use crate::models::audio_models::AudioLevels;
use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::RecordingState;

/// Event delegate for recording session notifications.
///
/// All methods are called synchronously from the capture loop; keep them cheap.
pub trait RecordingDelegate {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &RecordingState);

    /// Called after each block is written with the levels of that block.
    fn on_levels_updated(&self, levels: &AudioLevels);

    /// Called when a fatal error ends the session.
    fn on_error(&self, error: &CaptureError);

    /// Called when the file is finalized.
    fn on_recording_finished(&self, result: &RecordingResult);
}
