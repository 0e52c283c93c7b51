//! Microphone permission hints.
//!
//! None of the cpal hosts report a denied permission as such: the stream opens
//! and then delivers silence or nothing at all. When a stream stalls we append
//! the platform's settings path to the error so the user knows where to look.

/// Where to grant microphone access on the current platform.
pub fn mic_permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone (enable your terminal)."
    }
    #[cfg(target_os = "linux")]
    {
        "Linux: check PipeWire/PulseAudio permissions and ensure the device is not muted."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & Security > Microphone (allow desktop apps to access the microphone)."
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        "Check OS microphone permissions."
    }
}
