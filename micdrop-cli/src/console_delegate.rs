use std::time::{Duration, Instant};

use parking_lot::Mutex;

use micdrop_core::{AudioLevels, CaptureError, RecordingDelegate, RecordingResult, RecordingState};

/// Minimum interval between level log lines.
const LEVEL_INTERVAL: Duration = Duration::from_secs(1);

/// RecordingDelegate that reports session progress through the logger.
///
/// Level updates arrive once per block; they are folded into a running peak
/// and logged at most once per `LEVEL_INTERVAL`.
pub struct ConsoleDelegate {
    meter: Mutex<LevelMeter>,
}

struct LevelMeter {
    last_report: Instant,
    peak: f32,
    rms: f32,
}

impl ConsoleDelegate {
    pub fn new() -> Self {
        Self {
            meter: Mutex::new(LevelMeter {
                last_report: Instant::now(),
                peak: 0.0,
                rms: 0.0,
            }),
        }
    }
}

impl RecordingDelegate for ConsoleDelegate {
    fn on_state_changed(&self, state: &RecordingState) {
        match state {
            RecordingState::Ready { sample_rate } => log::info!("Negotiated {} Hz", sample_rate),
            RecordingState::Capturing { .. } => log::info!("Recording... press Ctrl-C to stop"),
            other => log::debug!("State: {}", other.label()),
        }
    }

    fn on_levels_updated(&self, levels: &AudioLevels) {
        let mut meter = self.meter.lock();
        meter.peak = meter.peak.max(levels.peak);
        meter.rms = meter.rms.max(levels.rms);

        if meter.last_report.elapsed() >= LEVEL_INTERVAL {
            log::info!("Level: rms {:>5.1} dBFS, peak {:>5.1} dBFS", to_dbfs(meter.rms), to_dbfs(meter.peak));
            if meter.peak >= 1.0 {
                log::warn!("Input is clipping; lower --gain");
            }
            meter.last_report = Instant::now();
            meter.peak = 0.0;
            meter.rms = 0.0;
        }
    }

    fn on_error(&self, error: &CaptureError) {
        log::error!("Recording error: {}", error);
    }

    fn on_recording_finished(&self, result: &RecordingResult) {
        log::debug!("Recording finished ({:?})", result.stop_reason);
    }
}

/// Decibels relative to full scale, floored at -96 dB.
fn to_dbfs(level: f32) -> f32 {
    if level <= 0.0 {
        -96.0
    } else {
        (20.0 * level.log10()).max(-96.0)
    }
}
