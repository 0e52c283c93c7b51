use crate::models::audio_models::StreamFormat;
use crate::models::error::CaptureError;
use crate::traits::capture_host::FormatProbe;

/// Picks the recording sample rate from an ordered preference list.
///
/// The first candidate the device accepts wins, so callers list rates from
/// most to least desirable.
#[derive(Debug, Clone)]
pub struct RateNegotiator {
    candidates: Vec<f64>,
    frames_per_buffer: u32,
}

impl RateNegotiator {
    pub fn new(candidates: Vec<f64>, frames_per_buffer: u32) -> Self {
        Self {
            candidates,
            frames_per_buffer,
        }
    }

    pub fn candidates(&self) -> &[f64] {
        &self.candidates
    }

    /// Return the first candidate rate supported for `channels` input channels.
    pub fn negotiate<P: FormatProbe + ?Sized>(&self, device: &P, channels: u16) -> Result<f64, CaptureError> {
        if self.candidates.is_empty() {
            return Err(CaptureError::ConfigurationFailed("no candidate sample rates".into()));
        }
        if channels == 0 {
            return Err(CaptureError::ConfigurationFailed("channel count must be at least 1".into()));
        }

        for &rate in &self.candidates {
            let format = StreamFormat {
                sample_rate: rate,
                channels,
                frames_per_buffer: self.frames_per_buffer,
            };
            if device.is_format_supported(&format) {
                log::info!("Negotiated sample rate {} Hz ({} ch)", rate, channels);
                return Ok(rate);
            }
            log::debug!("Sample rate {} Hz not supported for {} ch", rate, channels);
        }

        Err(CaptureError::NoSupportedRate {
            channels,
            candidates: self.candidates.clone(),
        })
    }

    /// Evaluate every candidate without stopping at the first match.
    pub fn probe_all<P: FormatProbe + ?Sized>(&self, device: &P, channels: u16) -> Vec<(f64, bool)> {
        self.candidates
            .iter()
            .map(|&rate| {
                let format = StreamFormat {
                    sample_rate: rate,
                    channels,
                    frames_per_buffer: self.frames_per_buffer,
                };
                (rate, device.is_format_supported(&format))
            })
            .collect()
    }
}
