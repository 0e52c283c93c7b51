use crate::models::config::{MonoDownmix, RecordingConfiguration};

/// Largest magnitude of the signed 16-bit domain, used to normalize raw samples.
pub const I16_FULL_SCALE: f32 = i16::MAX as f32;

/// Output of one `SampleTransform::transform` call.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    /// Interleaved normalized samples, `frames * output_channels` long.
    pub samples: Vec<f32>,
    /// Complete frames consumed from the block.
    pub frames: usize,
    /// Trailing samples that did not form a complete frame and were ignored.
    pub dropped_samples: usize,
}

impl TransformOutput {
    /// True when the block ended with a partial frame.
    pub fn is_short(&self) -> bool {
        self.dropped_samples > 0
    }
}

/// Pure gain, clamp and channel-mapping stage between capture and encoding.
///
/// Raw samples are divided by `I16_FULL_SCALE`, multiplied by the gain and
/// clamped to `[-1.0, 1.0]`. Channel mapping:
///
/// - `in == out` (mono or stereo): passthrough
/// - `out == 1`: mean of all inputs, or channel 0 with `MonoDownmix::FirstChannel`
/// - `in == 1, out == 2`: mono duplicated to left and right
/// - otherwise: every output channel carries the mean of the frame's inputs
#[derive(Debug, Clone)]
pub struct SampleTransform {
    input_channels: usize,
    output_channels: usize,
    gain: f32,
    mono_downmix: MonoDownmix,
}

impl SampleTransform {
    pub fn new(input_channels: u16, output_channels: u16, gain: f32) -> Self {
        Self {
            input_channels: input_channels.max(1) as usize,
            output_channels: output_channels.max(1) as usize,
            gain,
            mono_downmix: MonoDownmix::default(),
        }
    }

    pub fn from_config(config: &RecordingConfiguration) -> Self {
        Self::new(config.input_channels, config.output_channels, config.gain).with_mono_downmix(config.mono_downmix)
    }

    pub fn with_mono_downmix(mut self, policy: MonoDownmix) -> Self {
        self.mono_downmix = policy;
        self
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    /// Apply gain to a raw value already expressed in the 16-bit domain, then clamp.
    fn scale(&self, raw: f32) -> f32 {
        (raw / I16_FULL_SCALE * self.gain).clamp(-1.0, 1.0)
    }

    /// Normalize a single raw sample.
    pub fn normalize(&self, raw: i16) -> f32 {
        self.scale(raw as f32)
    }

    /// Transform a block of interleaved raw samples into interleaved normalized output.
    ///
    /// Stops at the last complete input frame; any remainder is reported in
    /// `dropped_samples` and never emitted.
    pub fn transform(&self, samples: &[i16]) -> TransformOutput {
        let frames = samples.len() / self.input_channels;
        let dropped_samples = samples.len() - frames * self.input_channels;

        let mut output = Vec::with_capacity(frames * self.output_channels);
        for frame in samples.chunks_exact(self.input_channels) {
            self.map_frame(frame, &mut output);
        }

        TransformOutput {
            samples: output,
            frames,
            dropped_samples,
        }
    }

    fn map_frame(&self, frame: &[i16], out: &mut Vec<f32>) {
        let (inputs, outputs) = (self.input_channels, self.output_channels);

        if inputs == outputs && outputs <= 2 {
            out.extend(frame.iter().map(|&s| self.normalize(s)));
        } else if outputs == 1 {
            let value = match self.mono_downmix {
                MonoDownmix::Average => self.mean(frame),
                MonoDownmix::FirstChannel => self.normalize(frame[0]),
            };
            out.push(value);
        } else if inputs == 1 && outputs == 2 {
            let value = self.normalize(frame[0]);
            out.extend_from_slice(&[value, value]);
        } else {
            let value = self.mean(frame);
            out.extend(std::iter::repeat(value).take(outputs));
        }
    }

    fn mean(&self, frame: &[i16]) -> f32 {
        let sum: i64 = frame.iter().map(|&s| s as i64).sum();
        self.scale(sum as f32 / frame.len() as f32)
    }

    /// Compute RMS level of samples (0.0–1.0 range for normalized audio).
    pub fn rms_level(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    /// Compute peak absolute level of samples.
    pub fn peak_level(samples: &[f32]) -> f32 {
        samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn raw(value: f32) -> i16 {
        (value * I16_FULL_SCALE).round() as i16
    }

    #[test]
    fn normalizes_by_i16_max() {
        let transform = SampleTransform::new(1, 1, 1.0);
        let out = transform.transform(&[0, i16::MAX, 16384]);

        assert_eq!(out.frames, 3);
        assert_eq!(out.samples[0], 0.0);
        assert_eq!(out.samples[1], 1.0);
        assert_abs_diff_eq!(out.samples[2], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn gain_above_one_clamps_instead_of_wrapping() {
        let transform = SampleTransform::new(1, 1, 2.0);
        let out = transform.transform(&[i16::MAX, i16::MIN, -20000, 20000]);

        assert_eq!(out.samples[0], 1.0);
        assert_eq!(out.samples[1], -1.0);
        assert_eq!(out.samples[2], -1.0);
        assert_eq!(out.samples[3], 1.0);
    }

    #[test]
    fn i16_min_clamps_to_minus_one_at_unity_gain() {
        let transform = SampleTransform::new(1, 1, 1.0);
        assert_eq!(transform.normalize(i16::MIN), -1.0);
    }

    #[test]
    fn output_always_in_range() {
        for gain in [0.0f32, 0.5, 1.0, 3.0, 100.0] {
            let transform = SampleTransform::new(2, 1, gain);
            let block: Vec<i16> = (i16::MIN..=i16::MAX).step_by(97).collect();
            let out = transform.transform(&block);
            assert!(out.samples.iter().all(|s| (-1.0..=1.0).contains(s)), "gain {}", gain);
        }
    }

    #[test]
    fn zero_gain_is_silence() {
        let transform = SampleTransform::new(1, 1, 0.0);
        let out = transform.transform(&[1000, -1000, i16::MAX]);
        assert!(out.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn four_channels_to_mono_is_mean() {
        let transform = SampleTransform::new(4, 1, 1.0);
        let frame = [raw(0.2), raw(0.4), raw(0.6), raw(0.8)];
        let out = transform.transform(&frame);

        assert_eq!(out.samples.len(), 1);
        assert_abs_diff_eq!(out.samples[0], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn mono_first_channel_policy() {
        let transform = SampleTransform::new(2, 1, 1.0).with_mono_downmix(MonoDownmix::FirstChannel);
        let out = transform.transform(&[raw(0.25), raw(-0.75), raw(0.5), raw(0.0)]);

        assert_eq!(out.frames, 2);
        assert_abs_diff_eq!(out.samples[0], 0.25, epsilon = 1e-4);
        assert_abs_diff_eq!(out.samples[1], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn mono_to_stereo_duplicates() {
        let transform = SampleTransform::new(1, 2, 1.0);
        let out = transform.transform(&[raw(0.3), raw(-0.6)]);

        assert_eq!(out.samples.len(), 4);
        assert_eq!(out.samples[0], out.samples[1]);
        assert_eq!(out.samples[2], out.samples[3]);
        assert_abs_diff_eq!(out.samples[2], -0.6, epsilon = 1e-4);
    }

    #[test]
    fn stereo_passes_through() {
        let transform = SampleTransform::new(2, 2, 1.0);
        let out = transform.transform(&[raw(0.1), raw(0.9), raw(-0.2), raw(-0.8)]);

        assert_eq!(out.frames, 2);
        assert_abs_diff_eq!(out.samples[0], 0.1, epsilon = 1e-4);
        assert_abs_diff_eq!(out.samples[1], 0.9, epsilon = 1e-4);
        assert_abs_diff_eq!(out.samples[3], -0.8, epsilon = 1e-4);
    }

    #[test]
    fn many_channels_to_stereo_broadcasts_mean() {
        let transform = SampleTransform::new(3, 2, 1.0);
        let out = transform.transform(&[raw(0.3), raw(0.6), raw(0.9)]);

        assert_eq!(out.samples.len(), 2);
        assert_abs_diff_eq!(out.samples[0], 0.6, epsilon = 1e-4);
        assert_abs_diff_eq!(out.samples[1], 0.6, epsilon = 1e-4);
    }

    #[test]
    fn general_n_output_uses_mean_for_every_channel() {
        let transform = SampleTransform::new(2, 4, 1.0);
        let out = transform.transform(&[raw(0.2), raw(0.4)]);

        assert_eq!(out.samples.len(), 4);
        for s in out.samples {
            assert_abs_diff_eq!(s, 0.3, epsilon = 1e-4);
        }
    }

    #[test]
    fn partial_trailing_frame_is_dropped() {
        let transform = SampleTransform::new(3, 1, 1.0);
        let out = transform.transform(&[100, 200, 300, 400, 500]);

        assert_eq!(out.frames, 1);
        assert_eq!(out.samples.len(), 1);
        assert_eq!(out.dropped_samples, 2);
        assert!(out.is_short());
    }

    #[test]
    fn empty_block() {
        let transform = SampleTransform::new(2, 2, 1.0);
        let out = transform.transform(&[]);

        assert!(out.samples.is_empty());
        assert_eq!(out.frames, 0);
        assert!(!out.is_short());
    }

    #[test]
    fn mean_with_gain_clamps_after_mixing() {
        let transform = SampleTransform::new(2, 1, 2.0);
        let out = transform.transform(&[i16::MAX, 0]);

        assert_abs_diff_eq!(out.samples[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn rms_level_silence() {
        assert_eq!(SampleTransform::rms_level(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn rms_level_full_scale() {
        let rms = SampleTransform::rms_level(&[1.0, -1.0, 1.0]);
        assert_abs_diff_eq!(rms, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn peak_level_basic() {
        assert_abs_diff_eq!(SampleTransform::peak_level(&[0.1, -0.5, 0.3]), 0.5, epsilon = 1e-6);
    }
}
