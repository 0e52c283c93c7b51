use std::fs::File;
use std::sync::Arc;

use crate::models::audio_models::{AudioLevels, CaptureSessionDiagnostics, DeviceCapabilities, StreamFormat};
use crate::models::config::RecordingConfiguration;
use crate::models::error::CaptureError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult, StopReason};
use crate::models::state::RecordingState;
use crate::processing::rate_negotiator::RateNegotiator;
use crate::processing::sample_transform::SampleTransform;
use crate::processing::wav_format::WavSpec;
use crate::session::stop_signal::StopSignal;
use crate::storage::checksum::sha256_file;
use crate::storage::metadata::write_metadata;
use crate::storage::wav_writer::WavWriter;
use crate::traits::capture_delegate::RecordingDelegate;
use crate::traits::capture_host::{find_device, CaptureHost, CaptureStream};

/// Single-threaded recording session.
///
/// Generic over the device backend via the `CaptureHost` trait. Data flow:
/// ```text
/// [CaptureStream::read_block] → [SampleTransform] → [WavWriter::append]
///        ↑ once per iteration: StopSignal / max duration check
/// ```
/// The WAV header is finalized on every exit from the loop, including a stop
/// request and a failed device read.
pub struct RecordingSession<H: CaptureHost> {
    host: H,
    config: RecordingConfiguration,
    state: RecordingState,
    delegate: Option<Arc<dyn RecordingDelegate>>,
    diagnostics: CaptureSessionDiagnostics,
}

impl<H: CaptureHost> RecordingSession<H> {
    /// Validate `config` and bind it to `host`.
    pub fn new(host: H, config: RecordingConfiguration) -> Result<Self, CaptureError> {
        config.validate()?;
        Ok(Self {
            host,
            config,
            state: RecordingState::Idle,
            delegate: None,
            diagnostics: CaptureSessionDiagnostics::default(),
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn RecordingDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    pub fn diagnostics(&self) -> &CaptureSessionDiagnostics {
        &self.diagnostics
    }

    pub fn config(&self) -> &RecordingConfiguration {
        &self.config
    }

    /// The configured device, or the host default.
    pub fn select_device(&self) -> Result<DeviceCapabilities, CaptureError> {
        match self.config.device_id.as_deref() {
            Some(selector) => find_device(&self.host.devices()?, selector),
            None => self.host.default_device(),
        }
    }

    /// Record until stopped, the configured duration elapses, or the stream ends.
    ///
    /// Transitions: idle → negotiating → ready → capturing → stopping → completed/failed.
    pub fn record(&mut self, stop: &StopSignal) -> Result<RecordingResult, CaptureError> {
        if !self.state.is_idle() {
            return Err(CaptureError::InvalidState(format!(
                "can only record from idle state, current state is {}",
                self.state.label()
            )));
        }

        match self.run(stop) {
            Ok(result) => {
                self.set_state(RecordingState::Completed(Box::new(result.clone())));
                if let Some(ref delegate) = self.delegate {
                    delegate.on_recording_finished(&result);
                }
                Ok(result)
            }
            Err(e) => {
                log::error!("Recording failed: {}", e);
                if let Some(ref delegate) = self.delegate {
                    delegate.on_error(&e);
                }
                self.set_state(RecordingState::Failed(e.clone()));
                Err(e)
            }
        }
    }

    fn run(&mut self, stop: &StopSignal) -> Result<RecordingResult, CaptureError> {
        self.set_state(RecordingState::Negotiating);

        let device = self.select_device()?;
        log::info!("Recording from device: {} ({})", device.name, device.id);

        let negotiator = RateNegotiator::new(self.config.candidate_rates.clone(), self.config.frames_per_buffer);
        let sample_rate = negotiator.negotiate(&device, self.config.input_channels)?;
        self.set_state(RecordingState::Ready { sample_rate });

        let format = StreamFormat {
            sample_rate,
            channels: self.config.input_channels,
            frames_per_buffer: self.config.frames_per_buffer,
        };
        let spec = WavSpec {
            sample_rate: sample_rate.round() as u32,
            channels: self.config.output_channels,
            bit_depth: self.config.bit_depth,
        };

        let mut stream = self.host.open_stream(&device, format)?;
        let mut writer = WavWriter::create(&self.config.output_path, spec)?;

        let outcome = self.capture_loop(&mut stream, &mut writer, format, stop);

        self.set_state(RecordingState::Stopping);
        if let Err(e) = stream.stop() {
            log::warn!("Failed to stop capture stream: {}", e);
        }

        let finalized = writer.finalize();
        drop(writer);

        let stop_reason = match (outcome, finalized) {
            (Ok(reason), Ok(_)) => reason,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), Ok(data_size)) => {
                log::warn!("Capture aborted; finalized {} bytes already written", data_size);
                return Err(e);
            }
            (Err(e), Err(finalize_err)) => {
                log::error!("Finalize after failed capture also failed: {}", finalize_err);
                return Err(e);
            }
        };

        self.finish(&device, spec, stop_reason)
    }

    /// Read, transform and append blocks until a stop condition is met.
    fn capture_loop(
        &mut self,
        stream: &mut H::Stream,
        writer: &mut WavWriter<File>,
        format: StreamFormat,
        stop: &StopSignal,
    ) -> Result<StopReason, CaptureError> {
        let transform = SampleTransform::from_config(&self.config);
        let output_channels = transform.output_channels();
        let max_frames = self
            .config
            .max_duration_secs
            .map(|secs| (secs * format.sample_rate).round() as u64);

        stream.start()?;
        log::info!(
            "Recording at {} Hz, {} ch in, {} ch out, gain {}",
            format.sample_rate,
            format.channels,
            output_channels,
            self.config.gain
        );
        self.set_state(RecordingState::Capturing { duration_secs: 0.0 });

        loop {
            if stop.is_stop_requested() {
                log::info!("Stop requested, finishing recording");
                return Ok(StopReason::StopRequested);
            }
            let written = writer.frames_written();
            if max_frames.is_some_and(|max| written >= max) {
                log::info!("Maximum duration reached");
                return Ok(StopReason::MaxDuration);
            }

            let Some(block) = stream.read_block()? else {
                log::info!("Capture stream ended");
                return Ok(StopReason::StreamEnded);
            };
            if block.channels() != format.channels {
                return Err(CaptureError::DeviceError(format!(
                    "device delivered {} channel(s), expected {}",
                    block.channels(),
                    format.channels
                )));
            }
            self.diagnostics.blocks_read += 1;

            let mut output = transform.transform(block.samples());
            if output.is_short() {
                self.diagnostics.short_blocks += 1;
                log::warn!(
                    "Short block: dropped {} trailing sample(s) of an incomplete frame",
                    output.dropped_samples
                );
            }
            if let Some(max) = max_frames {
                let remaining = max.saturating_sub(written) as usize;
                if output.frames > remaining {
                    output.frames = remaining;
                    output.samples.truncate(remaining * output_channels);
                }
            }

            writer.append(&output.samples)?;

            self.diagnostics.frames_written += output.frames as u64;
            self.diagnostics.bytes_written = writer.data_size() as u64;
            self.state = RecordingState::Capturing {
                duration_secs: writer.frames_written() as f64 / format.sample_rate,
            };

            if let Some(ref delegate) = self.delegate {
                let levels = AudioLevels {
                    rms: SampleTransform::rms_level(&output.samples),
                    peak: SampleTransform::peak_level(&output.samples),
                };
                delegate.on_levels_updated(&levels);
            }
        }
    }

    /// Checksum the finalized file and assemble the result (and optional sidecar).
    fn finish(
        &self,
        device: &DeviceCapabilities,
        spec: WavSpec,
        stop_reason: StopReason,
    ) -> Result<RecordingResult, CaptureError> {
        let file_path = self.config.output_path.clone();
        let data_size = self.diagnostics.bytes_written as u32;
        let duration_secs = self.diagnostics.frames_written as f64 / spec.sample_rate as f64;
        let checksum = sha256_file(&file_path)?;

        let metadata = RecordingMetadata::new(
            &self.config,
            &device.name,
            spec.sample_rate,
            data_size,
            duration_secs,
            &checksum,
        );
        if self.config.write_metadata {
            let path = write_metadata(&metadata, &file_path)?;
            log::info!("Metadata written to {}", path.display());
        }

        log::info!("Recording saved to {} ({:.2}s)", file_path.display(), duration_secs);

        Ok(RecordingResult {
            file_path,
            duration_secs,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bit_depth: spec.bit_depth,
            data_size,
            stop_reason,
            metadata,
            checksum,
        })
    }

    fn set_state(&mut self, new_state: RecordingState) {
        log::debug!("Session state: {} → {}", self.state.label(), new_state.label());
        self.state = new_state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&self.state);
        }
    }
}
