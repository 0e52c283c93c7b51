//! Blocking block reader over a callback-driven cpal input stream.
//!
//! cpal delivers samples on its own callback thread in whatever chunk size the
//! host chooses. The callback converts them to i16 and appends them to a shared
//! ring buffer; `read_block` waits on a condition variable until one whole
//! block is available and hands it to the caller's thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, SizedSample, StreamConfig};
use parking_lot::{Condvar, Mutex};

use micdrop_core::models::audio_models::{AudioBlock, StreamFormat};
use micdrop_core::models::error::CaptureError;
use micdrop_core::processing::ring_buffer::RingBuffer;
use micdrop_core::traits::capture_host::CaptureStream;

use crate::device_enumerator::{is_convertible, to_format_range};
use crate::error::BackendError;
use crate::permissions::mic_permission_hint;

/// Seconds of audio the ring buffer holds before dropping the oldest samples.
const RING_SECONDS: usize = 4;

/// Preferred order when a device offers several sample formats for the same range.
const FORMAT_PREFERENCE: [SampleFormat; 3] = [SampleFormat::I16, SampleFormat::F32, SampleFormat::U16];

/// State shared with the cpal callbacks.
struct SharedInput {
    state: Mutex<InputState>,
    ready: Condvar,
}

struct InputState {
    ring: RingBuffer<i16>,
    error: Option<String>,
}

impl SharedInput {
    fn push(&self, samples: &[i16]) {
        self.state.lock().ring.write(samples);
        self.ready.notify_one();
    }

    fn fail(&self, message: String) {
        self.state.lock().error = Some(message);
        self.ready.notify_all();
    }

    /// Block until `block_len` samples are buffered, a callback error is
    /// reported, or `timeout` passes without a full block.
    fn wait_for_block(&self, block_len: usize, timeout: Option<Duration>) -> BlockWait {
        let deadline = timeout.map(|t| Instant::now() + t);

        let mut state = self.state.lock();
        loop {
            if let Some(message) = state.error.take() {
                return BlockWait::Failed(message);
            }
            if state.ring.count() >= block_len {
                let samples = state.ring.read(block_len);
                return BlockWait::Ready(samples, state.ring.overruns());
            }
            match deadline {
                Some(deadline) => {
                    if self.ready.wait_until(&mut state, deadline).timed_out()
                        && state.error.is_none()
                        && state.ring.count() < block_len
                    {
                        return BlockWait::Stalled;
                    }
                }
                None => self.ready.wait(&mut state),
            }
        }
    }
}

enum BlockWait {
    /// One block of samples and the ring's overrun total at the time of the read.
    Ready(Vec<i16>, u64),
    Failed(String),
    Stalled,
}

/// An opened (not yet playing) cpal input stream.
pub struct CpalInputStream {
    device_name: String,
    format: StreamFormat,
    shared: Arc<SharedInput>,
    stream: Option<cpal::Stream>,
    playing: bool,
    reported_overruns: u64,
    stall_timeout: Option<Duration>,
}

impl CpalInputStream {
    /// Build an input-only stream with exactly `format`.
    ///
    /// The buffer size is fixed to `format.frames_per_buffer` when the device
    /// reports a buffer range; otherwise the host default is used and blocks are
    /// re-chunked from the ring buffer.
    ///
    /// With a `stall_timeout`, a read that sees no full block within that time
    /// fails with a device error; otherwise reads wait indefinitely.
    pub fn open(
        device: &cpal::Device,
        device_name: &str,
        format: StreamFormat,
        stall_timeout: Option<Duration>,
    ) -> Result<Self, CaptureError> {
        let (sample_format, fixed_buffer) = select_config(device, &format)?;

        let config = StreamConfig {
            channels: format.channels,
            sample_rate: SampleRate(format.sample_rate.round() as u32),
            buffer_size: if fixed_buffer {
                BufferSize::Fixed(format.frames_per_buffer)
            } else {
                BufferSize::Default
            },
        };

        let capacity = (format.sample_rate.round() as usize * format.channels as usize * RING_SECONDS)
            .max(format.block_len() * 4);
        let shared = Arc::new(SharedInput {
            state: Mutex::new(InputState {
                ring: RingBuffer::new(capacity),
                error: None,
            }),
            ready: Condvar::new(),
        });

        log::info!(
            "Opening '{}': format={:?} sample_rate={}Hz channels={} buffer={:?}",
            device_name,
            sample_format,
            config.sample_rate.0,
            config.channels,
            config.buffer_size
        );

        let stream = match sample_format {
            SampleFormat::I16 => build_stream(device, &config, &shared, |s: i16| s),
            SampleFormat::F32 => build_stream(device, &config, &shared, f32_to_i16),
            SampleFormat::U16 => build_stream(device, &config, &shared, u16_to_i16),
            other => {
                return Err(CaptureError::ConfigurationFailed(format!(
                    "unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(BackendError::from)?;

        Ok(Self {
            device_name: device_name.to_string(),
            format,
            shared,
            stream: Some(stream),
            playing: false,
            reported_overruns: 0,
            stall_timeout,
        })
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }
}

impl CaptureStream for CpalInputStream {
    fn start(&mut self) -> Result<(), CaptureError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| CaptureError::InvalidState("input stream already stopped".into()))?;
        stream.play().map_err(BackendError::from)?;
        self.playing = true;
        log::info!("Input stream started on '{}'", self.device_name);
        Ok(())
    }

    fn read_block(&mut self) -> Result<Option<AudioBlock>, CaptureError> {
        if self.stream.is_none() {
            return Ok(None);
        }
        if !self.playing {
            return Err(CaptureError::InvalidState("input stream not started".into()));
        }

        let (samples, overruns) = match self.shared.wait_for_block(self.format.block_len(), self.stall_timeout) {
            BlockWait::Ready(samples, overruns) => (samples, overruns),
            BlockWait::Failed(message) => return Err(CaptureError::DeviceError(message)),
            BlockWait::Stalled => {
                return Err(CaptureError::DeviceError(format!(
                    "no audio received from '{}' for {:.1}s. {}",
                    self.device_name,
                    self.stall_timeout.unwrap_or_default().as_secs_f64(),
                    mic_permission_hint()
                )))
            }
        };

        if overruns > self.reported_overruns {
            log::warn!(
                "Input overrun: {} sample(s) dropped before they could be read",
                overruns - self.reported_overruns
            );
            self.reported_overruns = overruns;
        }

        Ok(Some(AudioBlock::new(samples, self.format.channels)))
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        self.playing = false;
        stream.pause().map_err(BackendError::from)?;
        log::info!("Input stream stopped on '{}'", self.device_name);
        Ok(())
    }
}

/// Pick the sample format for `format` and whether the buffer size can be fixed.
fn select_config(device: &cpal::Device, format: &StreamFormat) -> Result<(SampleFormat, bool), CaptureError> {
    let matching: Vec<_> = device
        .supported_input_configs()
        .map_err(BackendError::from)?
        .filter(|config| is_convertible(config.sample_format()))
        .map(|config| (config.sample_format(), to_format_range(&config)))
        .filter(|(_, range)| range.contains(format))
        .collect();

    FORMAT_PREFERENCE
        .iter()
        .find_map(|preferred| matching.iter().find(|(sample_format, _)| sample_format == preferred))
        .map(|(sample_format, range)| (*sample_format, range.buffer_frames.is_some()))
        .ok_or_else(|| {
            CaptureError::ConfigurationFailed(format!(
                "device does not support {} Hz, {} channel(s), {} frames",
                format.sample_rate, format.channels, format.frames_per_buffer
            ))
        })
}

fn build_stream<T, F>(
    device: &cpal::Device,
    config: &StreamConfig,
    shared: &Arc<SharedInput>,
    convert: F,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + 'static,
    F: Fn(T) -> i16 + Send + 'static,
{
    let data_shared = Arc::clone(shared);
    let error_shared = Arc::clone(shared);
    let mut scratch: Vec<i16> = Vec::new();

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            scratch.clear();
            scratch.extend(data.iter().map(|&sample| convert(sample)));
            data_shared.push(&scratch);
        },
        move |err: cpal::StreamError| {
            log::error!("Input stream error: {}", err);
            error_shared.fail(err.to_string());
        },
        None,
    )
}

fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn u16_to_i16(sample: u16) -> i16 {
    (sample as i32 - 32_768) as i16
}
