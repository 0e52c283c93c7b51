use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use crate::models::error::CaptureError;
use crate::models::state::ContainerState;
use crate::processing::wav_format::{self, WavSpec, DATA_SIZE_OFFSET, MAX_DATA_SIZE, RIFF_SIZE_OFFSET, WAV_HEADER_SIZE};
use crate::traits::seekable_writer::SeekableWriter;

/// Streaming PCM WAV writer.
///
/// ## File Format
///
/// ```text
/// [44-byte WAV header, sizes = 0 until finalize]
/// [interleaved little-endian PCM...]
/// ```
///
/// Samples are encoded and written on every `append`; nothing is held back
/// between calls, so memory use does not grow with recording length.
/// `finalize` seeks back and overwrites the two size fields, and therefore
/// requires a seekable sink.
pub struct WavWriter<W: Write> {
    sink: Option<W>,
    spec: WavSpec,
    state: ContainerState,
    data_bytes: u64,
    /// Bytes of a failed append that reached the sink past `data_bytes`.
    torn_bytes: u64,
    scratch: Vec<u8>,
}

impl WavWriter<File> {
    /// Create `path` (and its parent directories) and write the placeholder header.
    pub fn create(path: &Path, spec: WavSpec) -> Result<Self, CaptureError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CaptureError::storage("failed to create directory", e))?;
        }

        let file = File::create(path).map_err(|e| CaptureError::storage("failed to create file", e))?;

        let mut writer = Self::new(file, spec)?;
        writer.open()?;
        Ok(writer)
    }
}

impl<W: Write> WavWriter<W> {
    /// Wrap a sink. Nothing is written until `open`.
    pub fn new(sink: W, spec: WavSpec) -> Result<Self, CaptureError> {
        spec.validate()?;
        Ok(Self {
            sink: Some(sink),
            spec,
            state: ContainerState::Unopened,
            data_bytes: 0,
            torn_bytes: 0,
            scratch: Vec::new(),
        })
    }

    /// Write the 44-byte header with zero data size. Transitions: unopened → header_written.
    pub fn open(&mut self) -> Result<(), CaptureError> {
        if self.state != ContainerState::Unopened {
            return Err(CaptureError::InvalidState(format!("cannot open container in state {:?}", self.state)));
        }

        let header = wav_format::generate_wav_header(&self.spec, 0)?;
        self.sink_mut()?
            .write_all(&header)
            .map_err(|e| CaptureError::storage("header write failed", e))?;

        self.state = ContainerState::HeaderWritten;
        Ok(())
    }

    /// Encode interleaved normalized samples and write them after the previous append.
    ///
    /// `samples.len()` must be a whole number of frames. Transitions: → streaming.
    pub fn append(&mut self, samples: &[f32]) -> Result<(), CaptureError> {
        if !self.state.is_writable() {
            return Err(CaptureError::InvalidState(format!("cannot append in state {:?}", self.state)));
        }
        if self.torn_bytes > 0 {
            return Err(CaptureError::StorageError(
                "a previous write failed part way; only finalize is allowed".into(),
            ));
        }
        if samples.len() % self.spec.channels as usize != 0 {
            return Err(CaptureError::EncodingFailed(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                self.spec.channels
            )));
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        wav_format::encode_samples(samples, self.spec.bit_depth, &mut scratch)?;

        if self.data_bytes + scratch.len() as u64 > MAX_DATA_SIZE {
            self.scratch = scratch;
            return Err(CaptureError::StorageError("WAV data size limit (4 GiB) reached".into()));
        }

        let (written, result) = write_counted(self.sink_mut()?, &scratch);
        match result {
            Ok(()) => {
                self.data_bytes += written as u64;
                self.state = ContainerState::Streaming;
            }
            Err(_) => self.torn_bytes = written as u64,
        }
        self.scratch = scratch;
        result.map_err(|e| CaptureError::storage("write failed", e))
    }

    /// Bytes of sample data written so far (header excluded).
    pub fn data_size(&self) -> u32 {
        self.data_bytes as u32
    }

    /// Complete frames written so far.
    pub fn frames_written(&self) -> u64 {
        let block_align = self.spec.block_align() as u64;
        if block_align == 0 {
            return 0;
        }
        self.data_bytes / block_align
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// Release the sink without touching the header.
    pub fn into_inner(mut self) -> Result<W, CaptureError> {
        self.sink
            .take()
            .ok_or_else(|| CaptureError::InvalidState("sink already released".into()))
    }

    fn sink_mut(&mut self) -> Result<&mut W, CaptureError> {
        self.sink
            .as_mut()
            .ok_or_else(|| CaptureError::InvalidState("sink already released".into()))
    }
}

impl<W: SeekableWriter> WavWriter<W> {
    /// Patch the RIFF and data size fields in place. Transitions: → finalized.
    ///
    /// Returns the final data size. Must be called exactly once, after the last append.
    pub fn finalize(&mut self) -> Result<u32, CaptureError> {
        if !self.state.is_writable() {
            return Err(CaptureError::InvalidState(format!("cannot finalize in state {:?}", self.state)));
        }

        let data_size = self.data_size();
        let riff_size = data_size + 36;
        let torn_bytes = self.torn_bytes;
        let sink = self.sink_mut()?;

        if torn_bytes > 0 {
            log::warn!("Discarding {} bytes of a partially written block", torn_bytes);
            sink.truncate_to(WAV_HEADER_SIZE as u64 + data_size as u64)
                .map_err(|e| CaptureError::storage("truncate failed", e))?;
        }

        sink.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))
            .map_err(|e| CaptureError::storage("seek failed", e))?;
        sink.write_all(&riff_size.to_le_bytes())
            .map_err(|e| CaptureError::storage("header patch failed", e))?;

        sink.seek(SeekFrom::Start(DATA_SIZE_OFFSET))
            .map_err(|e| CaptureError::storage("seek failed", e))?;
        sink.write_all(&data_size.to_le_bytes())
            .map_err(|e| CaptureError::storage("header patch failed", e))?;

        sink.seek(SeekFrom::End(0))
            .map_err(|e| CaptureError::storage("seek failed", e))?;
        sink.flush().map_err(|e| CaptureError::storage("flush failed", e))?;

        self.torn_bytes = 0;
        self.state = ContainerState::Finalized;
        log::info!(
            "WAV finalized: {} bytes of data ({} Hz, {} ch, {}-bit)",
            data_size,
            self.spec.sample_rate,
            self.spec.channels,
            self.spec.bit_depth
        );
        Ok(data_size)
    }
}

/// `write_all` that reports how many bytes reached the sink even when it fails.
fn write_counted<W: Write>(sink: &mut W, mut buf: &[u8]) -> (usize, io::Result<()>) {
    let mut written = 0;
    while !buf.is_empty() {
        match sink.write(buf) {
            Ok(0) => return (written, Err(io::Error::from(io::ErrorKind::WriteZero))),
            Ok(n) => {
                written += n;
                buf = &buf[n..];
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return (written, Err(e)),
        }
    }
    (written, Ok(()))
}

impl<W: Write> Drop for WavWriter<W> {
    fn drop(&mut self) {
        if self.sink.is_some() && self.state.is_writable() {
            log::warn!(
                "WAV writer dropped without finalize; {} data bytes have placeholder header sizes",
                self.data_bytes
            );
        }
    }
}
