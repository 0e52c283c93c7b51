pub mod checksum;
pub mod metadata;
pub mod wav_writer;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::error::CaptureError;
use crate::processing::wav_format::{WavHeader, WAV_HEADER_SIZE};

/// Read and validate the header of an existing WAV file.
pub fn inspect_wav(path: &Path) -> Result<WavHeader, CaptureError> {
    let mut file = File::open(path).map_err(|e| CaptureError::storage("failed to open file", e))?;
    let mut header = [0u8; WAV_HEADER_SIZE];
    file.read_exact(&mut header)
        .map_err(|e| CaptureError::storage("failed to read header", e))?;
    WavHeader::parse(&header)
}
