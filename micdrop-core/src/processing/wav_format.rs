//! WAV file format utilities.
//!
//! Generates and parses the canonical 44-byte RIFF WAV header and encodes
//! normalized samples as little-endian integer PCM.

use crate::models::error::CaptureError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Offset of the RIFF chunk-size field.
pub const RIFF_SIZE_OFFSET: u64 = 4;

/// Offset of the data sub-chunk size field.
pub const DATA_SIZE_OFFSET: u64 = 40;

/// Largest data size whose RIFF chunk size (36 + data) still fits in 32 bits.
pub const MAX_DATA_SIZE: u64 = u32::MAX as u64 - 36;

/// PCM stream parameters carried by the `fmt ` sub-chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
}

impl WavSpec {
    /// Bytes per frame, widened so oversized channel counts cannot overflow.
    pub fn block_align(&self) -> u32 {
        self.channels as u32 * self.bit_depth as u32 / 8
    }

    /// Bytes per second, widened like `block_align`.
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.block_align() as u64
    }

    /// Check that the format is writable and its derived fields fit the header.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.channels == 0 || self.sample_rate == 0 {
            return Err(CaptureError::EncodingFailed(format!(
                "invalid format: {} Hz, {} channel(s)",
                self.sample_rate, self.channels
            )));
        }
        if ![16, 24, 32].contains(&self.bit_depth) {
            return Err(CaptureError::EncodingFailed(format!("unsupported bit depth: {}", self.bit_depth)));
        }
        if self.block_align() > u16::MAX as u32 {
            return Err(CaptureError::EncodingFailed(format!(
                "{} channel(s) at {} bits exceed the 16-bit block align field",
                self.channels, self.bit_depth
            )));
        }
        if self.byte_rate() > u32::MAX as u64 {
            return Err(CaptureError::EncodingFailed(format!(
                "{} Hz with {}-byte frames exceeds the 32-bit byte rate field",
                self.sample_rate,
                self.block_align()
            )));
        }
        Ok(())
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bit_depth as usize / 8
    }
}

/// Decoded contents of a canonical WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub spec: WavSpec,
    pub data_size: u32,
}

impl WavHeader {
    /// RIFF chunk size as stored at offset 4.
    pub fn chunk_size(&self) -> u32 {
        self.data_size.saturating_add(36)
    }

    /// Duration of the data chunk in seconds.
    pub fn duration_secs(&self) -> f64 {
        let byte_rate = self.spec.byte_rate();
        if byte_rate == 0 {
            return 0.0;
        }
        self.data_size as f64 / byte_rate as f64
    }

    /// Parse and validate a canonical 44-byte PCM header.
    pub fn parse(bytes: &[u8]) -> Result<Self, CaptureError> {
        if bytes.len() < WAV_HEADER_SIZE {
            return Err(CaptureError::EncodingFailed(format!(
                "header too short: {} bytes",
                bytes.len()
            )));
        }
        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(CaptureError::EncodingFailed("missing RIFF/WAVE magic".into()));
        }
        if &bytes[12..16] != b"fmt " || read_u32(bytes, 16) != 16 {
            return Err(CaptureError::EncodingFailed("expected 16-byte fmt sub-chunk".into()));
        }
        let format_code = read_u16(bytes, 20);
        if format_code != 1 {
            return Err(CaptureError::EncodingFailed(format!(
                "unsupported format code {}",
                format_code
            )));
        }
        if &bytes[36..40] != b"data" {
            return Err(CaptureError::EncodingFailed("missing data sub-chunk".into()));
        }

        let spec = WavSpec {
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            bit_depth: read_u16(bytes, 34),
        };
        if read_u32(bytes, 28) as u64 != spec.byte_rate() || read_u16(bytes, 32) as u32 != spec.block_align() {
            return Err(CaptureError::EncodingFailed(
                "byte rate or block align inconsistent with format".into(),
            ));
        }

        let header = Self {
            spec,
            data_size: read_u32(bytes, 40),
        };
        if read_u32(bytes, 4) != header.chunk_size() {
            return Err(CaptureError::EncodingFailed("RIFF size does not match data size".into()));
        }
        Ok(header)
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

/// Generate a 44-byte WAV RIFF header.
///
/// Format: PCM (format code 1), little-endian.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
///
/// Fails with `EncodingFailed` when the format does not pass `WavSpec::validate`.
pub fn generate_wav_header(spec: &WavSpec, data_size: u32) -> Result<[u8; WAV_HEADER_SIZE], CaptureError> {
    spec.validate()?;
    let chunk_size = data_size.saturating_add(36);

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&spec.channels.to_le_bytes());
    header[24..28].copy_from_slice(&spec.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&(spec.byte_rate() as u32).to_le_bytes());
    header[32..34].copy_from_slice(&(spec.block_align() as u16).to_le_bytes());
    header[34..36].copy_from_slice(&spec.bit_depth.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    Ok(header)
}

/// Patch the RIFF chunk-size field at offset 4 for the given data size.
pub fn patch_riff_size(header: &mut [u8], data_size: u32) {
    header[4..8].copy_from_slice(&data_size.saturating_add(36).to_le_bytes());
}

/// Patch the data-size field at offset 40.
pub fn patch_data_size(header: &mut [u8], data_size: u32) {
    header[40..44].copy_from_slice(&data_size.to_le_bytes());
}

/// Append normalized samples to `out` as little-endian signed PCM of `bit_depth` bits.
///
/// Values are clamped to `[-1.0, 1.0]`, scaled by the positive maximum of the
/// target width and truncated toward zero.
pub fn encode_samples(samples: &[f32], bit_depth: u16, out: &mut Vec<u8>) -> Result<(), CaptureError> {
    match bit_depth {
        16 => {
            out.reserve(samples.len() * 2);
            for &sample in samples {
                let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        24 => {
            const I24_MAX: f64 = 8_388_607.0;
            out.reserve(samples.len() * 3);
            for &sample in samples {
                let value = (sample.clamp(-1.0, 1.0) as f64 * I24_MAX) as i32;
                out.extend_from_slice(&value.to_le_bytes()[..3]);
            }
        }
        32 => {
            out.reserve(samples.len() * 4);
            for &sample in samples {
                let value = (sample.clamp(-1.0, 1.0) as f64 * i32::MAX as f64) as i32;
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        other => {
            return Err(CaptureError::EncodingFailed(format!("unsupported bit depth: {}", other)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CD_STEREO: WavSpec = WavSpec {
        sample_rate: 48000,
        channels: 2,
        bit_depth: 16,
    };

    #[test]
    fn header_size_is_44_bytes() {
        let header = generate_wav_header(&CD_STEREO, 0).unwrap();
        assert_eq!(header.len(), 44);
    }

    #[test]
    fn header_riff_magic() {
        let header = generate_wav_header(&CD_STEREO, 0).unwrap();
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
    }

    #[test]
    fn header_pcm_format() {
        let header = generate_wav_header(&CD_STEREO, 0).unwrap();
        // Format code = 1 (PCM)
        assert_eq!(u16::from_le_bytes([header[20], header[21]]), 1);
        // fmt chunk size = 16
        assert_eq!(u32::from_le_bytes([header[16], header[17], header[18], header[19]]), 16);
    }

    #[test]
    fn placeholder_header_sizes() {
        let header = generate_wav_header(&CD_STEREO, 0).unwrap();
        assert_eq!(u32::from_le_bytes([header[4], header[5], header[6], header[7]]), 36);
        assert_eq!(u32::from_le_bytes([header[40], header[41], header[42], header[43]]), 0);
    }

    #[test]
    fn header_48khz_stereo_16bit() {
        let header = generate_wav_header(&CD_STEREO, 9600).unwrap();

        let channels = u16::from_le_bytes([header[22], header[23]]);
        assert_eq!(channels, 2);

        let sample_rate = u32::from_le_bytes([header[24], header[25], header[26], header[27]]);
        assert_eq!(sample_rate, 48000);

        let byte_rate = u32::from_le_bytes([header[28], header[29], header[30], header[31]]);
        assert_eq!(byte_rate, 192000); // 48000 * 2 * 16/8

        let block_align = u16::from_le_bytes([header[32], header[33]]);
        assert_eq!(block_align, 4); // 2 * 16/8

        let bit_depth = u16::from_le_bytes([header[34], header[35]]);
        assert_eq!(bit_depth, 16);

        let data_size = u32::from_le_bytes([header[40], header[41], header[42], header[43]]);
        assert_eq!(data_size, 9600);

        let chunk_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        assert_eq!(chunk_size, 36 + 9600);
    }

    #[test]
    fn header_parses_back() {
        let cases = [
            (WavSpec { sample_rate: 16000, channels: 1, bit_depth: 16 }, 3072),
            (WavSpec { sample_rate: 44100, channels: 2, bit_depth: 24 }, 0),
            (WavSpec { sample_rate: 96000, channels: 6, bit_depth: 32 }, 1_000_000),
        ];
        for (spec, data_size) in cases {
            let header = WavHeader::parse(&generate_wav_header(&spec, data_size).unwrap()).unwrap();
            assert_eq!(header.spec, spec);
            assert_eq!(header.data_size, data_size);
            assert_eq!(header.chunk_size(), 36 + data_size);
            assert_eq!(header.spec.byte_rate(), spec.sample_rate as u64 * spec.channels as u64 * spec.bit_depth as u64 / 8);
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(WavHeader::parse(b"RIFF").is_err());

        let mut header = generate_wav_header(&CD_STEREO, 0).unwrap();
        header[20] = 3; // IEEE float
        assert!(WavHeader::parse(&header).is_err());

        let mut header = generate_wav_header(&CD_STEREO, 0).unwrap();
        header[8..12].copy_from_slice(b"AVI ");
        assert!(WavHeader::parse(&header).is_err());
    }

    #[test]
    fn parse_rejects_inconsistent_sizes() {
        let mut header = generate_wav_header(&CD_STEREO, 100).unwrap();
        patch_data_size(&mut header, 200);
        assert!(WavHeader::parse(&header).is_err());

        patch_riff_size(&mut header, 200);
        assert_eq!(WavHeader::parse(&header).unwrap().data_size, 200);
    }

    #[test]
    fn oversized_formats_are_rejected_not_overflowed() {
        let wide = WavSpec {
            sample_rate: 48000,
            channels: 2048,
            bit_depth: 32,
        };
        assert_eq!(wide.block_align(), 8192);
        assert_eq!(wide.byte_rate(), 393_216_000);
        assert!(generate_wav_header(&wide, 0).is_ok());

        let too_many_channels = WavSpec {
            channels: u16::MAX,
            ..wide
        };
        assert!(matches!(
            generate_wav_header(&too_many_channels, 0),
            Err(CaptureError::EncodingFailed(_))
        ));

        let too_fast = WavSpec {
            sample_rate: 1_000_000,
            channels: 2048,
            bit_depth: 32,
        };
        assert!(matches!(too_fast.validate(), Err(CaptureError::EncodingFailed(_))));
    }

    #[test]
    fn parse_rejects_huge_channel_count_without_panicking() {
        let mut header = generate_wav_header(&CD_STEREO, 0).unwrap();
        header[22..24].copy_from_slice(&u16::MAX.to_le_bytes());
        assert!(matches!(WavHeader::parse(&header), Err(CaptureError::EncodingFailed(_))));

        header[24..28].copy_from_slice(&u32::MAX.to_le_bytes());
        header[34..36].copy_from_slice(&u16::MAX.to_le_bytes());
        assert!(WavHeader::parse(&header).is_err());
    }

    #[test]
    fn duration_from_data_size() {
        let header = WavHeader {
            spec: WavSpec { sample_rate: 16000, channels: 1, bit_depth: 16 },
            data_size: 32000,
        };
        assert_eq!(header.duration_secs(), 1.0);
    }

    #[test]
    fn encode_16_bit() {
        let mut pcm = Vec::new();
        encode_samples(&[0.0, 1.0, -1.0, 0.5], 16, &mut pcm).unwrap();

        assert_eq!(pcm.len(), 8);
        assert_eq!(i16::from_le_bytes([pcm[0], pcm[1]]), 0);
        assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), i16::MAX);
        // -1.0 → -32767 (not -32768 due to symmetric scaling)
        assert_eq!(i16::from_le_bytes([pcm[4], pcm[5]]), -i16::MAX);
        assert_eq!(i16::from_le_bytes([pcm[6], pcm[7]]), 16383);
    }

    #[test]
    fn encode_clamps_out_of_range() {
        let mut pcm = Vec::new();
        encode_samples(&[2.0, -3.0], 16, &mut pcm).unwrap();

        assert_eq!(i16::from_le_bytes([pcm[0], pcm[1]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), -i16::MAX);
    }

    #[test]
    fn encode_24_bit_is_three_bytes_little_endian() {
        let mut pcm = Vec::new();
        encode_samples(&[1.0, -1.0], 24, &mut pcm).unwrap();

        assert_eq!(pcm.len(), 6);
        assert_eq!(&pcm[0..3], &[0xFF, 0xFF, 0x7F]);
        assert_eq!(&pcm[3..6], &[0x01, 0x00, 0x80]);
    }

    #[test]
    fn encode_32_bit() {
        let mut pcm = Vec::new();
        encode_samples(&[1.0, 0.0], 32, &mut pcm).unwrap();

        assert_eq!(pcm.len(), 8);
        assert_eq!(i32::from_le_bytes([pcm[0], pcm[1], pcm[2], pcm[3]]), i32::MAX);
        assert_eq!(i32::from_le_bytes([pcm[4], pcm[5], pcm[6], pcm[7]]), 0);
    }

    #[test]
    fn encode_rejects_unknown_depth() {
        let mut pcm = Vec::new();
        assert!(encode_samples(&[0.0], 12, &mut pcm).is_err());
        assert!(pcm.is_empty());
    }
}
