pub mod rate_negotiator;
pub mod ring_buffer;
pub mod sample_transform;
pub mod wav_format;
