use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::RecordingConfiguration;

/// Why the capture loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    StopRequested,
    MaxDuration,
    StreamEnded,
}

/// Result returned when a recording session completes successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
    pub data_size: u32,
    pub stop_reason: StopReason,
    pub metadata: RecordingMetadata,
    pub checksum: String,
}

/// Metadata stored alongside a recording.
///
/// Serializable for the JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub file_path: String,
    pub device_name: String,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
    pub gain: f32,
    pub data_size: u32,
    pub checksum: String,
}

impl RecordingMetadata {
    pub fn new(
        config: &RecordingConfiguration,
        device_name: &str,
        sample_rate: u32,
        data_size: u32,
        duration_secs: f64,
        checksum: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            file_path: config.output_path.to_string_lossy().into_owned(),
            device_name: device_name.to_string(),
            duration_secs,
            sample_rate,
            channels: config.output_channels,
            bit_depth: config.bit_depth,
            gain: config.gain,
            data_size,
            checksum: checksum.to_string(),
        }
    }
}
