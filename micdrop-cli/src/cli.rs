//! Command-line parsing and conversion into a recording configuration.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use micdrop_core::{MonoDownmix, RecordingConfiguration, DEFAULT_CANDIDATE_RATES};

/// Record a microphone to an uncompressed WAV file.
#[derive(Debug, Parser)]
#[command(name = "micdrop", author, version, about)]
pub struct Cli {
    /// Log at debug level (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record until Ctrl-C, the maximum duration, or the device stops
    Record(RecordArgs),

    /// List input devices and which candidate rates they accept
    Devices(DevicesArgs),

    /// Print the format and duration of an existing WAV file
    Inspect {
        /// WAV file to read
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Input device id, name or index (default: system default input)
    #[arg(short, long, env = "MICDROP_DEVICE")]
    pub device: Option<String>,

    /// Channels to request from the device
    #[arg(short, long, default_value_t = 1)]
    pub channels: u16,

    /// Channels to write (default: same as --channels)
    #[arg(long)]
    pub output_channels: Option<u16>,

    /// Linear gain applied before clipping
    #[arg(short, long, default_value_t = 1.0)]
    pub gain: f32,

    /// PCM bit depth: 16, 24 or 32
    #[arg(short, long = "bits", default_value_t = 16)]
    pub bit_depth: u16,

    /// Frames per device read
    #[arg(long, default_value_t = 512)]
    pub frames: u32,

    /// Candidate sample rate, in order of preference (repeatable)
    #[arg(short, long = "rate", action = ArgAction::Append, value_name = "HZ")]
    pub rates: Vec<f64>,

    /// Stop after this many seconds
    #[arg(short = 't', long, value_name = "SECS")]
    pub max_duration: Option<f64>,

    /// Fail if the device delivers no audio for this many seconds (default: wait indefinitely)
    #[arg(long, value_name = "SECS")]
    pub stall_timeout: Option<f64>,

    /// Write a <file>.metadata.json sidecar with checksum and format
    #[arg(long, default_value_t = false)]
    pub metadata: bool,

    /// Take channel 0 instead of averaging when downmixing to mono
    #[arg(long, default_value_t = false)]
    pub first_channel: bool,

    /// Output WAV file
    #[arg(short, long, env = "MICDROP_OUTPUT", default_value = "micdropper.wav")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Channel count to probe candidate rates with
    #[arg(short, long, default_value_t = 1)]
    pub channels: u16,

    /// Candidate sample rate to probe (repeatable)
    #[arg(short, long = "rate", action = ArgAction::Append, value_name = "HZ")]
    pub rates: Vec<f64>,
}

/// Explicit rates, or the built-in preference list when none were given.
pub fn candidate_rates(rates: &[f64]) -> Vec<f64> {
    if rates.is_empty() {
        DEFAULT_CANDIDATE_RATES.to_vec()
    } else {
        rates.to_vec()
    }
}

impl RecordArgs {
    pub fn to_configuration(&self) -> RecordingConfiguration {
        RecordingConfiguration {
            device_id: self.device.clone(),
            input_channels: self.channels,
            output_channels: self.output_channels.unwrap_or(self.channels),
            gain: self.gain,
            bit_depth: self.bit_depth,
            frames_per_buffer: self.frames,
            candidate_rates: candidate_rates(&self.rates),
            mono_downmix: if self.first_channel {
                MonoDownmix::FirstChannel
            } else {
                MonoDownmix::Average
            },
            output_path: self.output.clone(),
            max_duration_secs: self.max_duration,
            write_metadata: self.metadata,
            stall_timeout_secs: self.stall_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_args(args: &[&str]) -> RecordArgs {
        let cli = Cli::try_parse_from(std::iter::once("micdrop").chain(args.iter().copied())).unwrap();
        match cli.command {
            Command::Record(args) => args,
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn defaults_match_library_defaults() {
        let config = record_args(&["record", "-o", "take.wav"]).to_configuration();
        let expected = RecordingConfiguration {
            output_path: PathBuf::from("take.wav"),
            ..Default::default()
        };
        assert_eq!(config, expected);
    }

    #[test]
    fn output_channels_follow_input_unless_given() {
        let stereo = record_args(&["record", "--channels", "2"]).to_configuration();
        assert_eq!(stereo.output_channels, 2);

        let downmix = record_args(&["record", "--channels", "2", "--output-channels", "1", "--first-channel"])
            .to_configuration();
        assert_eq!(downmix.output_channels, 1);
        assert_eq!(downmix.mono_downmix, MonoDownmix::FirstChannel);
    }

    #[test]
    fn repeated_rates_keep_order() {
        let config = record_args(&["record", "--rate", "48000", "-r", "16000"]).to_configuration();
        assert_eq!(config.candidate_rates, vec![48000.0, 16000.0]);
    }

    #[test]
    fn numeric_options_are_carried() {
        let config = record_args(&[
            "record", "--gain", "2.5", "--bits", "24", "--frames", "256", "-t", "1.5", "--metadata",
        ])
        .to_configuration();
        assert_eq!(config.gain, 2.5);
        assert_eq!(config.bit_depth, 24);
        assert_eq!(config.frames_per_buffer, 256);
        assert_eq!(config.max_duration_secs, Some(1.5));
        assert!(config.write_metadata);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stall_timeout_is_opt_in() {
        let config = record_args(&["record"]).to_configuration();
        assert_eq!(config.stall_timeout(), None);

        let config = record_args(&["record", "--stall-timeout", "2.5"]).to_configuration();
        assert_eq!(config.stall_timeout(), Some(std::time::Duration::from_millis(2500)));
    }

    #[test]
    fn inspect_requires_a_file() {
        assert!(Cli::try_parse_from(["micdrop", "inspect"]).is_err());
        let cli = Cli::try_parse_from(["micdrop", "-v", "inspect", "a.wav"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Inspect { file } if file == PathBuf::from("a.wav")));
    }

    #[test]
    fn devices_probe_defaults() {
        let cli = Cli::try_parse_from(["micdrop", "devices"]).unwrap();
        let Command::Devices(args) = cli.command else {
            panic!("expected devices");
        };
        assert_eq!(args.channels, 1);
        assert_eq!(candidate_rates(&args.rates), DEFAULT_CANDIDATE_RATES.to_vec());
    }
}
