use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use micdrop_core::{
    inspect_wav, CaptureHost, DeviceCapabilities, RateNegotiator, RecordingSession, StopReason, StopSignal,
};
use micdrop_cpal::CpalHost;

use crate::cli::{candidate_rates, DevicesArgs, RecordArgs};
use crate::console_delegate::ConsoleDelegate;
use crate::signals::install_stop_handler;

pub fn record(args: &RecordArgs) -> Result<()> {
    let config = args.to_configuration();
    let host = CpalHost::new().with_stall_timeout(config.stall_timeout());
    log::debug!("Audio host: {}", host.name());

    let mut session = RecordingSession::new(host, config).context("invalid recording options")?;
    session.set_delegate(Arc::new(ConsoleDelegate::new()));

    let stop = StopSignal::new();
    install_stop_handler(&stop)?;

    let result = session.record(&stop).context("recording failed")?;

    let reason = match result.stop_reason {
        StopReason::StopRequested => "stopped",
        StopReason::MaxDuration => "reached maximum duration",
        StopReason::StreamEnded => "input ended",
    };
    let diagnostics = session.diagnostics();
    println!(
        "{}: {:.2}s, {} Hz, {} ch, {}-bit, {} bytes ({})",
        result.file_path.display(),
        result.duration_secs,
        result.sample_rate,
        result.channels,
        result.bit_depth,
        result.data_size,
        reason
    );
    println!("sha256 {}", result.checksum);
    if diagnostics.short_blocks > 0 {
        println!("{} short block(s) had trailing samples dropped", diagnostics.short_blocks);
    }
    Ok(())
}

pub fn devices(args: &DevicesArgs) -> Result<()> {
    let host = CpalHost::new();
    let devices = host.devices().context("failed to list input devices")?;
    if devices.is_empty() {
        println!("No input devices found on {}", host.name());
        return Ok(());
    }

    let negotiator = RateNegotiator::new(candidate_rates(&args.rates), 512);
    for (index, device) in devices.iter().enumerate() {
        println!("{}", describe_device(index, device, &negotiator, args.channels));
    }
    Ok(())
}

pub fn inspect(file: &Path) -> Result<()> {
    let header = inspect_wav(file).with_context(|| format!("failed to read {}", file.display()))?;
    println!(
        "{}: PCM {} Hz, {} ch, {}-bit, {} data bytes, {:.3}s",
        file.display(),
        header.spec.sample_rate,
        header.spec.channels,
        header.spec.bit_depth,
        header.data_size,
        header.duration_secs()
    );
    Ok(())
}

/// One listing line: index, default marker, name, channel count, default rate and probe results.
fn describe_device(index: usize, device: &DeviceCapabilities, negotiator: &RateNegotiator, channels: u16) -> String {
    let rates: Vec<String> = negotiator
        .probe_all(device, channels)
        .into_iter()
        .map(|(rate, ok)| format!("{}{}", rate, if ok { "✓" } else { "✗" }))
        .collect();
    format!(
        "{:>2}{} {} (max {} ch, default {} Hz) [{} ch: {}]",
        index,
        if device.is_default { "*" } else { " " },
        device.name,
        device.max_input_channels,
        device.default_sample_rate,
        channels,
        rates.join(" ")
    )
}
