use std::sync::OnceLock;

use anyhow::Result;

use micdrop_core::StopSignal;

/// Signal raised by SIGINT/SIGTERM or a console control event. Set once, before the handlers are installed.
static STOP_ON_SIGNAL: OnceLock<StopSignal> = OnceLock::new();

/// Signal handler for interrupt and terminate.
///
/// Only stores into an atomic flag (async-signal-safe); the capture loop
/// notices it before its next read and finalizes the file.
#[cfg(unix)]
extern "C" fn handle_stop(_: libc::c_int) {
    if let Some(stop) = STOP_ON_SIGNAL.get() {
        stop.request_stop();
    }
}

/// Route SIGINT and SIGTERM to `stop`.
#[cfg(unix)]
pub fn install_stop_handler(stop: &StopSignal) -> Result<()> {
    use anyhow::anyhow;

    if STOP_ON_SIGNAL.set(stop.clone()).is_err() {
        return Err(anyhow!("stop handler already installed"));
    }

    for signal in [libc::SIGINT, libc::SIGTERM] {
        unsafe {
            // SAFETY: handle_stop is an extern "C" handler that only performs an
            // atomic load and store, which is async-signal-safe.
            let handler = handle_stop as *const () as libc::sighandler_t;
            if libc::signal(signal, handler) == libc::SIG_ERR {
                return Err(anyhow!("failed to install handler for signal {}", signal));
            }
        }
    }
    Ok(())
}

/// Console control handler for Ctrl-C, Ctrl-Break and console close.
///
/// Runs on a thread the system creates for the event. Returning TRUE marks the
/// event handled so the process is not terminated before the file is finalized.
#[cfg(windows)]
unsafe extern "system" fn handle_console_ctrl(ctrl_type: u32) -> windows::core::BOOL {
    use windows::Win32::System::Console::{CTRL_BREAK_EVENT, CTRL_CLOSE_EVENT, CTRL_C_EVENT};

    match ctrl_type {
        CTRL_C_EVENT | CTRL_BREAK_EVENT | CTRL_CLOSE_EVENT => match STOP_ON_SIGNAL.get() {
            Some(stop) => {
                stop.request_stop();
                true.into()
            }
            None => false.into(),
        },
        _ => false.into(),
    }
}

/// Route console Ctrl-C, Ctrl-Break and close events to `stop`.
#[cfg(windows)]
pub fn install_stop_handler(stop: &StopSignal) -> Result<()> {
    use anyhow::{anyhow, Context};
    use windows::Win32::System::Console::SetConsoleCtrlHandler;

    if STOP_ON_SIGNAL.set(stop.clone()).is_err() {
        return Err(anyhow!("stop handler already installed"));
    }
    unsafe {
        // SAFETY: handle_console_ctrl only reads a OnceLock and stores an atomic flag.
        SetConsoleCtrlHandler(Some(handle_console_ctrl), true).context("failed to install console control handler")?;
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
pub fn install_stop_handler(stop: &StopSignal) -> Result<()> {
    let _ = STOP_ON_SIGNAL.set(stop.clone());
    log::warn!("Stop-on-signal is not supported on this platform; use --max-duration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(any(unix, windows))]
    #[test]
    fn handler_requests_stop() {
        let stop = StopSignal::new();
        install_stop_handler(&stop).unwrap();
        assert!(!stop.is_stop_requested());
        assert!(install_stop_handler(&StopSignal::new()).is_err());

        #[cfg(unix)]
        handle_stop(libc::SIGINT);
        #[cfg(windows)]
        unsafe {
            assert!(handle_console_ctrl(windows::Win32::System::Console::CTRL_C_EVENT).as_bool());
        }
        assert!(stop.is_stop_requested());
    }
}
