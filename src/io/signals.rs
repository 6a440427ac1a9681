//! Unix signal handling.
//!
//! SIGINT, SIGTERM, and SIGHUP are forwarded into the session channel as
//! [`Message::Shutdown`] so the session can restore the terminal and release
//! the position watch before exiting.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::{Handle, Signals},
};
use std::sync::mpsc::Sender;
use std::thread;

use crate::session::Message;

/// Stops the forwarding thread when dropped.
pub struct SignalForwarder {
    handle: Handle,
}

impl Drop for SignalForwarder {
    fn drop(&mut self) {
        self.handle.close();
    }
}

/// Spawn a thread that turns termination signals into shutdown messages.
pub fn setup_signal_handler(sender: Sender<Message>, debug_enabled: bool) -> Result<SignalForwarder> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;
    let handle = signals.handle();

    thread::spawn(move || {
        for sig in signals.forever() {
            if debug_enabled {
                log_pipe!();
                log_debug!("Received signal {}, shutting down", signal_name(sig));
            }
            if sender.send(Message::Shutdown).is_err() {
                break;
            }
        }
    });

    Ok(SignalForwarder { handle })
}

fn signal_name(sig: i32) -> &'static str {
    match sig {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGHUP => "SIGHUP",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::time::Duration;

    #[test]
    fn test_signal_names() {
        assert_eq!(signal_name(SIGTERM), "SIGTERM");
        assert_eq!(signal_name(SIGHUP), "SIGHUP");
        assert_eq!(signal_name(0), "unknown");
    }

    #[test]
    #[serial_test::serial]
    fn test_sighup_becomes_shutdown_message() {
        let (sender, receiver) = channel();
        let _forwarder = setup_signal_handler(sender, false).unwrap();

        signal_hook::low_level::raise(SIGHUP).unwrap();

        let message = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(message, Message::Shutdown));
    }
}
