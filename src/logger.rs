//! Structured logging with box-drawing output.
//!
//! Every line belongs to a visual block drawn with pipe characters:
//!
//! ```text
//! ┏ hospital-locator v0.3.0 ━━╸
//! ┃
//! ┣ Loaded configuration
//! ┃   Endpoint: https://nominatim.openstreetmap.org/search
//! ┣[DEBUG] Using 'geoclue' location provider
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - `log_block_start!` opens a new block (blank pipe line, then `┣ message`)
//! - `log_decorated!` continues a block with `┣ message`
//! - `log_indented!` prints details under the previous line (`┃   message`)
//! - `log_pipe!` inserts vertical spacing, usually before a leveled message
//! - `log_info!`, `log_warning!`, `log_error!`, `log_debug!` print a colored
//!   `[LEVEL]` tag inside the pipe structure
//! - `log_error_exit!` closes the output with a final error
//! - `log_version!` and `log_end!` open and close the whole output once
//!
//! Logging can be switched off at runtime with [`Log::set_enabled`]. The
//! interactive session does this because it owns the terminal; `--log <file>`
//! routes output to a file through a background writer instead
//! ([`Log::start_file_logging`]). File lines carry a wall-clock prefix and no
//! ANSI color codes.

use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Installed once when --log is given
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Line shapes produced by the logging macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    BlockStart,
    Decorated,
    Indented,
    Pipe,
    Version,
    End,
    Info,
    Warning,
    Error,
    ErrorExit,
    Debug,
}

pub struct Log;

impl Log {
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Whether output is routed to a log file.
    pub fn is_file_logging() -> bool {
        LOG_CHANNEL.get().is_some()
    }

    /// Route all further output to `file_path`.
    ///
    /// The returned guard flushes and closes the file when dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => file.write_all(text.as_bytes())?,
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Wall-clock prefix for file output, empty on the terminal.
    pub fn timestamp_prefix() -> String {
        if Self::is_file_logging() {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S%.3f"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that flushes the writer thread on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Render one log entry without the timestamp prefix.
pub fn render(style: Style, message: fmt::Arguments<'_>) -> String {
    let tagged = |color: u8, tag: &str| format!("┣[\x1b[{color}m{tag}\x1b[0m] {message}\n");

    match style {
        Style::BlockStart => format!("┃\n┣ {message}\n"),
        Style::Decorated => format!("┣ {message}\n"),
        Style::Indented => format!("┃   {message}\n"),
        Style::Pipe => "┃\n".to_string(),
        Style::Version => format!("┏ {message} ━━╸\n"),
        Style::End => "╹\n".to_string(),
        Style::Info => tagged(32, "INFO"),
        Style::Warning => tagged(33, "WARNING"),
        Style::Error => tagged(31, "ERROR"),
        Style::ErrorExit => format!("┃\n┗[\x1b[31mERROR\x1b[0m] {message}\n"),
        Style::Debug => tagged(32, "DEBUG"),
    }
}

/// Format and route one log entry. Used by the logging macros.
pub fn emit(style: Style, message: fmt::Arguments<'_>) {
    if !Log::is_enabled() {
        return;
    }

    let rendered = render(style, message);

    if let Some(tx) = LOG_CHANNEL.get() {
        let prefix = Log::timestamp_prefix();
        let text: String = strip_ansi_codes(&rendered)
            .lines()
            .map(|line| format!("{prefix}{line}\n"))
            .collect();
        let _ = tx.send(LogMessage::Formatted(text));
    } else {
        print!("{rendered}");
        let _ = std::io::stdout().flush();
    }
}

// # Logging Macros

#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::BlockStart, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Decorated, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Indented, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit($crate::logger::Style::Pipe, format_args!(""))
    };
}

/// Application header, printed once at startup.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit(
            $crate::logger::Style::Version,
            format_args!("hospital-locator v{}", env!("CARGO_PKG_VERSION")),
        )
    };
}

#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit($crate::logger::Style::End, format_args!(""))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Warning, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Error, format_args!($($arg)*))
    };
}

/// Final error line that terminates the output.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::ErrorExit, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Debug, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        assert_eq!(
            strip_ansi_codes("┣[\x1b[33mWARNING\x1b[0m] careful"),
            "┣[WARNING] careful"
        );
        assert_eq!(strip_ansi_codes("plain \x1b text"), "plain \x1b text");
    }

    #[test]
    fn test_render_shapes() {
        assert_eq!(
            render(Style::BlockStart, format_args!("Loaded {}", "configuration")),
            "┃\n┣ Loaded configuration\n"
        );
        assert_eq!(render(Style::Decorated, format_args!("b")), "┣ b\n");
        assert_eq!(render(Style::Indented, format_args!("a")), "┃   a\n");
        assert_eq!(render(Style::Pipe, format_args!("")), "┃\n");
        assert_eq!(
            strip_ansi_codes(&render(Style::Debug, format_args!("x = {}", 1))),
            "┣[DEBUG] x = 1\n"
        );
        assert_eq!(
            strip_ansi_codes(&render(Style::Error, format_args!("lost"))),
            "┣[ERROR] lost\n"
        );
        assert_eq!(
            strip_ansi_codes(&render(Style::ErrorExit, format_args!("boom"))),
            "┃\n┗[ERROR] boom\n"
        );
    }

    #[test]
    fn test_no_prefix_without_file_logging() {
        if !Log::is_file_logging() {
            assert_eq!(Log::timestamp_prefix(), "");
        }
    }
}
