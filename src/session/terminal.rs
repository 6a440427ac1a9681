//! Interactive terminal front end for a [`Session`].
//!
//! The terminal is put into raw mode on the alternate screen for the lifetime
//! of a [`TerminalGuard`]. A reader thread turns key presses into session
//! messages; the session thread redraws after every message.

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event as TermEvent},
    execute, queue,
    style::Print,
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use std::io::{Write, stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{Flow, Message, Session};

const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Raw mode and alternate screen, restored on drop.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(stdout(), EnterAlternateScreen, Hide)
            .context("failed to enter the alternate screen")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Forward key presses to `sender` until `running` is cleared.
fn spawn_key_reader(sender: Sender<Message>, running: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            match event::poll(KEY_POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(_) => break,
            }
            match event::read() {
                Ok(TermEvent::Key(key)) => {
                    if sender.send(Message::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    })
}

/// Replace the screen contents with `lines`.
fn draw(lines: &[String]) -> Result<()> {
    let mut out = stdout();
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for line in lines {
        // Raw mode needs explicit carriage returns
        queue!(out, Print(line), Print("\r\n"))?;
    }
    out.flush()?;
    Ok(())
}

/// Run the interactive loop until the user quits or a shutdown arrives.
pub fn run_interactive(session: &mut Session) -> Result<()> {
    let _guard = TerminalGuard::new()?;
    let running = Arc::new(AtomicBool::new(true));
    let reader = spawn_key_reader(session.sender(), Arc::clone(&running));

    let result = (|| -> Result<()> {
        draw(&session.render())?;
        while let Some(message) = session.next_message() {
            if session.process(message) == Flow::Quit {
                break;
            }
            draw(&session.render())?;
        }
        Ok(())
    })();

    running.store(false, Ordering::SeqCst);
    let _ = reader.join();
    session.teardown();
    result
}
