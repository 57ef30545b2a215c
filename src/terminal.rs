//! Terminal mode handling and the live input byte stream.

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;

use anyhow::{Context, Result};
use crossterm::terminal;

use crate::config::{FALLBACK_COLS, FALLBACK_ROWS, KEY_TIMEOUT};
use crate::input::ByteSource;

/// Raw-mode guard. Entering raw mode is the one startup step that is
/// allowed to be fatal; without it key decoding cannot work.
pub struct RawMode;

impl RawMode {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to put the terminal into raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        // Leave the cursor visible wherever the last frame put it.
        let _ = io::stdout().write_all(b"\x1b[?25h");
        let _ = io::stdout().flush();
    }
}

/// Current terminal size as (cols, rows). Falls back to fixed defaults
/// when there is no real terminal to ask.
pub fn size() -> (usize, usize) {
    match terminal::size() {
        Ok((cols, rows)) => (cols as usize, rows as usize),
        Err(err) => {
            log::warn!("terminal size unavailable ({err}), using fallback");
            (FALLBACK_COLS, FALLBACK_ROWS)
        }
    }
}

/// Live byte stream from stdin.
///
/// A pump thread blocks on stdin and forwards bytes over a channel; the
/// session side receives with a short timeout. That timeout gives the
/// decoder its lone-ESC disambiguation and the session loop its resize
/// poll tick without a second suspension point.
pub struct TtyInput {
    rx: Receiver<u8>,
}

impl TtyInput {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut buf = [0u8; 1];
            loop {
                match stdin.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if tx.send(buf[0]).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Self { rx }
    }
}

impl Default for TtyInput {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSource for TtyInput {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        match self.rx.recv_timeout(KEY_TIMEOUT) {
            Ok(byte) => Ok(Some(byte)),
            // Disconnection means stdin hit EOF; treat it like silence so
            // the session keeps rendering until the user quits.
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }
}
