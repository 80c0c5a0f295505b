//! Terminal setup and teardown.
//!
//! Handles entering/exiting raw mode, the alternate screen and cursor
//! visibility. Everything entered is undone when the guard drops, including
//! on panic unwinds and early returns.

use std::io::{self, Write};

use crossterm::terminal;
use tracing::{debug, warn};

use super::OutputBuffer;
use crate::style::ansi;

/// Terminal setup/teardown handle.
#[derive(Debug, Default)]
pub struct TerminalGuard {
    is_raw: bool,
    alternate_screen: bool,
    cursor_hidden: bool,
}

impl TerminalGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw mode, hidden cursor, cleared screen, and the alternate screen when
    /// `alternate_screen` is set.
    pub fn enter(&mut self, alternate_screen: bool) -> io::Result<()> {
        let mut out = OutputBuffer::new();

        terminal::enable_raw_mode()?;
        self.is_raw = true;

        if alternate_screen {
            ansi::enter_alt_screen(&mut out)?;
            self.alternate_screen = true;
        }
        ansi::cursor_hide(&mut out)?;
        self.cursor_hidden = true;
        ansi::clear_screen(&mut out)?;

        write_stdout(out.as_bytes())?;
        debug!(alternate_screen, "terminal entered");
        Ok(())
    }

    /// Restore everything `enter` changed. Safe to call more than once.
    pub fn restore(&mut self) -> io::Result<()> {
        let mut out = OutputBuffer::new();

        ansi::erase_line(&mut out)?;
        out.write_str(crate::style::RESET);
        if self.cursor_hidden {
            ansi::cursor_show(&mut out)?;
            self.cursor_hidden = false;
        }
        if self.alternate_screen {
            ansi::exit_alt_screen(&mut out)?;
            self.alternate_screen = false;
        }
        write_stdout(out.as_bytes())?;

        if self.is_raw {
            terminal::disable_raw_mode()?;
            self.is_raw = false;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.is_raw || self.alternate_screen || self.cursor_hidden
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.is_active() {
            if let Err(err) = self.restore() {
                warn!(error = %err, "terminal restore failed");
            }
        }
    }
}

fn write_stdout(bytes: &[u8]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()
}

/// Current terminal size as (columns, rows), or `fallback` when the query
/// fails or reports a zero dimension.
pub fn terminal_size(fallback: (u16, u16)) -> (u16, u16) {
    match terminal::size() {
        Ok((width, height)) if width > 0 && height > 0 => (width, height),
        Ok(size) => {
            warn!(?size, ?fallback, "terminal reported empty size; using fallback");
            fallback
        }
        Err(err) => {
            warn!(error = %err, ?fallback, "terminal size unavailable; using fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_guard_inactive() {
        let guard = TerminalGuard::new();
        assert!(!guard.is_active());
    }

    #[test]
    fn test_size_is_never_zero() {
        let (width, height) = terminal_size((80, 24));
        assert!(width > 0 && height > 0);
    }
}
