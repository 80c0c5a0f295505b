//! Control sequences: span encoding, width accounting, and terminal control.
//!
//! Lines flowing through the frame buffer interleave visible characters with
//! escape sequences. Everything that measures or clips a line goes through
//! [`Pieces`] so that escape sequences never count toward visible width and
//! are never split.

use std::io::Write;

use unicode_width::UnicodeWidthChar;

use super::Style;

// =============================================================================
// Constants
// =============================================================================

/// Escape character.
pub const ESC: char = '\x1b';

/// Reset all attributes.
pub const RESET: &str = "\x1b[0m";

// =============================================================================
// Span Encoding
// =============================================================================

/// Wrap `text` in the control-sequence prologue for `style` and a trailing reset.
///
/// Plain styles return the text unchanged. Every styled span ends in
/// [`RESET`], so encoded spans can be concatenated without bleed.
pub fn encode(text: &str, style: &Style) -> String {
    if style.is_plain() {
        return text.to_string();
    }
    let prologue = style.prologue();
    let mut out = String::with_capacity(prologue.len() + text.len() + RESET.len());
    out.push_str(&prologue);
    out.push_str(text);
    out.push_str(RESET);
    out
}

// =============================================================================
// Escape Splitting
// =============================================================================

/// A run of a styled line: either an escape sequence or visible text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Escape(&'a str),
    Text(&'a str),
}

/// Iterator splitting a line into escape sequences and text runs.
pub struct Pieces<'a> {
    rest: &'a str,
}

/// Split `text` into [`Piece`]s.
pub fn pieces(text: &str) -> Pieces<'_> {
    Pieces { rest: text }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Piece<'a>> {
        if self.rest.is_empty() {
            return None;
        }

        if self.rest.starts_with(ESC) {
            let len = escape_len(self.rest);
            let (escape, rest) = self.rest.split_at(len);
            self.rest = rest;
            return Some(Piece::Escape(escape));
        }

        let end = self.rest.find(ESC).unwrap_or(self.rest.len());
        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(Piece::Text(text))
    }
}

/// Byte length of the escape sequence at the start of `s` (which starts with ESC).
///
/// Handles CSI (`ESC [ ... final`), OSC (`ESC ] ... BEL` or `ESC ] ... ESC \`),
/// and two-character escapes. Unterminated sequences run to the end of input.
fn escape_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.get(1) {
        None => 1,
        Some(b'[') => {
            let mut i = 2;
            while i < bytes.len() {
                if (0x40..=0x7e).contains(&bytes[i]) {
                    return i + 1;
                }
                i += 1;
            }
            bytes.len()
        }
        Some(b']') => {
            let mut i = 2;
            while i < bytes.len() {
                if bytes[i] == 0x07 {
                    return i + 1;
                }
                if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                    return i + 2;
                }
                i += 1;
            }
            bytes.len()
        }
        Some(_) => {
            // ESC followed by one character (which may be multi-byte)
            let next = s[1..].chars().next().map(char::len_utf8).unwrap_or(0);
            1 + next
        }
    }
}

// =============================================================================
// Width Accounting
// =============================================================================

/// Remove every control sequence, leaving only visible text.
pub fn strip(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for piece in pieces(text) {
        if let Piece::Text(t) = piece {
            out.push_str(t);
        }
    }
    out
}

/// Display width of a single character in terminal cells.
#[inline]
pub fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Visible width of `text` in terminal cells, ignoring control sequences.
pub fn visible_length(text: &str) -> usize {
    pieces(text)
        .map(|piece| match piece {
            Piece::Text(t) => t.chars().map(char_width).sum(),
            Piece::Escape(_) => 0,
        })
        .sum()
}

/// Clip `text` to at most `width` visible cells.
///
/// Escape sequences before the cut are preserved. If anything was cut from a
/// line that carries escape sequences, a [`RESET`] is appended so the clipped
/// line stays self-terminating.
pub fn truncate(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut used = 0;
    let mut styled = false;
    let mut cut = false;

    'outer: for piece in pieces(text) {
        match piece {
            Piece::Escape(e) => {
                styled = true;
                out.push_str(e);
            }
            Piece::Text(t) => {
                for c in t.chars() {
                    let w = char_width(c);
                    if used + w > width {
                        cut = true;
                        break 'outer;
                    }
                    used += w;
                    out.push(c);
                }
            }
        }
    }

    if cut && styled && !out.ends_with(RESET) {
        out.push_str(RESET);
    }
    out
}

/// Append spaces until `text` is `width` cells wide. Never truncates.
pub fn pad_right(text: &str, width: usize) -> String {
    let current = visible_length(text);
    if current >= width {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + width - current);
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', width - current));
    out
}

/// Clip and pad `text` to exactly `width` cells.
pub fn fit(text: &str, width: usize) -> String {
    if visible_length(text) > width {
        pad_right(&truncate(text, width), width)
    } else {
        pad_right(text, width)
    }
}

/// Re-apply `background` after every `reset` inside `line`.
///
/// Embedded resets would otherwise drop the background for the remainder of
/// the line. An empty background leaves the line unchanged.
pub fn persist_background(line: &str, background: &str, reset: &str) -> String {
    if background.is_empty() || reset.is_empty() {
        return line.to_string();
    }
    let mut replacement = String::with_capacity(reset.len() + background.len());
    replacement.push_str(reset);
    replacement.push_str(background);
    line.replace(reset, &replacement)
}

// =============================================================================
// Cursor & Screen Control
// =============================================================================

/// Move cursor to a 0-based column/row (emitted 1-based).
#[inline]
pub fn cursor_to<W: Write>(w: &mut W, column: u16, row: u16) -> std::io::Result<()> {
    write!(w, "\x1b[{};{}H", row + 1, column + 1)
}

/// Hide cursor.
#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?25l")
}

/// Show cursor.
#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?25h")
}

/// Erase the entire current line.
#[inline]
pub fn erase_line<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[2K")
}

/// Erase the whole screen and home the cursor.
#[inline]
pub fn clear_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[2J\x1b[H")
}

/// Enter the alternate screen buffer.
#[inline]
pub fn enter_alt_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?1049h")
}

/// Exit the alternate screen buffer.
#[inline]
pub fn exit_alt_screen<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?1049l")
}

/// Begin synchronized output (terminal buffers until `end_sync`).
#[inline]
pub fn begin_sync<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?2026l")
}

/// Set terminal window title.
#[inline]
pub fn set_title<W: Write>(w: &mut W, title: &str) -> std::io::Result<()> {
    write!(w, "\x1b]0;{}\x07", title)
}

// =============================================================================
// Tests
// =============================================================================
