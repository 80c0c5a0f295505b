//! Line-diff writer.
//!
//! The FrameDiffWriter compares each frame's terminal-ready lines to the
//! previous frame's and writes only the rows that changed. Two independent
//! caches are kept, one for the main content region and one for the fixed
//! status region, so a change in one never forces a rewrite of the other.
//!
//! # Algorithm
//!
//! 1. [`build_output_lines`] turns a frame buffer into exactly `height`
//!    full-width lines (background persisted, padded, reset-terminated)
//! 2. For each row: if the cache has no row there or the strings differ,
//!    position the cursor and write the line; identical rows are skipped
//! 3. Rows the previous frame had beyond the new frame's height are erased
//! 4. Everything is queued in an [`OutputBuffer`] and flushed with one write
//!    (wrapped in a synchronized-output block when enabled)
//!
//! Writes never surface errors: a failed flush is logged, and both caches are
//! invalidated so the next frame repaints everything.

use std::io::{self, Write};

use tracing::{trace, warn};

use crate::buffer::FrameBuffer;
use crate::style::ansi::{begin_sync, cursor_to, end_sync, erase_line, set_title};
use crate::style::{fit, persist_background};

/// How many consecutive `WouldBlock` results a flush tolerates.
const MAX_WOULD_BLOCK_RETRIES: usize = 64;

// =============================================================================
// Output Lines
// =============================================================================

/// Convert `buffer` into exactly `height` terminal-ready lines of `width`
/// cells.
///
/// Each line starts with `background`, is clipped or padded to `width`,
/// re-applies `background` after every `reset` left in the clipped line
/// (including one closing a clipped span), and ends with `reset`. Rows past
/// the end of the buffer are background-filled blanks.
pub fn build_output_lines(
    buffer: &FrameBuffer,
    width: usize,
    height: usize,
    background: &str,
    reset: &str,
) -> Vec<String> {
    let blank = {
        let mut line = String::with_capacity(background.len() + width + reset.len());
        line.push_str(background);
        line.extend(std::iter::repeat_n(' ', width));
        line.push_str(reset);
        line
    };

    (0..height)
        .map(|row| match buffer.lines().get(row) {
            Some(source) => {
                let body = persist_background(&fit(source, width), background, reset);
                let mut line = String::with_capacity(background.len() + body.len() + reset.len());
                line.push_str(background);
                line.push_str(&body);
                line.push_str(reset);
                line
            }
            None => blank.clone(),
        })
        .collect()
}

// =============================================================================
// OutputBuffer
// =============================================================================

/// A buffer that accumulates output for batch writing.
///
/// Instead of many small writes to the terminal, everything for one frame is
/// accumulated and written at once.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(16384) // 16KB default
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear the buffer without deallocating.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(()) // Buffering only - real write via FrameDiffWriter::flush
    }
}

/// Write all of `bytes`, retrying partial writes and interruptions.
///
/// Gives up on a hard error, on a zero-length write, or after
/// [`MAX_WOULD_BLOCK_RETRIES`] consecutive `WouldBlock`s.
fn write_fully<W: Write>(writer: &mut W, mut bytes: &[u8]) -> io::Result<()> {
    let mut would_block = 0;
    while !bytes.is_empty() {
        match writer.write(bytes) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => {
                bytes = &bytes[n..];
                would_block = 0;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                would_block += 1;
                if would_block > MAX_WOULD_BLOCK_RETRIES {
                    return Err(e);
                }
                std::thread::yield_now();
            }
            Err(e) => return Err(e),
        }
    }
    loop {
        match writer.flush() {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            other => return other,
        }
    }
}

// =============================================================================
// FrameDiffWriter
// =============================================================================

/// Rows touched by one diff call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub rows_written: usize,
    pub rows_cleared: usize,
}

impl DiffStats {
    pub fn is_empty(&self) -> bool {
        self.rows_written == 0 && self.rows_cleared == 0
    }
}

impl std::ops::AddAssign for DiffStats {
    fn add_assign(&mut self, other: Self) {
        self.rows_written += other.rows_written;
        self.rows_cleared += other.rows_cleared;
    }
}

/// Differential line writer over any byte sink.
pub struct FrameDiffWriter<W: Write> {
    writer: W,
    output: OutputBuffer,
    content: Vec<String>,
    status: Vec<String>,
    status_row: Option<usize>,
    synchronized: bool,
}

impl<W: Write> FrameDiffWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            output: OutputBuffer::new(),
            content: Vec::new(),
            status: Vec::new(),
            status_row: None,
            synchronized: false,
        }
    }

    /// Wrap each flushed frame in a synchronized-output block.
    pub fn with_synchronized_output(mut self, enabled: bool) -> Self {
        self.synchronized = enabled;
        self
    }

    /// Queue the rows of `lines` that differ from the content cache.
    pub fn write_content_diff(&mut self, lines: &[String], start_row: usize) -> DiffStats {
        let stats = diff_region(&mut self.output, &self.content, lines, start_row);
        self.content = lines.to_vec();
        stats
    }

    /// Queue the rows of `lines` that differ from the status cache.
    ///
    /// The cache only holds for the row it was written at; a status region
    /// that moved is rewritten in full.
    pub fn write_status_diff(&mut self, lines: &[String], start_row: usize) -> DiffStats {
        if self.status_row != Some(start_row) {
            self.status.clear();
            self.status_row = Some(start_row);
        }
        let stats = diff_region(&mut self.output, &self.status, lines, start_row);
        self.status = lines.to_vec();
        stats
    }

    /// Forget both caches; the next diff rewrites every row.
    ///
    /// Must be called on terminal resize.
    pub fn invalidate(&mut self) {
        self.content.clear();
        self.status.clear();
    }

    /// Forget the status cache after a pass that drew no status region.
    ///
    /// The content region has painted over those rows, so the next status
    /// diff must rewrite every row.
    pub fn reset_status(&mut self) {
        self.status.clear();
        self.status_row = None;
    }

    /// Queue a window-title change.
    pub fn write_title(&mut self, title: &str) {
        let _ = set_title(&mut self.output, title);
    }

    /// Queue raw bytes (screen setup, etc.).
    pub fn write_raw(&mut self, raw: &str) {
        self.output.write_str(raw);
    }

    /// Bytes queued but not yet flushed.
    pub fn pending_bytes(&self) -> usize {
        self.output.len()
    }

    /// Write everything queued. Returns false if the write was abandoned, in
    /// which case both caches have been invalidated.
    pub fn flush(&mut self) -> bool {
        if self.output.is_empty() {
            return true;
        }

        let result = if self.synchronized {
            let mut framed = OutputBuffer::with_capacity(self.output.len() + 16);
            let _ = begin_sync(&mut framed);
            framed.data.extend_from_slice(self.output.as_bytes());
            let _ = end_sync(&mut framed);
            write_fully(&mut self.writer, framed.as_bytes())
        } else {
            write_fully(&mut self.writer, self.output.as_bytes())
        };
        self.output.clear();

        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "terminal write abandoned; next frame repaints");
                self.invalidate();
                false
            }
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> std::fmt::Debug for FrameDiffWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDiffWriter")
            .field("content_rows", &self.content.len())
            .field("status_rows", &self.status.len())
            .field("pending", &self.output.len())
            .field("synchronized", &self.synchronized)
            .finish()
    }
}

fn diff_region(
    output: &mut OutputBuffer,
    previous: &[String],
    lines: &[String],
    start_row: usize,
) -> DiffStats {
    let mut stats = DiffStats::default();

    for (i, line) in lines.iter().enumerate() {
        if previous.get(i) == Some(line) {
            continue;
        }
        let row = terminal_row(start_row + i);
        trace!(row, "row changed");
        let _ = cursor_to(output, 0, row);
        output.write_str(line);
        stats.rows_written += 1;
    }

    for i in lines.len()..previous.len() {
        let _ = cursor_to(output, 0, terminal_row(start_row + i));
        let _ = erase_line(output);
        stats.rows_cleared += 1;
    }

    stats
}

#[inline]
fn terminal_row(row: usize) -> u16 {
    u16::try_from(row).unwrap_or(u16::MAX)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{RESET, visible_length};

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn output(writer: &FrameDiffWriter<Vec<u8>>) -> String {
        String::from_utf8_lossy(writer.writer()).into_owned()
    }

    #[test]
    fn test_build_output_lines_exact_height_and_width() {
        let buffer = FrameBuffer::from_lines(["ab", "cdefgh"]);
        let out = build_output_lines(&buffer, 4, 3, "", RESET);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], format!("ab  {}", RESET));
        assert_eq!(out[1], format!("cdef{}", RESET));
        assert_eq!(out[2], format!("    {}", RESET));
        assert!(out.iter().all(|l| visible_length(l) == 4));
    }

    #[test]
    fn test_build_output_lines_persists_background() {
        let bg = "\x1b[44m";
        let buffer = FrameBuffer::from_lines(["\x1b[1mA\x1b[0mB"]);
        let out = build_output_lines(&buffer, 3, 1, bg, RESET);
        assert_eq!(out[0], "\x1b[44m\x1b[1mA\x1b[0m\x1b[44mB \x1b[0m");
    }

    #[test]
    fn test_build_output_lines_background_after_clipped_wide_span() {
        let bg = "\x1b[44m";
        let buffer = FrameBuffer::from_lines(["\x1b[1m日本語\x1b[0m"]);
        let out = build_output_lines(&buffer, 5, 1, bg, RESET);
        assert_eq!(out[0], "\x1b[44m\x1b[1m日本\x1b[0m\x1b[44m \x1b[0m");
        assert_eq!(visible_length(&out[0]), 5);
    }

    #[test]
    fn test_identical_frame_writes_nothing() {
        let mut writer = FrameDiffWriter::new(Vec::new());
        let frame = lines(&["a", "b", "c"]);

        assert_eq!(writer.write_content_diff(&frame, 0).rows_written, 3);
        let again = writer.write_content_diff(&frame, 0);
        assert!(again.is_empty());
    }

    #[test]
    fn test_one_changed_row() {
        let mut writer = FrameDiffWriter::new(Vec::new());
        writer.write_content_diff(&lines(&["a", "b", "c"]), 0);
        writer.flush();
        writer.writer_mut().clear();

        let stats = writer.write_content_diff(&lines(&["a", "B", "c"]), 0);
        assert_eq!(stats.rows_written, 1);
        writer.flush();
        assert_eq!(output(&writer), "\x1b[2;1HB");
    }

    #[test]
    fn test_shrink_clears_extra_rows() {
        let mut writer = FrameDiffWriter::new(Vec::new());
        writer.write_content_diff(&lines(&["a", "b", "c"]), 0);
        let stats = writer.write_content_diff(&lines(&["a"]), 0);
        assert_eq!(stats, DiffStats { rows_written: 0, rows_cleared: 2 });
    }

    #[test]
    fn test_invalidate_forces_full_rewrite() {
        let mut writer = FrameDiffWriter::new(Vec::new());
        let frame = lines(&["a", "b"]);
        writer.write_content_diff(&frame, 0);
        writer.write_status_diff(&frame, 5);
        writer.invalidate();
        assert_eq!(writer.write_content_diff(&frame, 0).rows_written, 2);
        assert_eq!(writer.write_status_diff(&frame, 5).rows_written, 2);
    }

    #[test]
    fn test_regions_are_independent() {
        let mut writer = FrameDiffWriter::new(Vec::new());
        writer.write_content_diff(&lines(&["c1", "c2"]), 0);
        writer.write_status_diff(&lines(&["status"]), 2);

        assert_eq!(writer.write_content_diff(&lines(&["c1", "C2"]), 0).rows_written, 1);
        assert!(writer.write_status_diff(&lines(&["status"]), 2).is_empty());
    }

    #[test]
    fn test_reset_status_forces_rewrite() {
        let mut writer = FrameDiffWriter::new(Vec::new());
        let status = lines(&["ready"]);
        writer.write_status_diff(&status, 3);
        writer.reset_status();
        assert_eq!(writer.write_status_diff(&status, 3).rows_written, 1);
    }

    #[test]
    fn test_moved_status_rewrites() {
        let mut writer = FrameDiffWriter::new(Vec::new());
        let status = lines(&["ready"]);
        writer.write_status_diff(&status, 3);
        let stats = writer.write_status_diff(&status, 5);
        assert_eq!(stats, DiffStats { rows_written: 1, rows_cleared: 0 });
        assert!(writer.write_status_diff(&status, 5).is_empty());
    }

    #[test]
    fn test_status_rows_offset() {
        let mut writer = FrameDiffWriter::new(Vec::new());
        writer.write_status_diff(&lines(&["s"]), 23);
        writer.flush();
        assert_eq!(output(&writer), "\x1b[24;1Hs");
    }

    #[test]
    fn test_synchronized_flush_wraps_frame() {
        let mut writer = FrameDiffWriter::new(Vec::new()).with_synchronized_output(true);
        assert!(writer.flush());
        assert!(writer.writer().is_empty());

        writer.write_content_diff(&lines(&["x"]), 0);
        assert!(writer.flush());
        assert_eq!(output(&writer), "\x1b[?2026h\x1b[1;1Hx\x1b[?2026l");
    }

    /// Accepts a few bytes per call and is interrupted every other call.
    struct Choppy {
        data: Vec<u8>,
        calls: usize,
    }

    impl Write for Choppy {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let n = buf.len().min(3);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_partial_writes_complete() {
        let mut writer = FrameDiffWriter::new(Choppy { data: Vec::new(), calls: 0 });
        writer.write_content_diff(&lines(&["hello world"]), 0);
        assert!(writer.flush());
        assert_eq!(writer.writer().data, b"\x1b[1;1Hhello world");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_hard_error_abandons_and_invalidates() {
        let mut writer = FrameDiffWriter::new(Broken);
        let frame = lines(&["a"]);
        writer.write_content_diff(&frame, 0);
        assert!(!writer.flush());
        assert_eq!(writer.pending_bytes(), 0);
        assert_eq!(writer.write_content_diff(&frame, 0).rows_written, 1);
    }

    struct Blocked;

    impl Write for Blocked {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::WouldBlock.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_would_block_gives_up() {
        let mut writer = FrameDiffWriter::new(Blocked);
        writer.write_content_diff(&lines(&["a"]), 0);
        assert!(!writer.flush());
    }
}
