//! FrameBuffer and compositing.
//!
//! A FrameBuffer is an ordered list of styled text lines: the in-memory canvas
//! every view evaluates to. Lines may interleave visible characters with
//! control sequences, so all width accounting goes through
//! [`visible_length`](crate::style::visible_length), never `str::len`.
//!
//! # Design Decisions
//!
//! - **Cached width**: the visible width is recomputed only when lines change,
//!   not on every read. Stripping control sequences is the expensive part.
//! - **Line-level compositing**: [`FrameBuffer::overlay`] replaces lines; there
//!   is no per-character blending and no transparency.
//! - **Self-terminating lines**: clipping goes through
//!   [`truncate`](crate::style::truncate), which closes any open style, so
//!   compositing never leaves a style-start without a reset.

use crate::style::{fit, pad_right, truncate, visible_length};

// =============================================================================
// Alignment
// =============================================================================

/// Horizontal placement of narrower content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    #[default]
    Leading,
    Center,
    Trailing,
}

/// Vertical placement of shorter content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Two-dimensional alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
}

impl Alignment {
    pub const TOP_LEADING: Self = Self::new(HorizontalAlignment::Leading, VerticalAlignment::Top);
    pub const TOP: Self = Self::new(HorizontalAlignment::Center, VerticalAlignment::Top);
    pub const CENTER: Self = Self::new(HorizontalAlignment::Center, VerticalAlignment::Center);
    pub const LEADING: Self = Self::new(HorizontalAlignment::Leading, VerticalAlignment::Center);
    pub const TRAILING: Self = Self::new(HorizontalAlignment::Trailing, VerticalAlignment::Center);
    pub const BOTTOM: Self = Self::new(HorizontalAlignment::Center, VerticalAlignment::Bottom);
    pub const BOTTOM_TRAILING: Self =
        Self::new(HorizontalAlignment::Trailing, VerticalAlignment::Bottom);

    pub const fn new(horizontal: HorizontalAlignment, vertical: VerticalAlignment) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Split `extra` cells into (before, after) for an alignment.
#[inline]
fn split_extra(extra: usize, leading: bool, center: bool) -> (usize, usize) {
    if leading {
        (0, extra)
    } else if center {
        (extra / 2, extra - extra / 2)
    } else {
        (extra, 0)
    }
}

impl HorizontalAlignment {
    fn split(self, extra: usize) -> (usize, usize) {
        split_extra(extra, self == Self::Leading, self == Self::Center)
    }
}

impl VerticalAlignment {
    fn split(self, extra: usize) -> (usize, usize) {
        split_extra(extra, self == Self::Top, self == Self::Center)
    }
}

// =============================================================================
// FrameBuffer
// =============================================================================

/// An ordered sequence of styled text lines with a cached visible width.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameBuffer {
    lines: Vec<String>,
    width: usize,
}

impl FrameBuffer {
    /// Create an empty buffer (zero width, zero height).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer from raw lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buffer = Self {
            lines: lines.into_iter().map(Into::into).collect(),
            width: 0,
        };
        buffer.recompute_width();
        buffer
    }

    /// Create a buffer of `height` lines, each `width` spaces.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            lines: vec![" ".repeat(width); height],
            width,
        }
    }

    /// Visible width: the widest line, excluding control sequences.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of lines.
    #[inline]
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// True when the buffer has no lines.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The lines, in order.
    #[inline]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Take the lines out of the buffer.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Append one line.
    pub fn push_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        self.width = self.width.max(visible_length(&line));
        self.lines.push(line);
    }

    fn recompute_width(&mut self) {
        self.width = self.lines.iter().map(|l| visible_length(l)).max().unwrap_or(0);
    }

    // =========================================================================
    // Compositing
    // =========================================================================

    /// Append `other` below this buffer with `spacing` blank lines between.
    ///
    /// Spacing is only inserted when both buffers have content.
    pub fn append_vertically(&mut self, other: &FrameBuffer, spacing: usize) {
        if other.is_empty() {
            return;
        }
        if !self.is_empty() {
            self.lines
                .extend(std::iter::repeat_n(String::new(), spacing));
        }
        self.lines.extend(other.lines.iter().cloned());
        self.width = self.width.max(other.width);
    }

    /// Join `other` to the right of this buffer.
    ///
    /// The shorter operand is padded with blank rows according to `alignment`,
    /// and every row of each operand is padded to that operand's own width so
    /// ragged lines still line up in straight columns.
    pub fn append_horizontally(&mut self, other: &FrameBuffer, alignment: VerticalAlignment) {
        let height = self.height().max(other.height());
        let left_width = self.width;
        let right_width = other.width;

        let left = aligned_rows(&self.lines, height, alignment);
        let right = aligned_rows(&other.lines, height, alignment);

        let lines = left
            .into_iter()
            .zip(right)
            .map(|(l, r)| {
                let mut row = pad_right(l.unwrap_or(""), left_width);
                row.push_str(&pad_right(r.unwrap_or(""), right_width));
                row
            })
            .collect();

        self.lines = lines;
        self.width = left_width + right_width;
    }

    /// Replace lines of this buffer with the lines of `other`, starting at
    /// (`at_row`, `at_column`).
    ///
    /// Each affected base line keeps its first `at_column` cells; the rest of
    /// the line is replaced by the overlay line. Anything beyond the base
    /// buffer's bounds is clipped.
    pub fn overlay(&mut self, other: &FrameBuffer, at_row: usize, at_column: usize) {
        let base_width = self.width;
        if at_column >= base_width {
            return;
        }
        let available = base_width - at_column;

        for (offset, line) in other.lines.iter().enumerate() {
            let Some(target) = self.lines.get_mut(at_row + offset) else {
                break;
            };
            let mut replaced = if at_column == 0 {
                String::new()
            } else {
                fit(target, at_column)
            };
            replaced.push_str(&truncate(line, available));
            *target = replaced;
        }
        self.recompute_width();
    }

    /// Resize to exactly `width` × `height`, clipping or padding according to
    /// `alignment`.
    pub fn pad_to(&self, width: usize, height: usize, alignment: Alignment) -> FrameBuffer {
        let source = self.height();
        let (skip, top, bottom) = if source >= height {
            let (before, _) = alignment.vertical.split(source - height);
            (before, 0, 0)
        } else {
            let (before, after) = alignment.vertical.split(height - source);
            (0, before, after)
        };

        let blank = " ".repeat(width);
        let mut lines = Vec::with_capacity(height);
        lines.extend(std::iter::repeat_n(blank.clone(), top));
        lines.extend(
            self.lines
                .iter()
                .skip(skip)
                .take(height)
                .map(|line| align_line(line, width, alignment.horizontal)),
        );
        lines.extend(std::iter::repeat_n(blank, bottom));

        FrameBuffer { lines, width }
    }

    /// Pad every line to `width` using `alignment`. Wider lines are left alone.
    pub fn align_lines(&mut self, width: usize, alignment: HorizontalAlignment) {
        for line in &mut self.lines {
            let current = visible_length(line);
            if current < width {
                *line = align_line(line, width, alignment);
            }
        }
        self.width = self.width.max(width);
    }

    /// Prefix every line with `columns` spaces.
    pub fn indent(&mut self, columns: usize) {
        if columns == 0 {
            return;
        }
        let prefix = " ".repeat(columns);
        for line in &mut self.lines {
            line.insert_str(0, &prefix);
        }
        self.width += columns;
    }

    /// Transform every line, recomputing the cached width afterwards.
    pub fn map_lines<F>(mut self, f: F) -> Self
    where
        F: FnMut(&String) -> String,
    {
        self.lines = self.lines.iter().map(f).collect();
        self.recompute_width();
        self
    }
}

/// Rows of `lines` placed within `height` rows; `None` marks padding rows.
fn aligned_rows(lines: &[String], height: usize, alignment: VerticalAlignment) -> Vec<Option<&str>> {
    let (top, bottom) = alignment.split(height.saturating_sub(lines.len()));
    let mut rows = Vec::with_capacity(height);
    rows.extend(std::iter::repeat_n(None, top));
    rows.extend(lines.iter().map(|l| Some(l.as_str())));
    rows.extend(std::iter::repeat_n(None, bottom));
    rows
}

/// Clip or pad a single line to exactly `width` cells.
fn align_line(line: &str, width: usize, alignment: HorizontalAlignment) -> String {
    let current = visible_length(line);
    if current >= width {
        return fit(line, width);
    }
    let (before, after) = alignment.split(width - current);
    let mut out = String::with_capacity(line.len() + before + after);
    out.extend(std::iter::repeat_n(' ', before));
    out.push_str(line);
    out.extend(std::iter::repeat_n(' ', after));
    out
}

// =============================================================================
// Tests
// =============================================================================
