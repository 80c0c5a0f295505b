//! Styled-text encoding.
//!
//! A [`Style`] describes how a span of text looks: foreground and background
//! [`Color`], plus [`Attr`] flags. [`encode`] turns text + style into a
//! self-terminating control-sequence string; [`strip`] and [`visible_length`]
//! are the inverse utilities used for width accounting everywhere a line is
//! measured.
//!
//! # Example
//!
//! ```
//! use spark_view::style::{encode, visible_length, Attr, Color, Style};
//!
//! let style = Style::new().fg(Color::RED).attrs(Attr::BOLD);
//! let span = encode("error", &style);
//!
//! assert_eq!(span, "\x1b[31;1merror\x1b[0m");
//! assert_eq!(visible_length(&span), 5);
//! ```

pub mod ansi;
mod color;

pub use ansi::{RESET, encode, fit, pad_right, persist_background, strip, truncate, visible_length};
pub use color::Color;

// =============================================================================
// Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
        const HIDDEN = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

impl Attr {
    /// SGR codes in emission order.
    const CODES: [(Attr, u8); 8] = [
        (Attr::BOLD, 1),
        (Attr::DIM, 2),
        (Attr::ITALIC, 3),
        (Attr::UNDERLINE, 4),
        (Attr::BLINK, 5),
        (Attr::INVERSE, 7),
        (Attr::HIDDEN, 8),
        (Attr::STRIKETHROUGH, 9),
    ];
}

// =============================================================================
// Style
// =============================================================================

/// Style descriptor for a span of text.
///
/// `None` colors inherit from the surrounding environment; `Some(Color::Default)`
/// explicitly selects the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attr,
}

impl Style {
    /// An empty style (plain text).
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: Attr::NONE,
        }
    }

    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn attrs(mut self, attrs: Attr) -> Self {
        self.attrs |= attrs;
        self
    }

    pub fn bold(self) -> Self {
        self.attrs(Attr::BOLD)
    }

    pub fn dim(self) -> Self {
        self.attrs(Attr::DIM)
    }

    pub fn italic(self) -> Self {
        self.attrs(Attr::ITALIC)
    }

    pub fn underline(self) -> Self {
        self.attrs(Attr::UNDERLINE)
    }

    pub fn strikethrough(self) -> Self {
        self.attrs(Attr::STRIKETHROUGH)
    }

    /// True when encoding with this style emits no control sequences.
    pub fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_empty()
    }

    /// Layer `self` over an inherited `parent` style.
    ///
    /// Colors set on `self` win; attributes accumulate.
    pub fn merge(&self, parent: &Style) -> Style {
        Style {
            fg: self.fg.or(parent.fg),
            bg: self.bg.or(parent.bg),
            attrs: self.attrs | parent.attrs,
        }
    }

    /// The SGR prologue selecting this style, or an empty string for a plain style.
    pub fn prologue(&self) -> String {
        if self.is_plain() {
            return String::new();
        }

        fn push_sep(params: &mut String) {
            if !params.is_empty() {
                params.push(';');
            }
        }

        let mut params = String::with_capacity(24);

        if let Some(fg) = self.fg {
            push_sep(&mut params);
            fg.write_fg_params(&mut params);
        }
        if let Some(bg) = self.bg {
            push_sep(&mut params);
            bg.write_bg_params(&mut params);
        }
        for (flag, code) in Attr::CODES {
            if self.attrs.contains(flag) {
                push_sep(&mut params);
                params.push_str(&code.to_string());
            }
        }

        format!("\x1b[{}m", params)
    }
}

impl From<Color> for Style {
    fn from(color: Color) -> Self {
        Style::new().fg(color)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_style_has_no_prologue() {
        assert!(Style::new().is_plain());
        assert_eq!(Style::new().prologue(), "");
    }

    #[test]
    fn test_prologue_orders_fg_bg_attrs() {
        let style = Style::new()
            .fg(Color::Rgb(255, 128, 64))
            .bg(Color::Indexed(236))
            .attrs(Attr::BOLD | Attr::UNDERLINE);
        assert_eq!(style.prologue(), "\x1b[38;2;255;128;64;48;5;236;1;4m");
    }

    #[test]
    fn test_attr_only_prologue() {
        let style = Style::new().attrs(Attr::BOLD | Attr::ITALIC | Attr::STRIKETHROUGH);
        assert_eq!(style.prologue(), "\x1b[1;3;9m");
    }

    #[test]
    fn test_merge_child_wins() {
        let parent = Style::new().fg(Color::RED).bg(Color::BLUE).bold();
        let child = Style::new().fg(Color::GREEN).italic();
        let merged = child.merge(&parent);

        assert_eq!(merged.fg, Some(Color::GREEN));
        assert_eq!(merged.bg, Some(Color::BLUE));
        assert_eq!(merged.attrs, Attr::BOLD | Attr::ITALIC);
    }
}
