//! Leaf primitives - Text, EmptyView, Spacer.

use std::borrow::Cow;

use crate::buffer::FrameBuffer;
use crate::style::{Style, encode};

use super::{Body, View, ViewContext};

// =============================================================================
// Text
// =============================================================================

/// Styled text, wrapped to the available width.
///
/// The text's own style is layered over the style inherited from the
/// environment (see [`Style::merge`]). Embedded newlines always break.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    content: String,
    style: Style,
    wrap: bool,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: Style::new(),
            wrap: true,
        }
    }

    pub fn styled(content: impl Into<String>, style: Style) -> Self {
        Self::new(content).style(style)
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Keep each line whole even when it exceeds the available width.
    pub fn no_wrap(mut self) -> Self {
        self.wrap = false;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    fn layout_lines(&self, width: Option<usize>) -> Vec<Cow<'_, str>> {
        let raw = self.content.split('\n');
        match width {
            Some(width) if self.wrap && width > 0 => raw
                .flat_map(|line| textwrap::wrap(line, width))
                .collect(),
            _ => raw.map(Cow::Borrowed).collect(),
        }
    }
}

impl View for Text {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let style = self.style.merge(&cx.env().style);
        let lines = self
            .layout_lines(cx.available_width())
            .into_iter()
            .map(|line| encode(&line, &style));
        Body::render(FrameBuffer::from_lines(lines))
    }
}

// =============================================================================
// EmptyView
// =============================================================================

/// Renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyView;

impl View for EmptyView {
    fn body(&self, _cx: &mut ViewContext<'_>) -> Body {
        Body::Empty
    }
}

// =============================================================================
// Spacer
// =============================================================================

/// Flexible space. Inside a stack it grows into whatever the other children
/// leave over along the stack's axis; elsewhere it renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spacer {
    min: usize,
}

impl Spacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never shrink below `min` cells.
    pub fn min(min: usize) -> Self {
        Self { min }
    }
}

impl View for Spacer {
    fn body(&self, _cx: &mut ViewContext<'_>) -> Body {
        Body::Empty
    }

    fn flex(&self) -> Option<usize> {
        Some(self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::channel;
    use crate::style::{Color, strip, visible_length};
    use crate::view::{Environment, Session, evaluate_root};

    fn render(view: &dyn View, width: Option<usize>) -> FrameBuffer {
        let (scheduler, _requests) = channel();
        let mut session = Session::new();
        let mut env = Environment::default();
        env.width = width;
        evaluate_root(view, &mut session, &scheduler, "content", env)
    }

    #[test]
    fn test_plain_text_unstyled() {
        let buffer = render(&Text::new("hello"), Some(80));
        assert_eq!(buffer.lines(), &["hello"]);
    }

    #[test]
    fn test_newlines_split() {
        let buffer = render(&Text::new("a\nbb\n"), None);
        assert_eq!(buffer.lines(), &["a", "bb", ""]);
    }

    #[test]
    fn test_wraps_to_width() {
        let buffer = render(&Text::new("the quick brown fox"), Some(9));
        assert_eq!(buffer.lines(), &["the quick", "brown fox"]);
        assert!(buffer.width() <= 9);
    }

    #[test]
    fn test_no_wrap_keeps_line() {
        let buffer = render(&Text::new("the quick brown fox").no_wrap(), Some(9));
        assert_eq!(buffer.height(), 1);
    }

    #[test]
    fn test_styled_width_matches_plain() {
        let text = Text::styled("styled", Style::new().fg(Color::RED).bold());
        let buffer = render(&text, Some(80));
        assert_eq!(strip(&buffer.lines()[0]), "styled");
        assert_eq!(visible_length(&buffer.lines()[0]), 6);
        assert!(buffer.lines()[0].starts_with("\x1b["));
    }

    #[test]
    fn test_spacer_and_empty_render_nothing() {
        assert!(render(&Spacer::new(), Some(10)).is_empty());
        assert!(render(&EmptyView, Some(10)).is_empty());
        assert_eq!(Spacer::min(2).flex(), Some(2));
        assert_eq!(Text::new("x").flex(), None);
    }
}
