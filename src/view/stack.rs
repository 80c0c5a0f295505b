//! Stacks - VStack, HStack, ZStack.
//!
//! Every child gets its own identity suffix by position, so siblings never
//! share state. Children are measured by evaluating them; the main axis is
//! then distributed by [`layout::distribute`](crate::layout::distribute), which
//! hands leftover space to spacers.

use crate::buffer::{Alignment, FrameBuffer, HorizontalAlignment, VerticalAlignment};
use crate::identity::Segment;
use crate::layout::{AxisItem, distribute};

use super::{AnyView, Body, View, ViewContext};

/// One measured child: its buffer, or the minimum length of a spacer.
enum Measured {
    Content(FrameBuffer),
    Flexible(usize),
}

/// Evaluate every child, unbounded along the main axis. Empty children that
/// are not flexible drop out.
fn measure(cx: &mut ViewContext<'_>, children: &[AnyView], vertical: bool) -> Vec<Measured> {
    let mut measured = Vec::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        let mut env = cx.env().clone();
        if vertical {
            env.height = None;
        } else {
            env.width = None;
        }
        let buffer = cx.evaluate_with(Some(Segment::Index(index)), env, child);
        match child.flex() {
            Some(min) => measured.push(Measured::Flexible(min)),
            None if buffer.is_empty() => {}
            None => measured.push(Measured::Content(buffer)),
        }
    }
    measured
}

// =============================================================================
// VStack
// =============================================================================

/// Children top to bottom.
#[derive(Debug, Default)]
pub struct VStack {
    children: Vec<AnyView>,
    spacing: usize,
    alignment: HorizontalAlignment,
}

impl VStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(mut self, view: impl View) -> Self {
        self.children.push(AnyView::new(view));
        self
    }

    pub fn children(mut self, views: impl IntoIterator<Item = AnyView>) -> Self {
        self.children.extend(views);
        self
    }

    /// Blank rows between children.
    pub fn spacing(mut self, spacing: usize) -> Self {
        self.spacing = spacing;
        self
    }

    /// Cross-axis placement of narrower children.
    pub fn alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl View for VStack {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let measured = measure(cx, &self.children, true);
        let items: Vec<AxisItem> = measured
            .iter()
            .map(|m| match m {
                Measured::Content(buffer) => AxisItem::Fixed(buffer.height()),
                Measured::Flexible(min) => AxisItem::Flexible { min: *min },
            })
            .collect();
        let lengths = distribute(&items, self.spacing, cx.available_height());

        let mut result = FrameBuffer::new();
        for (m, length) in measured.iter().zip(lengths) {
            match m {
                Measured::Content(buffer) => result.append_vertically(buffer, self.spacing),
                Measured::Flexible(_) => result.append_vertically(
                    &FrameBuffer::from_lines(vec![String::new(); length]),
                    self.spacing,
                ),
            }
        }
        let width = result.width();
        result.align_lines(width, self.alignment);
        Body::render(result)
    }
}

// =============================================================================
// HStack
// =============================================================================

/// Children left to right.
#[derive(Debug, Default)]
pub struct HStack {
    children: Vec<AnyView>,
    spacing: usize,
    alignment: VerticalAlignment,
}

impl HStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(mut self, view: impl View) -> Self {
        self.children.push(AnyView::new(view));
        self
    }

    pub fn children(mut self, views: impl IntoIterator<Item = AnyView>) -> Self {
        self.children.extend(views);
        self
    }

    /// Blank columns between children.
    pub fn spacing(mut self, spacing: usize) -> Self {
        self.spacing = spacing;
        self
    }

    /// Cross-axis placement of shorter children.
    pub fn alignment(mut self, alignment: VerticalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl View for HStack {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let measured = measure(cx, &self.children, false);
        let items: Vec<AxisItem> = measured
            .iter()
            .map(|m| match m {
                Measured::Content(buffer) => AxisItem::Fixed(buffer.width()),
                Measured::Flexible(min) => AxisItem::Flexible { min: *min },
            })
            .collect();
        let lengths = distribute(&items, self.spacing, cx.available_width());

        let gap = FrameBuffer::blank(self.spacing, 1);
        let mut result = FrameBuffer::new();
        for (i, (m, length)) in measured.iter().zip(lengths).enumerate() {
            if i > 0 && self.spacing > 0 {
                result.append_horizontally(&gap, self.alignment);
            }
            match m {
                Measured::Content(buffer) => result.append_horizontally(buffer, self.alignment),
                Measured::Flexible(_) => {
                    result.append_horizontally(&FrameBuffer::blank(length, 1), self.alignment)
                }
            }
        }
        Body::render(result)
    }
}

// =============================================================================
// ZStack
// =============================================================================

/// Children layered on top of the first, placed by `alignment`.
///
/// Later children replace whole lines of earlier ones (see
/// [`FrameBuffer::overlay`]) and are clipped to the first child's bounds.
#[derive(Debug, Default)]
pub struct ZStack {
    children: Vec<AnyView>,
    alignment: Alignment,
}

impl ZStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(mut self, view: impl View) -> Self {
        self.children.push(AnyView::new(view));
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

impl View for ZStack {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let mut layers = self
            .children
            .iter()
            .enumerate()
            .map(|(index, child)| cx.evaluate_child(index, child))
            .collect::<Vec<_>>()
            .into_iter();

        let Some(mut base) = layers.next() else {
            return Body::Empty;
        };
        let width = base.width();
        let height = base.height();
        base.align_lines(width, HorizontalAlignment::Leading);

        let vertical = self.alignment.vertical;
        let horizontal = self.alignment.horizontal;
        for layer in layers {
            let row = offset(
                height,
                layer.height(),
                vertical == VerticalAlignment::Top,
                vertical == VerticalAlignment::Center,
            );
            let column = offset(
                width,
                layer.width(),
                horizontal == HorizontalAlignment::Leading,
                horizontal == HorizontalAlignment::Center,
            );
            // Square off ragged layer lines so the layer covers a rectangle.
            let layer = layer.pad_to(layer.width(), layer.height(), Alignment::TOP_LEADING);
            base.overlay(&layer, row, column);
            base.align_lines(width, HorizontalAlignment::Leading);
        }
        Body::render(base)
    }
}

fn offset(outer: usize, inner: usize, start: bool, center: bool) -> usize {
    let extra = outer.saturating_sub(inner);
    if start {
        0
    } else if center {
        extra / 2
    } else {
        extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::channel;
    use crate::view::{Environment, Session, Spacer, Text, evaluate_root};

    fn render(view: &dyn View, width: usize, height: usize) -> FrameBuffer {
        let (scheduler, _requests) = channel();
        let mut session = Session::new();
        let env = Environment::default().with_size(width, height);
        evaluate_root(view, &mut session, &scheduler, "content", env)
    }

    #[test]
    fn test_vstack_spacing_and_alignment() {
        let view = VStack::new()
            .child(Text::new("a"))
            .child(Text::new("ccc"))
            .spacing(1)
            .alignment(HorizontalAlignment::Trailing);
        let buffer = render(&view, 20, 10);
        assert_eq!(buffer.lines(), &["  a", "   ", "ccc"]);
    }

    #[test]
    fn test_vstack_spacer_fills_height() {
        let view = VStack::new()
            .child(Text::new("top"))
            .child(Spacer::new())
            .child(Text::new("bottom"));
        let buffer = render(&view, 20, 6);
        assert_eq!(buffer.height(), 6);
        assert_eq!(buffer.lines()[0].trim_end(), "top");
        assert_eq!(buffer.lines()[5].trim_end(), "bottom");
    }

    #[test]
    fn test_empty_children_take_no_spacing() {
        let view = VStack::new()
            .child(Text::new("a"))
            .child(crate::view::EmptyView)
            .child(Text::new("b"))
            .spacing(1);
        assert_eq!(render(&view, 20, 10).lines(), &["a", " ", "b"]);
    }

    #[test]
    fn test_hstack_joins_columns() {
        let view = HStack::new()
            .child(Text::new("abc\ndef"))
            .child(Text::new("12345"))
            .spacing(1);
        let buffer = render(&view, 40, 10);
        assert_eq!(buffer.lines(), &["abc 12345", "def      "]);
    }

    #[test]
    fn test_hstack_spacer_pushes_right() {
        let view = HStack::new()
            .child(Text::new("left"))
            .child(Spacer::new())
            .child(Text::new("right"));
        let buffer = render(&view, 20, 1);
        assert_eq!(buffer.width(), 20);
        assert!(buffer.lines()[0].starts_with("left"));
        assert!(buffer.lines()[0].ends_with("right"));
    }

    #[test]
    fn test_zstack_centers_layer() {
        let view = ZStack::new()
            .child(Text::new(".....\n.....\n....."))
            .child(Text::new("X"))
            .alignment(Alignment::CENTER);
        let buffer = render(&view, 20, 10);
        assert_eq!(buffer.lines(), &[".....", "..X  ", "....."]);
    }
}
