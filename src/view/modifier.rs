//! Modifiers - primitives wrapping exactly one content view.
//!
//! Modifiers are applied with the [`ViewExt`] methods and nest outward: in
//! `text.border(BorderStyle::Rounded).focusable()` the focusable node is the
//! parent of the border node. Anything that reads focus (borders, key
//! handlers) has to sit *inside* the `focusable` call to see it.
//!
//! # Example
//!
//! ```ignore
//! Text::new("Save")
//!     .padding(1)
//!     .border(BorderStyle::Rounded)
//!     .on_key(|event| event.key == "Enter")
//!     .focusable()
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::buffer::{Alignment, FrameBuffer};
use crate::lifecycle::{LocalTask, TaskContext};
use crate::registry::{KeyHandler, PreferenceKey, Title};
use crate::runtime::input::KeyboardEvent;
use crate::style::{Color, RESET, Style, encode, fit, pad_right, persist_background};

use super::{AnyView, Body, View, ViewContext};

// =============================================================================
// Border Style
// =============================================================================

/// Box-drawing character set for [`Border`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    /// ─ │ ┌ ┐ └ ┘
    #[default]
    Single,
    /// ═ ║ ╔ ╗ ╚ ╝
    Double,
    /// ─ │ ╭ ╮ ╰ ╯
    Rounded,
    /// ━ ┃ ┏ ┓ ┗ ┛
    Bold,
    /// ┄ ┆ ┌ ┐ └ ┘
    Dashed,
    /// - | + + + +
    Ascii,
}

impl BorderStyle {
    /// Returns: (horizontal, vertical, top_left, top_right, bottom_right, bottom_left)
    pub const fn chars(
        &self,
    ) -> (&'static str, &'static str, &'static str, &'static str, &'static str, &'static str) {
        match self {
            Self::Single => ("─", "│", "┌", "┐", "┘", "└"),
            Self::Double => ("═", "║", "╔", "╗", "╝", "╚"),
            Self::Rounded => ("─", "│", "╭", "╮", "╯", "╰"),
            Self::Bold => ("━", "┃", "┏", "┓", "┛", "┗"),
            Self::Dashed => ("┄", "┆", "┌", "┐", "┘", "└"),
            Self::Ascii => ("-", "|", "+", "+", "+", "+"),
        }
    }
}

/// Plain style when `color` is the terminal default.
fn fg_style(color: Color) -> Style {
    if color.is_default() {
        Style::new()
    } else {
        Style::new().fg(color)
    }
}

// =============================================================================
// Layout modifiers
// =============================================================================

/// Blank cells around the content.
#[derive(Debug)]
pub struct Padding {
    content: AnyView,
    top: usize,
    right: usize,
    bottom: usize,
    left: usize,
}

impl View for Padding {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let mut env = cx.env().clone();
        env.width = env.width.map(|w| w.saturating_sub(self.left + self.right));
        env.height = env.height.map(|h| h.saturating_sub(self.top + self.bottom));
        let inner = cx.evaluate_with(None, env, &self.content);

        let width = inner.width();
        let total = self.left + width + self.right;
        let blank = " ".repeat(total);
        let left = " ".repeat(self.left);
        let right = " ".repeat(self.right);

        let mut lines = Vec::with_capacity(self.top + inner.height() + self.bottom);
        lines.extend(std::iter::repeat_n(blank.clone(), self.top));
        lines.extend(
            inner
                .lines()
                .iter()
                .map(|line| format!("{}{}{}", left, pad_right(line, width), right)),
        );
        lines.extend(std::iter::repeat_n(blank, self.bottom));
        Body::render(FrameBuffer::from_lines(lines))
    }
}

/// Exact size, clipping or padding the content.
#[derive(Debug)]
pub struct Frame {
    content: AnyView,
    width: Option<usize>,
    height: Option<usize>,
    fill: bool,
    alignment: Alignment,
}

impl View for Frame {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let (width, height) = if self.fill {
            (
                self.width.or(cx.available_width()),
                self.height.or(cx.available_height()),
            )
        } else {
            (self.width, self.height)
        };

        let mut env = cx.env().clone();
        env.width = width.or(env.width);
        env.height = height.or(env.height);
        let inner = cx.evaluate_with(None, env, &self.content);

        Body::render(inner.pad_to(
            width.unwrap_or(inner.width()),
            height.unwrap_or(inner.height()),
            self.alignment,
        ))
    }
}

/// Box-drawing border. Uses the palette's focus colour when the nearest
/// focusable ancestor has focus, unless a colour is given.
#[derive(Debug)]
pub struct Border {
    content: AnyView,
    style: BorderStyle,
    color: Option<Color>,
}

impl View for Border {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let mut env = cx.env().clone();
        env.width = env.width.map(|w| w.saturating_sub(2));
        env.height = env.height.map(|h| h.saturating_sub(2));
        let inner = cx.evaluate_with(None, env, &self.content);

        let color = self.color.unwrap_or_else(|| {
            if cx.is_focused() {
                cx.palette().border_focus
            } else {
                cx.palette().border
            }
        });
        let style = fg_style(color);
        let (h, v, tl, tr, br, bl) = self.style.chars();
        let width = inner.width();
        let edge = encode(v, &style);

        let mut lines = Vec::with_capacity(inner.height() + 2);
        lines.push(encode(&format!("{}{}{}", tl, h.repeat(width), tr), &style));
        lines.extend(
            inner
                .lines()
                .iter()
                .map(|line| format!("{}{}{}", edge, fit(line, width), edge)),
        );
        lines.push(encode(&format!("{}{}{}", bl, h.repeat(width), br), &style));
        Body::render(FrameBuffer::from_lines(lines))
    }
}

/// Content with `overlay` laid over it at (`row`, `column`).
#[derive(Debug)]
pub struct Overlay {
    content: AnyView,
    overlay: AnyView,
    row: usize,
    column: usize,
}

impl View for Overlay {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let mut base = cx.evaluate_child(0, &self.content);
        let layer = cx.evaluate_child(1, &self.overlay);
        base.overlay(&layer, self.row, self.column);
        Body::render(base)
    }
}

// =============================================================================
// Style modifiers
// =============================================================================

/// Layers a style over the inherited one for every descendant text.
#[derive(Debug)]
pub struct Styled {
    content: AnyView,
    style: Style,
}

impl View for Styled {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let mut env = cx.env().clone();
        env.style = self.style.merge(&env.style);
        Body::render(cx.evaluate_with(None, env, &self.content))
    }
}

/// Fills the content's bounding box with a background colour, keeping it
/// across embedded resets.
#[derive(Debug)]
pub struct Background {
    content: AnyView,
    color: Color,
}

impl View for Background {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let inner = cx.evaluate(&self.content);
        let background = Style::new().bg(self.color).prologue();
        let width = inner.width();
        Body::render(inner.map_lines(|line| {
            let padded = pad_right(line, width);
            format!(
                "{}{}{}",
                background,
                persist_background(&padded, &background, RESET),
                RESET
            )
        }))
    }
}

// =============================================================================
// Lifecycle modifiers
// =============================================================================

pub struct OnAppear {
    content: AnyView,
    action: Rc<dyn Fn()>,
}

impl View for OnAppear {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let action = self.action.clone();
        cx.on_appear(move || action());
        Body::render(cx.evaluate(&self.content))
    }
}

pub struct OnDisappear {
    content: AnyView,
    action: Rc<dyn Fn()>,
}

impl View for OnDisappear {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let action = self.action.clone();
        cx.on_disappear(move || action());
        Body::render(cx.evaluate(&self.content))
    }
}

/// Starts a background task when the content appears; cancels it when the
/// content leaves the tree.
pub struct Task {
    content: AnyView,
    task: Rc<dyn Fn(TaskContext) -> LocalTask>,
}

impl View for Task {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let task = self.task.clone();
        cx.task(move |ctx| task(ctx));
        Body::render(cx.evaluate(&self.content))
    }
}

// =============================================================================
// Focus & input modifiers
// =============================================================================

/// Joins the focus ring (Tab / Shift+Tab order follows visit order).
#[derive(Debug)]
pub struct Focusable {
    content: AnyView,
}

impl View for Focusable {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let focused = cx.register_focusable();
        let mut env = cx.env().clone();
        env.focus_scope = Some(cx.identity().clone());
        env.focused = focused;
        Body::render(cx.evaluate_with(None, env, &self.content))
    }
}

/// Key handler scoped to the nearest focusable ancestor (global without one).
pub struct OnKey {
    content: AnyView,
    handler: KeyHandler,
}

impl View for OnKey {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        cx.register_key_handler(self.handler.clone());
        Body::render(cx.evaluate(&self.content))
    }
}

/// Publishes a typed value to the runtime for this frame.
pub struct Preference<K: PreferenceKey> {
    content: AnyView,
    value: K::Value,
    _key: PhantomData<K>,
}

impl<K: PreferenceKey> View for Preference<K> {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        cx.set_preference::<K>(self.value.clone());
        Body::render(cx.evaluate(&self.content))
    }
}

// =============================================================================
// ViewExt
// =============================================================================

pub trait ViewExt: View + Sized {
    fn boxed(self) -> AnyView {
        AnyView::new(self)
    }

    fn padding(self, amount: usize) -> Padding {
        self.padding_edges(amount, amount, amount, amount)
    }

    fn padding_edges(self, top: usize, right: usize, bottom: usize, left: usize) -> Padding {
        Padding {
            content: self.boxed(),
            top,
            right,
            bottom,
            left,
        }
    }

    /// Fixed size on the given axes; the other axes keep the content's size.
    fn frame(self, width: Option<usize>, height: Option<usize>, alignment: Alignment) -> Frame {
        Frame {
            content: self.boxed(),
            width,
            height,
            fill: false,
            alignment,
        }
    }

    /// Take all of the available space.
    fn fill(self, alignment: Alignment) -> Frame {
        Frame {
            content: self.boxed(),
            width: None,
            height: None,
            fill: true,
            alignment,
        }
    }

    fn border(self, style: BorderStyle) -> Border {
        Border {
            content: self.boxed(),
            style,
            color: None,
        }
    }

    fn border_color(self, style: BorderStyle, color: Color) -> Border {
        Border {
            content: self.boxed(),
            style,
            color: Some(color),
        }
    }

    fn styled(self, style: Style) -> Styled {
        Styled {
            content: self.boxed(),
            style,
        }
    }

    fn foreground(self, color: Color) -> Styled {
        self.styled(Style::new().fg(color))
    }

    fn bold(self) -> Styled {
        self.styled(Style::new().bold())
    }

    fn dim(self) -> Styled {
        self.styled(Style::new().dim())
    }

    fn italic(self) -> Styled {
        self.styled(Style::new().italic())
    }

    fn underline(self) -> Styled {
        self.styled(Style::new().underline())
    }

    fn strikethrough(self) -> Styled {
        self.styled(Style::new().strikethrough())
    }

    fn background(self, color: Color) -> Background {
        Background {
            content: self.boxed(),
            color,
        }
    }

    fn overlay(self, view: impl View, row: usize, column: usize) -> Overlay {
        Overlay {
            content: self.boxed(),
            overlay: AnyView::new(view),
            row,
            column,
        }
    }

    fn on_appear(self, action: impl Fn() + 'static) -> OnAppear {
        OnAppear {
            content: self.boxed(),
            action: Rc::new(action),
        }
    }

    fn on_disappear(self, action: impl Fn() + 'static) -> OnDisappear {
        OnDisappear {
            content: self.boxed(),
            action: Rc::new(action),
        }
    }

    fn task<F, Fut>(self, task: F) -> Task
    where
        F: Fn(TaskContext) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        Task {
            content: self.boxed(),
            task: Rc::new(move |ctx| Box::pin(task(ctx)) as LocalTask),
        }
    }

    fn focusable(self) -> Focusable {
        Focusable {
            content: self.boxed(),
        }
    }

    fn on_key(self, handler: impl Fn(&KeyboardEvent) -> bool + 'static) -> OnKey {
        OnKey {
            content: self.boxed(),
            handler: Rc::new(handler),
        }
    }

    fn preference<K: PreferenceKey>(self, value: K::Value) -> Preference<K> {
        Preference {
            content: self.boxed(),
            value,
            _key: PhantomData,
        }
    }

    /// Set the terminal window title.
    fn title(self, title: impl Into<String>) -> Preference<Title> {
        self.preference::<Title>(title.into())
    }
}

impl<V: View> ViewExt for V {}

// =============================================================================
// Tests
// =============================================================================
