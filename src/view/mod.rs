//! Views - declarative descriptors and the tree evaluator.
//!
//! A [`View`] is an immutable value describing what to show. It is rebuilt
//! every frame and carries no identity of its own. Evaluating it produces a
//! [`Body`]: either a frame buffer (primitive node) or another view to
//! evaluate in its place (composite node).
//!
//! # Example
//!
//! ```ignore
//! use spark_view::prelude::*;
//!
//! struct Counter;
//!
//! impl View for Counter {
//!     fn body(&self, cx: &mut ViewContext<'_>) -> Body {
//!         let count = cx.state(|| 0_u32);
//!         Body::expand(
//!             VStack::new()
//!                 .child(Text::new(format!("count: {}", count.get())).bold())
//!                 .child(Text::new("press + to increment").foreground(Color::GRAY)),
//!         )
//!     }
//! }
//! ```

mod context;
mod control;
mod evaluate;
mod modifier;
mod stack;
mod text;

pub use context::*;
pub use control::*;
pub use evaluate::*;
pub use modifier::*;
pub use stack::*;
pub use text::*;

use crate::buffer::FrameBuffer;

// =============================================================================
// View
// =============================================================================

/// A view descriptor.
pub trait View: 'static {
    /// Render directly or expand into a child descriptor.
    fn body(&self, cx: &mut ViewContext<'_>) -> Body;

    /// Name used as this node's identity segment.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Minimum length for views that grow into leftover stack space.
    fn flex(&self) -> Option<usize> {
        None
    }
}

/// Result of evaluating one node.
pub enum Body {
    /// Primitive: the node rendered itself.
    Rendered(FrameBuffer),
    /// Composite: evaluate this view in the node's place.
    Expanded(AnyView),
    /// Dead end.
    Empty,
}

impl Body {
    pub fn expand(view: impl View) -> Self {
        Body::Expanded(AnyView::new(view))
    }

    pub fn render(buffer: FrameBuffer) -> Self {
        Body::Rendered(buffer)
    }
}

/// `"a::b::Name<c::D>"` -> `"Name"`.
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// =============================================================================
// AnyView
// =============================================================================

/// A type-erased view.
pub struct AnyView(Box<dyn View>);

impl AnyView {
    pub fn new(view: impl View) -> Self {
        Self(Box::new(view))
    }
}

impl View for AnyView {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        self.0.body(cx)
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn flex(&self) -> Option<usize> {
        self.0.flex()
    }
}

impl std::fmt::Debug for AnyView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnyView({})", self.name())
    }
}
