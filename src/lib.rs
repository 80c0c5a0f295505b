//! # spark-view
//!
//! Declarative Terminal UI Runtime for Rust.
//!
//! Application code describes a tree of views; every tick the runtime
//! evaluates that tree into a [`FrameBuffer`](buffer::FrameBuffer) of styled
//! lines and writes only the rows that changed.
//!
//! ## Architecture
//!
//! ```text
//! View tree → evaluate (identity + state) → FrameBuffer → output lines → row diff → terminal
//! ```
//!
//! Views are rebuilt from scratch every frame. State survives because it is
//! keyed by *structural identity*: the path of view types, child indices,
//! branch tags and item keys from the root. A cell whose identity is not
//! visited during a pass is garbage-collected at the end of that pass.
//!
//! ## Modules
//!
//! - [`style`] - Colors, attributes, control-sequence encoding and width accounting
//! - [`theme`] - Semantic palettes
//! - [`buffer`] - Frame buffer and compositing
//! - [`identity`] / [`state`] - Structural identity and the state store
//! - [`lifecycle`] - Appear/disappear notifications and background tasks
//! - [`registry`] - Per-frame focus ring, key handlers, preferences
//! - [`view`] - The `View` trait, evaluator, primitives and modifiers
//! - [`renderer`] - Line diff writer and terminal setup
//! - [`runtime`] - The render loop
//!
//! ## Example
//!
//! ```rust
//! use spark_view::prelude::*;
//!
//! struct Hello;
//!
//! impl View for Hello {
//!     fn body(&self, cx: &mut ViewContext<'_>) -> Body {
//!         let count = cx.state(|| 0u32);
//!         Body::expand(
//!             VStack::new()
//!                 .child(Text::new("hello").bold())
//!                 .child(Text::new(format!("count: {}", count.get()))),
//!         )
//!     }
//! }
//!
//! let mut runtime = Runtime::new(RuntimeConfig::default(), Vec::new(), (20, 4)).unwrap();
//! let stats = runtime.tick(&Hello, None).unwrap();
//! assert_eq!(stats.content.rows_written, 4);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod identity;
pub mod layout;
pub mod lifecycle;
pub mod registry;
pub mod renderer;
pub mod runtime;
pub mod scheduler;
pub mod state;
pub mod style;
pub mod theme;
pub mod view;

pub use error::{Error, Result};
pub use runtime::{run, run_local};

/// Everything an application usually needs.
pub mod prelude {
    pub use crate::buffer::{Alignment, FrameBuffer, HorizontalAlignment, VerticalAlignment};
    pub use crate::config::RuntimeConfig;
    pub use crate::lifecycle::TaskContext;
    pub use crate::registry::{PreferenceKey, Title};
    pub use crate::runtime::input::{KeyboardEvent, Modifiers};
    pub use crate::runtime::{PassStats, Runtime, run};
    pub use crate::scheduler::SchedulerHandle;
    pub use crate::state::State;
    pub use crate::style::{Attr, Color, Style};
    pub use crate::theme::Palette;
    pub use crate::view::{
        Animated, AnyView, Body, BorderStyle, EmptyView, ForEach, HStack, If, Spacer, Text,
        VStack, View, ViewContext, ViewExt, ZStack,
    };
}
