//! Evaluation context - what a view can see and touch while it evaluates.
//!
//! A [`ViewContext`] carries:
//! - the node's structural [`Identity`]
//! - the ambient [`Environment`] (available size, palette, inherited style,
//!   focus scope), read-only for the node and copied down to children
//! - a mutable borrow of the [`Session`] (state store, lifecycle tracker,
//!   per-frame registries)
//! - the [`SchedulerHandle`] that state writes and tasks report through
//!
//! State declarations are numbered in call order within a node, so a view must
//! declare its state in the same order on every frame.

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use crate::buffer::FrameBuffer;
use crate::identity::{Identity, Segment};
use crate::lifecycle::{Lifecycle, TaskContext};
use crate::registry::{FrameRegistry, HandlerScope, KeyHandler, PreferenceKey};
use crate::runtime::input::KeyboardEvent;
use crate::scheduler::SchedulerHandle;
use crate::state::{State, StateKey, StateStore};
use crate::style::Style;
use crate::theme::Palette;

use super::View;
use super::evaluate::evaluate_node;

// =============================================================================
// Session
// =============================================================================

/// Everything that persists between render passes.
#[derive(Debug, Default)]
pub struct Session {
    pub store: StateStore,
    pub lifecycle: Lifecycle,
    pub registry: FrameRegistry,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a render pass: clear per-frame registries, start liveness tracking.
    pub fn begin_pass(&mut self) {
        self.registry.clear();
        self.store.begin_pass();
        self.lifecycle.begin_pass();
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Ambient values flowing from parent to child.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Columns available to the node, if bounded.
    pub width: Option<usize>,
    /// Rows available to the node, if bounded.
    pub height: Option<usize>,
    pub palette: Rc<Palette>,
    /// Style inherited by text.
    pub style: Style,
    /// Nearest focusable ancestor.
    pub focus_scope: Option<Identity>,
    /// Whether `focus_scope` currently has focus.
    pub focused: bool,
    /// Interval used by [`ViewContext::animate_default`].
    pub animation_interval: Duration,
}

impl Environment {
    pub fn new(palette: Palette) -> Self {
        let style = palette.text_style();
        Self {
            width: None,
            height: None,
            palette: Rc::new(palette),
            style,
            focus_scope: None,
            focused: false,
            animation_interval: Duration::from_millis(100),
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

// =============================================================================
// ViewContext
// =============================================================================

pub struct ViewContext<'a> {
    pub(super) session: &'a mut Session,
    pub(super) scheduler: &'a SchedulerHandle,
    pub(super) identity: Identity,
    pub(super) env: Environment,
    next_state_slot: usize,
    next_task_slot: usize,
}

impl<'a> ViewContext<'a> {
    pub(crate) fn new(
        session: &'a mut Session,
        scheduler: &'a SchedulerHandle,
        identity: Identity,
        env: Environment,
    ) -> Self {
        Self {
            session,
            scheduler,
            identity,
            env,
            next_state_slot: 0,
            next_task_slot: 0,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn palette(&self) -> &Palette {
        &self.env.palette
    }

    pub fn available_width(&self) -> Option<usize> {
        self.env.width
    }

    pub fn available_height(&self) -> Option<usize> {
        self.env.height
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        self.scheduler
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Declare a persistent value, created with `default` on first use.
    pub fn state<T: 'static>(&mut self, default: impl FnOnce() -> T) -> State<T> {
        let slot = self.next_state_slot;
        self.next_state_slot += 1;
        let key = StateKey::new(self.identity.clone(), slot);
        let cell = self.session.store.cell_for_with(key, default);
        State::new(cell, self.scheduler.clone())
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Evaluate the single child of this node.
    pub fn evaluate(&mut self, view: &dyn View) -> FrameBuffer {
        let env = self.env.clone();
        self.evaluate_with(None, env, view)
    }

    /// Evaluate the child at `index` among this node's children.
    pub fn evaluate_child(&mut self, index: usize, view: &dyn View) -> FrameBuffer {
        let env = self.env.clone();
        self.evaluate_with(Some(Segment::Index(index)), env, view)
    }

    /// Evaluate a child identified by a caller key.
    pub fn evaluate_keyed(&mut self, key: impl Into<String>, view: &dyn View) -> FrameBuffer {
        let env = self.env.clone();
        self.evaluate_with(Some(Segment::Key(key.into())), env, view)
    }

    /// Evaluate one arm of a conditional.
    pub fn evaluate_branch(&mut self, branch: bool, view: &dyn View) -> FrameBuffer {
        let env = self.env.clone();
        self.evaluate_with(Some(Segment::Branch(branch)), env, view)
    }

    /// Evaluate a child with an explicit identity segment and environment.
    pub fn evaluate_with(
        &mut self,
        segment: Option<Segment>,
        env: Environment,
        view: &dyn View,
    ) -> FrameBuffer {
        let base = match segment {
            Some(segment) => self.identity.child(segment),
            None => self.identity.clone(),
        };
        evaluate_node(view, &mut *self.session, self.scheduler, base, env)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Run `action` after the pass in which this node first appears.
    pub fn on_appear(&mut self, action: impl FnOnce() + 'static) {
        self.session.lifecycle.on_appear(&self.identity, action);
    }

    /// Run `action` once this node leaves the tree.
    pub fn on_disappear(&mut self, action: impl FnOnce() + 'static) {
        self.session.lifecycle.on_disappear(&self.identity, action);
    }

    /// Start a background task tied to this node (started once, cancelled
    /// when the node leaves the tree).
    pub fn task<F, Fut>(&mut self, task: F)
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let slot = self.next_task_slot;
        self.next_task_slot += 1;
        self.session
            .lifecycle
            .spawn(&self.identity, slot, self.scheduler, task);
    }

    /// Frame index of an animation ticking every `interval`.
    ///
    /// The first call starts a background ticker that requests a frame on
    /// every tick until this node leaves the tree.
    pub fn animate(&mut self, interval: Duration) -> u64 {
        let slot = self.next_task_slot;
        self.next_task_slot += 1;
        self.session
            .lifecycle
            .animation_frame(&self.identity, slot, interval, self.scheduler)
    }

    /// [`animate`](Self::animate) at the configured default interval.
    pub fn animate_default(&mut self) -> u64 {
        let interval = self.env.animation_interval;
        self.animate(interval)
    }

    // =========================================================================
    // Focus & Input
    // =========================================================================

    /// Add this node to the focus ring. Returns whether it has focus.
    pub fn register_focusable(&mut self) -> bool {
        self.session.registry.register_focusable(self.identity.clone());
        self.session.registry.is_focused(&self.identity)
    }

    /// Whether the nearest focusable ancestor has focus.
    pub fn is_focused(&self) -> bool {
        self.env.focused
    }

    /// Register a key handler scoped to the nearest focusable ancestor, or
    /// global if there is none.
    pub fn on_key(&mut self, handler: impl Fn(&KeyboardEvent) -> bool + 'static) {
        self.register_key_handler(Rc::new(handler));
    }

    pub fn register_key_handler(&mut self, handler: KeyHandler) {
        let scope = match &self.env.focus_scope {
            Some(identity) => HandlerScope::Focused(identity.clone()),
            None => HandlerScope::Global,
        };
        self.session.registry.register_handler(scope, handler);
    }

    /// Register a handler that runs regardless of focus.
    pub fn on_global_key(&mut self, handler: impl Fn(&KeyboardEvent) -> bool + 'static) {
        self.session
            .registry
            .register_handler(HandlerScope::Global, Rc::new(handler));
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    pub fn set_preference<K: PreferenceKey>(&mut self, value: K::Value) {
        self.session.registry.set_preference::<K>(value);
    }
}
