//! Per-frame registries - focus ring, key handlers, preferences.
//!
//! Everything here is rebuilt from scratch on every render pass: the runtime
//! calls [`FrameRegistry::clear`] before evaluating and views re-register as
//! they are visited. The one thing that persists is *which* identity has
//! focus; it is dropped once that identity is no longer in the ring.
//!
//! # Dispatch order
//!
//! 1. handlers scoped to the focused identity or to an enclosing focusable,
//!    innermost first, most recently registered first within one identity
//! 2. global handlers, most recently registered first
//!
//! A handler returning `true` consumes the event.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::identity::Identity;
use crate::runtime::input::KeyboardEvent;

/// Handler for keyboard events. Return true to consume the event.
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent) -> bool>;

/// Where a key handler listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerScope {
    /// Always dispatched (after focused handlers).
    Global,
    /// Dispatched while this identity or one of its descendants has focus.
    Focused(Identity),
}

// =============================================================================
// Preferences
// =============================================================================

/// A typed value flowing from views up to the runtime. Last writer wins.
pub trait PreferenceKey: 'static {
    type Value: Clone + 'static;
}

/// Terminal window title.
pub struct Title;

impl PreferenceKey for Title {
    type Value = String;
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Default)]
pub struct FrameRegistry {
    focus_ring: Vec<Identity>,
    focused: Option<Identity>,
    handlers: Vec<(HandlerScope, KeyHandler)>,
    preferences: HashMap<TypeId, Box<dyn Any>>,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything registered by the previous pass. Focus is kept.
    pub fn clear(&mut self) {
        self.focus_ring.clear();
        self.handlers.clear();
        self.preferences.clear();
    }

    /// Drop focus if the focused identity did not register this pass.
    pub fn finish_pass(&mut self) {
        let lost = self
            .focused
            .as_ref()
            .is_some_and(|focused| !self.focus_ring.contains(focused));
        if lost {
            trace!(identity = ?self.focused, "focus lost");
            self.focused = None;
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Add `identity` to the focus ring (visit order).
    pub fn register_focusable(&mut self, identity: Identity) {
        if !self.focus_ring.contains(&identity) {
            self.focus_ring.push(identity);
        }
    }

    /// Focusable identities in visit order.
    pub fn focus_ring(&self) -> &[Identity] {
        &self.focus_ring
    }

    pub fn focused(&self) -> Option<&Identity> {
        self.focused.as_ref()
    }

    pub fn is_focused(&self, identity: &Identity) -> bool {
        self.focused.as_ref() == Some(identity)
    }

    /// Focus `identity` if it is in the ring. Returns whether focus changed.
    pub fn focus(&mut self, identity: &Identity) -> bool {
        if self.is_focused(identity) || !self.focus_ring.contains(identity) {
            return false;
        }
        self.focused = Some(identity.clone());
        true
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Move focus forward (wrapping). Returns whether focus changed.
    pub fn focus_next(&mut self) -> bool {
        self.cycle(1)
    }

    /// Move focus backward (wrapping). Returns whether focus changed.
    pub fn focus_previous(&mut self) -> bool {
        self.cycle(-1)
    }

    fn cycle(&mut self, direction: isize) -> bool {
        let len = self.focus_ring.len();
        if len == 0 {
            return false;
        }
        let current = self
            .focused
            .as_ref()
            .and_then(|f| self.focus_ring.iter().position(|i| i == f));
        let next = match current {
            Some(i) => (i as isize + direction).rem_euclid(len as isize) as usize,
            None if direction >= 0 => 0,
            None => len - 1,
        };
        let target = self.focus_ring[next].clone();
        let changed = self.focused.as_ref() != Some(&target);
        self.focused = Some(target);
        changed
    }

    // =========================================================================
    // Key handlers
    // =========================================================================

    pub fn register_handler(&mut self, scope: HandlerScope, handler: KeyHandler) {
        self.handlers.push((scope, handler));
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Route `event` through the handlers. Returns true if consumed.
    pub fn dispatch(&self, event: &KeyboardEvent) -> bool {
        if let Some(focused) = &self.focused {
            let mut chain: Vec<(usize, usize, &KeyHandler)> = self
                .handlers
                .iter()
                .enumerate()
                .filter_map(|(index, (scope, handler))| match scope {
                    HandlerScope::Focused(owner) if focused.starts_with(owner) => {
                        Some((owner.depth(), index, handler))
                    }
                    _ => None,
                })
                .collect();
            chain.sort_unstable_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));

            for (_, _, handler) in chain {
                if handler(event) {
                    return true;
                }
            }
        }
        for (scope, handler) in self.handlers.iter().rev() {
            if *scope == HandlerScope::Global && handler(event) {
                return true;
            }
        }
        false
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    pub fn set_preference<K: PreferenceKey>(&mut self, value: K::Value) {
        self.preferences.insert(TypeId::of::<K>(), Box::new(value));
    }

    pub fn preference<K: PreferenceKey>(&self) -> Option<K::Value> {
        self.preferences
            .get(&TypeId::of::<K>())
            .and_then(|v| v.downcast_ref::<K::Value>())
            .cloned()
    }
}

impl std::fmt::Debug for FrameRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRegistry")
            .field("focus_ring", &self.focus_ring)
            .field("focused", &self.focused)
            .field("handlers", &self.handlers.len())
            .field("preferences", &self.preferences.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Segment;
    use std::cell::RefCell;

    fn id(i: usize) -> Identity {
        Identity::region("content").child(Segment::Index(i))
    }

    #[test]
    fn test_focus_cycles_and_wraps() {
        let mut reg = FrameRegistry::new();
        for i in 0..3 {
            reg.register_focusable(id(i));
        }

        assert!(reg.focus_next());
        assert!(reg.is_focused(&id(0)));
        reg.focus_next();
        reg.focus_next();
        assert!(reg.is_focused(&id(2)));
        reg.focus_next();
        assert!(reg.is_focused(&id(0)));
        reg.focus_previous();
        assert!(reg.is_focused(&id(2)));
    }

    #[test]
    fn test_shift_tab_from_nothing_goes_last() {
        let mut reg = FrameRegistry::new();
        reg.register_focusable(id(0));
        reg.register_focusable(id(1));
        reg.focus_previous();
        assert!(reg.is_focused(&id(1)));
    }

    #[test]
    fn test_focus_survives_clear_but_not_absence() {
        let mut reg = FrameRegistry::new();
        reg.register_focusable(id(0));
        reg.register_focusable(id(1));
        reg.focus(&id(1));

        reg.clear();
        reg.register_focusable(id(0));
        reg.register_focusable(id(1));
        reg.finish_pass();
        assert!(reg.is_focused(&id(1)));

        reg.clear();
        reg.register_focusable(id(0));
        reg.finish_pass();
        assert!(reg.focused().is_none());
    }

    #[test]
    fn test_dispatch_order() {
        let mut reg = FrameRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let push = |name: &'static str, consume: bool| -> KeyHandler {
            let log = log.clone();
            Rc::new(move |_event: &KeyboardEvent| {
                log.borrow_mut().push(name);
                consume
            })
        };

        reg.register_focusable(id(0));
        reg.focus(&id(0));
        reg.register_handler(HandlerScope::Global, push("global-1", false));
        reg.register_handler(HandlerScope::Focused(id(0)), push("outer", false));
        reg.register_handler(HandlerScope::Focused(id(0)), push("inner", false));
        reg.register_handler(HandlerScope::Focused(id(1)), push("unfocused", true));
        reg.register_handler(HandlerScope::Global, push("global-2", false));

        assert!(!reg.dispatch(&KeyboardEvent::new("x")));
        assert_eq!(*log.borrow(), vec!["inner", "outer", "global-2", "global-1"]);
    }

    #[test]
    fn test_enclosing_focusable_handler_runs() {
        let mut reg = FrameRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let push = |name: &'static str| -> KeyHandler {
            let log = log.clone();
            Rc::new(move |_event: &KeyboardEvent| {
                log.borrow_mut().push(name);
                false
            })
        };

        let outer = id(0);
        let inner = outer.child(Segment::Index(1));
        let sibling = id(1).child(Segment::Index(1));

        reg.register_focusable(outer.clone());
        reg.register_focusable(inner.clone());
        reg.focus(&inner);
        reg.register_handler(HandlerScope::Focused(outer.clone()), push("outer"));
        reg.register_handler(HandlerScope::Focused(inner.clone()), push("inner"));
        reg.register_handler(HandlerScope::Focused(sibling), push("sibling"));

        assert!(!reg.dispatch(&KeyboardEvent::new("x")));
        assert_eq!(*log.borrow(), vec!["inner", "outer"]);

        log.borrow_mut().clear();
        reg.focus(&outer);
        assert!(!reg.dispatch(&KeyboardEvent::new("x")));
        assert_eq!(*log.borrow(), vec!["outer"]);
    }

    #[test]
    fn test_consumed_event_stops() {
        let mut reg = FrameRegistry::new();
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        reg.register_handler(HandlerScope::Global, Rc::new(move |_: &KeyboardEvent| {
            *h.borrow_mut() += 1;
            false
        }));
        reg.register_handler(HandlerScope::Global, Rc::new(|e: &KeyboardEvent| e.key == "q"));

        assert!(reg.dispatch(&KeyboardEvent::new("q")));
        assert_eq!(*hits.borrow(), 0);
        assert!(!reg.dispatch(&KeyboardEvent::new("w")));
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_preferences_last_writer_wins() {
        let mut reg = FrameRegistry::new();
        assert_eq!(reg.preference::<Title>(), None);
        reg.set_preference::<Title>("outer".into());
        reg.set_preference::<Title>("inner".into());
        assert_eq!(reg.preference::<Title>().as_deref(), Some("inner"));

        reg.clear();
        assert_eq!(reg.preference::<Title>(), None);
    }
}
