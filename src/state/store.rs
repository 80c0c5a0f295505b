//! State Store - identity-keyed persistent cells with liveness GC.
//!
//! Each render pass opens a liveness window with [`StateStore::begin_pass`],
//! the evaluator calls [`StateStore::mark_live`] for every node it visits, and
//! [`StateStore::end_pass`] drops every cell whose owning identity was not
//! visited. A cell's value is never reset just because the descriptor that
//! declared it was rebuilt; only `end_pass` destroys it.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::identity::Identity;

/// A shared mutable box holding one persistent value.
pub type SharedCell<T> = Rc<RefCell<T>>;

/// Cell address: the declaring node plus its declaration-order slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub identity: Identity,
    pub slot: usize,
}

impl StateKey {
    pub fn new(identity: Identity, slot: usize) -> Self {
        Self { identity, slot }
    }
}

/// Arena of persistent cells.
#[derive(Default)]
pub struct StateStore {
    cells: HashMap<StateKey, Rc<dyn Any>>,
    live: HashSet<Identity>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing cell for `key`, or a new one holding `default`.
    pub fn cell_for<T: 'static>(&mut self, key: StateKey, default: T) -> SharedCell<T> {
        self.cell_for_with(key, || default)
    }

    /// Like [`cell_for`](Self::cell_for), building the default lazily.
    ///
    /// If the slot holds a value of a different type (the node now declares
    /// its state in a different order), the old cell is replaced.
    pub fn cell_for_with<T: 'static>(
        &mut self,
        key: StateKey,
        default: impl FnOnce() -> T,
    ) -> SharedCell<T> {
        if let Some(existing) = self.cells.get(&key) {
            match Rc::clone(existing).downcast::<RefCell<T>>() {
                Ok(cell) => return cell,
                Err(_) => debug!(identity = %key.identity, slot = key.slot, "state slot changed type"),
            }
        }

        trace!(identity = %key.identity, slot = key.slot, "state cell created");
        let cell: SharedCell<T> = Rc::new(RefCell::new(default()));
        self.cells.insert(key, Rc::clone(&cell) as Rc<dyn Any>);
        cell
    }

    /// Open a new liveness window. Stored values are untouched.
    pub fn begin_pass(&mut self) {
        self.live.clear();
    }

    /// Record that `identity` was visited this pass.
    pub fn mark_live(&mut self, identity: &Identity) {
        if !self.live.contains(identity) {
            self.live.insert(identity.clone());
        }
    }

    /// True if `identity` has been visited since the last `begin_pass`.
    pub fn is_live(&self, identity: &Identity) -> bool {
        self.live.contains(identity)
    }

    /// Close the window, removing every cell whose identity was not visited.
    ///
    /// Returns the number of cells collected.
    pub fn end_pass(&mut self) -> usize {
        let before = self.cells.len();
        let live = &self.live;
        self.cells.retain(|key, _| live.contains(&key.identity));
        let collected = before - self.cells.len();
        if collected > 0 {
            debug!(collected, remaining = self.cells.len(), "state cells collected");
        }
        collected
    }

    /// True if a cell exists for `key`.
    pub fn contains(&self, key: &StateKey) -> bool {
        self.cells.contains_key(key)
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("cells", &self.cells.len())
            .field("live", &self.live.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Segment;

    fn id(name: &'static str) -> Identity {
        Identity::region("content").child(Segment::Type(name))
    }

    #[test]
    fn test_cell_for_reuses_existing() {
        let mut store = StateStore::new();
        let key = StateKey::new(id("Counter"), 0);

        let cell = store.cell_for(key.clone(), 0_i32);
        *cell.borrow_mut() = 7;

        let again = store.cell_for(key, 0_i32);
        assert_eq!(*again.borrow(), 7);
        assert!(Rc::ptr_eq(&cell, &again));
    }

    #[test]
    fn test_slots_are_independent() {
        let mut store = StateStore::new();
        let a = store.cell_for(StateKey::new(id("Form"), 0), String::from("a"));
        let b = store.cell_for(StateKey::new(id("Form"), 1), String::from("b"));
        assert_eq!(*a.borrow(), "a");
        assert_eq!(*b.borrow(), "b");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_end_pass_collects_unvisited() {
        let mut store = StateStore::new();
        let kept = StateKey::new(id("Kept"), 0);
        let dropped = StateKey::new(id("Dropped"), 0);

        store.begin_pass();
        store.mark_live(&kept.identity);
        store.mark_live(&dropped.identity);
        *store.cell_for(kept.clone(), 0_u8).borrow_mut() = 1;
        *store.cell_for(dropped.clone(), 0_u8).borrow_mut() = 1;
        assert_eq!(store.end_pass(), 0);

        store.begin_pass();
        store.mark_live(&kept.identity);
        assert_eq!(store.end_pass(), 1);

        assert!(store.contains(&kept));
        assert!(!store.contains(&dropped));

        let fresh = store.cell_for(dropped, 0_u8);
        assert_eq!(*fresh.borrow(), 0);
    }

    #[test]
    fn test_type_change_replaces_cell() {
        let mut store = StateStore::new();
        let key = StateKey::new(id("Shifty"), 0);
        *store.cell_for(key.clone(), 5_i32).borrow_mut() = 9;

        let text = store.cell_for(key.clone(), String::from("fresh"));
        assert_eq!(*text.borrow(), "fresh");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lazy_default_not_built_when_present() {
        let mut store = StateStore::new();
        let key = StateKey::new(id("Lazy"), 0);
        store.cell_for(key.clone(), 1_u32);

        let cell = store.cell_for_with(key, || -> u32 { panic!("default rebuilt") });
        assert_eq!(*cell.borrow(), 1);
    }
}
