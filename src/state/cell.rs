//! State handle - what a view holds for one persistent value.
//!
//! A [`State`] references (never owns) a cell in the store. Reading is free;
//! every write sends [`RenderRequest::StateChanged`] through the scheduler
//! handle so the run loop renders a new frame.
//!
//! # Example
//!
//! ```ignore
//! fn body(&self, cx: &mut ViewContext<'_>) -> Body {
//!     let count = cx.state(|| 0_u32);
//!     cx.on_key(move |event| {
//!         if event.key == "+" {
//!             count.update(|n| *n += 1);
//!             return true;
//!         }
//!         false
//!     });
//!     Body::expand(Text::new(format!("count = {}", count.get())))
//! }
//! ```

use std::fmt;

use super::SharedCell;
use crate::scheduler::{RenderRequest, SchedulerHandle};

/// Handle to a persistent value.
pub struct State<T> {
    cell: SharedCell<T>,
    scheduler: SchedulerHandle,
}

impl<T> State<T> {
    pub(crate) fn new(cell: SharedCell<T>, scheduler: SchedulerHandle) -> Self {
        Self { cell, scheduler }
    }

    /// Replace the value and request a rerender.
    pub fn set(&self, value: T) {
        *self.cell.borrow_mut() = value;
        self.scheduler.request(RenderRequest::StateChanged);
    }

    /// Mutate in place and request a rerender.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.cell.borrow_mut());
        self.scheduler.request(RenderRequest::StateChanged);
    }

    /// Read through a borrow.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    /// True if both handles point at the same cell.
    pub fn same_cell(&self, other: &State<T>) -> bool {
        std::rc::Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: Clone> State<T> {
    /// Current value.
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("State").field(&self.cell.borrow()).finish()
    }
}
