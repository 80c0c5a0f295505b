//! Control flow - If, ForEach, Animated.
//!
//! Each construct gives its children identity segments that describe *why*
//! they are there (which branch, which item) instead of *where* they are, so
//! state stays with the right thing when the tree changes shape.

use std::time::Duration;

use crate::buffer::FrameBuffer;

use super::{AnyView, Body, View, ViewContext};

// =============================================================================
// If
// =============================================================================

/// Conditional content. The two arms never share identity, so switching
/// branches drops the state of the arm that left.
#[derive(Debug)]
pub struct If {
    condition: bool,
    then: AnyView,
    otherwise: Option<AnyView>,
}

impl If {
    pub fn new(condition: bool, then: impl View) -> Self {
        Self {
            condition,
            then: AnyView::new(then),
            otherwise: None,
        }
    }

    pub fn otherwise(mut self, view: impl View) -> Self {
        self.otherwise = Some(AnyView::new(view));
        self
    }
}

impl View for If {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let arm = if self.condition {
            Some(&self.then)
        } else {
            self.otherwise.as_ref()
        };
        match arm {
            Some(view) => Body::render(cx.evaluate_branch(self.condition, view)),
            None => Body::Empty,
        }
    }
}

// =============================================================================
// ForEach
// =============================================================================

/// Keyed rows, top to bottom.
///
/// Identities follow keys, not positions: reordering the items moves each
/// row's state with it. Keys must be unique among siblings.
#[derive(Debug, Default)]
pub struct ForEach {
    rows: Vec<(String, AnyView)>,
    spacing: usize,
}

impl ForEach {
    pub fn new<I, T, K, F, V>(items: I, key: K, content: F) -> Self
    where
        I: IntoIterator<Item = T>,
        K: Fn(&T) -> String,
        F: Fn(T) -> V,
        V: View,
    {
        let rows = items
            .into_iter()
            .map(|item| (key(&item), AnyView::new(content(item))))
            .collect();
        Self { rows, spacing: 0 }
    }

    pub fn spacing(mut self, spacing: usize) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl View for ForEach {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let mut result = FrameBuffer::new();
        for (key, view) in &self.rows {
            let buffer = cx.evaluate_keyed(key.clone(), view);
            result.append_vertically(&buffer, self.spacing);
        }
        Body::render(result)
    }
}

// =============================================================================
// Animated
// =============================================================================

/// Content rebuilt from a frame counter that advances every `interval`.
///
/// The ticker starts when the view appears and stops when it leaves the
/// tree.
pub struct Animated {
    interval: Option<Duration>,
    content: Box<dyn Fn(u64) -> AnyView>,
}

impl Animated {
    pub fn new<V: View>(interval: Duration, content: impl Fn(u64) -> V + 'static) -> Self {
        Self {
            interval: Some(interval),
            content: Box::new(move |frame| AnyView::new(content(frame))),
        }
    }

    /// Tick at the runtime's configured animation interval.
    pub fn with_default_interval<V: View>(content: impl Fn(u64) -> V + 'static) -> Self {
        Self {
            interval: None,
            content: Box::new(move |frame| AnyView::new(content(frame))),
        }
    }
}

impl View for Animated {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let frame = match self.interval {
            Some(interval) => cx.animate(interval),
            None => cx.animate_default(),
        };
        Body::Expanded((self.content)(frame))
    }
}

impl std::fmt::Debug for Animated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animated")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::scheduler::channel;
    use crate::state::State;
    use crate::view::{Environment, Session, Text, evaluate_root};

    /// Row holding one persistent string, seeded from its label.
    struct Row {
        label: String,
        handles: Rc<RefCell<Vec<State<String>>>>,
    }

    impl View for Row {
        fn body(&self, cx: &mut ViewContext<'_>) -> Body {
            let label = self.label.clone();
            let memo = cx.state(move || label);
            self.handles.borrow_mut().push(memo.clone());
            Body::expand(Text::new(format!("{}={}", self.label, memo.get())))
        }
    }

    fn pass(session: &mut Session, view: &dyn View) -> FrameBuffer {
        let (scheduler, _requests) = channel();
        session.begin_pass();
        let buffer = evaluate_root(view, session, &scheduler, "content", Environment::default());
        session.store.end_pass();
        session.lifecycle.end_pass();
        buffer
    }

    #[test]
    fn test_if_renders_active_arm() {
        let mut session = Session::new();
        let view = If::new(false, Text::new("yes")).otherwise(Text::new("no"));
        assert_eq!(pass(&mut session, &view).lines(), &["no"]);
        assert!(pass(&mut session, &If::new(false, Text::new("yes"))).is_empty());
    }

    #[test]
    fn test_for_each_state_follows_keys() {
        let handles: Rc<RefCell<Vec<State<String>>>> = Rc::default();
        let build = |items: &[&'static str]| {
            let handles = handles.clone();
            ForEach::new(items.to_vec(), |s| s.to_string(), move |s| Row {
                label: s.to_string(),
                handles: handles.clone(),
            })
        };

        let mut session = Session::new();
        pass(&mut session, &build(&["a", "b"]));
        let first: Vec<_> = handles.borrow_mut().drain(..).collect();
        first[0].set("edited".into());

        let buffer = pass(&mut session, &build(&["b", "a"]));
        assert_eq!(buffer.lines(), &["b=b", "a=edited"]);
    }

    #[test]
    fn test_for_each_removed_key_collected() {
        let handles: Rc<RefCell<Vec<State<String>>>> = Rc::default();
        let build = |items: &[&'static str]| {
            let handles = handles.clone();
            ForEach::new(items.to_vec(), |s| s.to_string(), move |s| Row {
                label: s.to_string(),
                handles: handles.clone(),
            })
        };

        let mut session = Session::new();
        pass(&mut session, &build(&["a", "b", "c"]));
        assert_eq!(session.store.len(), 3);
        pass(&mut session, &build(&["a", "c"]));
        assert_eq!(session.store.len(), 2);
    }

    #[test]
    fn test_animated_starts_one_ticker() {
        let mut session = Session::new();
        let view = || Animated::new(Duration::from_millis(50), |frame| Text::new(format!("f{}", frame)));

        assert_eq!(pass(&mut session, &view()).lines(), &["f0"]);
        pass(&mut session, &view());
        assert_eq!(session.lifecycle.take_pending_tasks().len(), 1);
        assert_eq!(session.lifecycle.len(), 1);

        pass(&mut session, &EmptyAfter);
        assert!(session.lifecycle.is_empty());
    }

    struct EmptyAfter;

    impl View for EmptyAfter {
        fn body(&self, _cx: &mut ViewContext<'_>) -> Body {
            Body::Empty
        }
    }
}
