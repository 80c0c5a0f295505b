//! Tree evaluation.
//!
//! For each node: extend the identity path by the node's type name, mark the
//! identity live, and hand the node a context bound to that identity. A
//! primitive node returns its frame buffer; a composite node returns a child
//! descriptor, which is evaluated in turn beneath the composite's identity.
//! State declared while the composite computes its expansion therefore binds
//! to the composite, and state declared by the child binds one level deeper.
//!
//! Expansion is assumed finite and acyclic.

use tracing::trace;

use crate::buffer::FrameBuffer;
use crate::identity::{Identity, Segment};
use crate::scheduler::SchedulerHandle;

use super::{Body, Environment, Session, View, ViewContext};

pub(crate) fn evaluate_node(
    view: &dyn View,
    session: &mut Session,
    scheduler: &SchedulerHandle,
    base: Identity,
    env: Environment,
) -> FrameBuffer {
    let identity = base.child(Segment::Type(view.name()));
    session.store.mark_live(&identity);
    trace!(identity = %identity, "evaluate");

    let mut cx = ViewContext::new(session, scheduler, identity, env);
    match view.body(&mut cx) {
        Body::Rendered(buffer) => buffer,
        Body::Expanded(child) => cx.evaluate(&child),
        Body::Empty => FrameBuffer::new(),
    }
}

/// Evaluate `view` as the root of the region called `region`.
pub fn evaluate_root(
    view: &dyn View,
    session: &mut Session,
    scheduler: &SchedulerHandle,
    region: &'static str,
    env: Environment,
) -> FrameBuffer {
    evaluate_node(view, session, scheduler, Identity::region(region), env)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::scheduler::channel;
    use crate::state::State;
    use crate::view::{AnyView, EmptyView, If, Text, VStack};

    type Log = Rc<RefCell<Vec<Identity>>>;

    /// Records its identity and renders its label.
    struct Probe {
        label: &'static str,
        log: Log,
    }

    impl View for Probe {
        fn body(&self, cx: &mut ViewContext<'_>) -> Body {
            self.log.borrow_mut().push(cx.identity().clone());
            Body::render(FrameBuffer::from_lines([self.label]))
        }
    }

    /// Composite holding one counter.
    struct Counter {
        seen: Rc<RefCell<Option<State<i32>>>>,
    }

    impl View for Counter {
        fn body(&self, cx: &mut ViewContext<'_>) -> Body {
            let count = cx.state(|| 0);
            let text = format!("count {}", count.get());
            *self.seen.borrow_mut() = Some(count);
            Body::expand(Text::new(text))
        }
    }

    fn pass(session: &mut Session, view: &dyn View) -> FrameBuffer {
        let (scheduler, _requests) = channel();
        session.begin_pass();
        let buffer = evaluate_root(view, session, &scheduler, "content", Environment::default());
        session.store.end_pass();
        buffer
    }

    #[test]
    fn test_identities_stable_and_distinct() {
        let log: Log = Rc::default();
        let build = || {
            VStack::new()
                .child(Probe { label: "a", log: log.clone() })
                .child(Probe { label: "b", log: log.clone() })
        };

        let mut session = Session::new();
        pass(&mut session, &build());
        let first = log.borrow_mut().drain(..).collect::<Vec<_>>();
        pass(&mut session, &build());
        let second = log.borrow_mut().drain(..).collect::<Vec<_>>();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
    }

    #[test]
    fn test_branches_get_distinct_identities() {
        let log: Log = Rc::default();
        let mut session = Session::new();

        for condition in [true, false] {
            let view = If::new(
                condition,
                Probe { label: "x", log: log.clone() },
            )
            .otherwise(Probe { label: "x", log: log.clone() });
            pass(&mut session, &view);
        }

        let ids = log.borrow();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_state_survives_reconstruction() {
        let seen = Rc::new(RefCell::new(None));
        let mut session = Session::new();

        let buffer = pass(&mut session, &Counter { seen: seen.clone() });
        assert_eq!(buffer.lines(), &["count 0"]);

        seen.borrow().as_ref().unwrap().set(5);

        let buffer = pass(&mut session, &Counter { seen: seen.clone() });
        assert_eq!(buffer.lines(), &["count 5"]);
    }

    #[test]
    fn test_state_collected_when_absent() {
        let seen = Rc::new(RefCell::new(None));
        let mut session = Session::new();
        let with_counter = |on: bool| -> AnyView {
            AnyView::new(If::new(on, Counter { seen: seen.clone() }))
        };

        pass(&mut session, &with_counter(true));
        seen.borrow().as_ref().unwrap().set(9);
        assert_eq!(pass(&mut session, &with_counter(true)).lines(), &["count 9"]);

        pass(&mut session, &with_counter(false));
        assert!(session.store.is_empty());

        assert_eq!(pass(&mut session, &with_counter(true)).lines(), &["count 0"]);
    }

    #[test]
    fn test_empty_body_yields_empty_buffer() {
        let mut session = Session::new();
        let buffer = pass(&mut session, &EmptyView);
        assert!(buffer.is_empty());
    }
}
