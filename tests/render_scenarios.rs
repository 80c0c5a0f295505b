//! End-to-end render scenarios driven through `Runtime` with an in-memory
//! terminal.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use spark_view::buffer::{FrameBuffer, VerticalAlignment};
use spark_view::prelude::*;
use tokio::task::LocalSet;

fn runtime(width: u16, height: u16) -> Runtime<Vec<u8>> {
    let config = RuntimeConfig {
        synchronized_output: false,
        ..RuntimeConfig::default()
    };
    Runtime::new(config, Vec::new(), (width, height)).unwrap()
}

/// 49 static rows followed by one row showing `frame`.
fn board(frame: u64) -> VStack {
    VStack::new()
        .children((0..49).map(|i| Text::new(format!("static row {}", i)).boxed()))
        .child(Text::new(format!("frame {}", frame)))
}

#[test]
fn one_changing_row_writes_one_row_per_tick() {
    let mut rt = runtime(40, 50);
    let first = rt.tick(&board(0), None).unwrap();
    assert_eq!(first.content.rows_written, 50);

    for frame in 1..=10 {
        rt.request_render();
        let stats = rt.tick(&board(frame), None).unwrap();
        assert_eq!(stats.content.rows_written, 1, "frame {}", frame);
        assert_eq!(stats.content.rows_cleared, 0);
    }
}

#[tokio::test(start_paused = true)]
async fn animated_row_writes_one_row_per_tick() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let view = || {
                VStack::new()
                    .children((0..49).map(|i| Text::new(format!("static row {}", i)).boxed()))
                    .child(Animated::new(Duration::from_millis(100), |frame| {
                        Text::new(format!("frame {}", frame))
                    }))
            };

            let mut rt = runtime(40, 50);
            rt.tick(&view(), None).unwrap();
            let tasks = rt.take_pending_tasks();
            assert_eq!(tasks.len(), 1);
            for task in tasks {
                tokio::task::spawn_local(task);
            }

            // Sample between ticks so the animation has always woken first.
            tokio::time::sleep(Duration::from_millis(50)).await;
            for _ in 0..5 {
                tokio::time::sleep(Duration::from_millis(100)).await;
                let stats = rt
                    .tick(&view(), None)
                    .expect("animation should have requested a frame");
                assert_eq!(stats.content.rows_written, 1);
                assert!(rt.take_pending_tasks().is_empty());
            }
        })
        .await;
}

#[test]
fn resize_rewrites_every_row_both_ways() {
    let view = || Text::new("same content\nevery frame");
    let mut rt = runtime(30, 10);
    assert_eq!(rt.tick(&view(), None).unwrap().content.rows_written, 10);

    rt.request_resize(30, 6);
    let shrunk = rt.tick(&view(), None).unwrap();
    assert_eq!(shrunk.content.rows_written, 6);
    assert_eq!(rt.size(), (30, 6));

    rt.request_resize(30, 10);
    let grown = rt.tick(&view(), None).unwrap();
    assert_eq!(grown.content.rows_written, 10);

    // No resize, nothing new: nothing written.
    rt.request_render();
    assert_eq!(rt.tick(&view(), None).unwrap().rows_written(), 0);
}

#[test]
fn status_region_survives_content_changes() {
    let mut rt = runtime(20, 6);
    let status = Text::new("ready");
    rt.tick(&Text::new("one"), Some(&status));

    rt.request_render();
    let stats = rt.tick(&Text::new("two"), Some(&status)).unwrap();
    assert_eq!(stats.content.rows_written, 1);
    assert_eq!(stats.status.rows_written, 0);

    rt.request_resize(20, 6);
    let stats = rt.tick(&Text::new("two"), Some(&status)).unwrap();
    assert_eq!(stats.content.rows_written, 5);
    assert_eq!(stats.status.rows_written, 1);
}

#[test]
fn status_region_returns_after_pass_without_it() {
    let mut rt = runtime(20, 4);
    let status = Text::new("ready");
    let content = Text::new("body");
    let stats = rt.tick(&content, Some(&status)).unwrap();
    assert_eq!(stats.status.rows_written, 1);

    rt.request_render();
    let stats = rt.tick(&content, None).unwrap();
    assert_eq!(stats.status.rows_written, 0);
    assert_eq!(stats.content.rows_written, 1);

    let before = rt.writer().len();
    rt.request_render();
    let stats = rt.tick(&content, Some(&status)).unwrap();
    assert_eq!(stats.status.rows_written, 1);
    assert_eq!(stats.content.rows_cleared, 1);

    let written = String::from_utf8_lossy(&rt.writer()[before..]).into_owned();
    let last_row = written.rfind("\x1b[4;1H").unwrap();
    assert!(written[last_row..].contains("ready"));
}

// =============================================================================
// State across passes
// =============================================================================

type Handle = Rc<RefCell<Option<State<i32>>>>;

struct Counter {
    handle: Handle,
}

impl View for Counter {
    fn body(&self, cx: &mut ViewContext<'_>) -> Body {
        let count = cx.state(|| 0);
        *self.handle.borrow_mut() = Some(count.clone());
        Body::expand(Text::new(format!("count {}", count.get())))
    }
}

fn screen(show: bool, handle: &Handle) -> If {
    If::new(show, Counter { handle: handle.clone() }).otherwise(Text::new("hidden"))
}

fn current(handle: &Handle) -> State<i32> {
    handle.borrow().clone().expect("counter evaluated")
}

#[test]
fn state_persists_then_collects() {
    let handle: Handle = Rc::default();
    let mut rt = runtime(20, 3);

    rt.tick(&screen(true, &handle), None);
    current(&handle).set(7);

    // The write requested a frame by itself.
    let stats = rt.tick(&screen(true, &handle), None).unwrap();
    assert_eq!(current(&handle).get(), 7);
    assert_eq!(stats.content.rows_written, 1);
    assert!(String::from_utf8_lossy(rt.writer()).contains("count 7"));

    rt.request_render();
    let stats = rt.tick(&screen(false, &handle), None).unwrap();
    assert_eq!(stats.collected, 1);

    rt.request_render();
    rt.tick(&screen(true, &handle), None);
    assert_eq!(current(&handle).get(), 0);
}

#[test]
fn disappear_fires_when_view_leaves() {
    let log = Rc::new(RefCell::new(Vec::<&str>::new()));
    let view = |show: bool| {
        let appear = log.clone();
        let disappear = log.clone();
        If::new(
            show,
            Text::new("x")
                .on_appear(move || appear.borrow_mut().push("appear"))
                .on_disappear(move || disappear.borrow_mut().push("disappear")),
        )
    };

    let mut rt = runtime(10, 2);
    rt.tick(&view(true), None);
    rt.request_render();
    rt.tick(&view(true), None);
    assert_eq!(*log.borrow(), vec!["appear"]);

    rt.request_render();
    let stats = rt.tick(&view(false), None).unwrap();
    assert_eq!(*log.borrow(), vec!["appear", "disappear"]);
    assert!(stats.disappeared >= 1);
}

// =============================================================================
// Compositing
// =============================================================================

#[test]
fn horizontal_composition_pads_short_operand() {
    let mut left = FrameBuffer::from_lines(["abc", "def"]);
    let right = FrameBuffer::from_lines(["12345"]);
    left.append_horizontally(&right, VerticalAlignment::Top);

    assert_eq!(left.height(), 2);
    assert_eq!(left.lines(), &["abc12345", "def     "]);
    assert_eq!(left.width(), 8);
}
