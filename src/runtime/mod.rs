//! Runtime - the render loop.
//!
//! One [`Runtime`] drives one application run:
//!
//! ```text
//! input / resize flag / render requests
//!         │
//!         ▼
//!     tick() ── idle? ──► wait for a request or the poll interval
//!         │
//!         ▼
//!   render_pass()
//!     1. clear per-frame registries, open liveness tracking
//!     2. evaluate the root view into a frame buffer
//!     3. diff-write the content region
//!     4. evaluate + diff-write the status region
//!     5. close liveness: collect state, retire lifecycles, settle focus
//!     6. apply preferences (title), flush
//! ```
//!
//! Everything runs on one thread. Background tasks are queued during
//! evaluation and spawned onto the local task set between passes; they talk
//! back only through the [`SchedulerHandle`].
//!
//! Terminal resizes only set a flag. The flag is read at the start of the
//! next tick, which invalidates the diff caches before rendering.

pub mod input;

use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use tokio::task::LocalSet;
use tracing::{debug, debug_span, info};

use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::lifecycle::LocalTask;
use crate::registry::Title;
use crate::renderer::{
    DiffStats, FrameDiffWriter, TerminalGuard, build_output_lines, terminal_size,
};
use crate::scheduler::{RenderRequest, RenderRequests, SchedulerHandle, channel};
use crate::style::{RESET, Style};
use crate::theme::Palette;
use crate::view::{AnyView, Environment, Session, View, evaluate_root};

use input::{InputEvent, KeyState, KeyboardEvent, poll_event};

/// Identity region names.
const CONTENT_REGION: &str = "content";
const STATUS_REGION: &str = "status";

/// What one render pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Zero-based pass number.
    pub pass: u64,
    pub content: DiffStats,
    pub status: DiffStats,
    /// State cells garbage-collected.
    pub collected: usize,
    pub appeared: usize,
    pub disappeared: usize,
    /// False if the terminal write was abandoned.
    pub flushed: bool,
}

impl PassStats {
    pub fn rows_written(&self) -> usize {
        self.content.rows_written + self.status.rows_written
    }
}

// =============================================================================
// Runtime
// =============================================================================

pub struct Runtime<W: Write> {
    config: RuntimeConfig,
    session: Session,
    writer: FrameDiffWriter<W>,
    scheduler: SchedulerHandle,
    requests: RenderRequests,
    palette: Rc<Palette>,
    background: String,
    size: (u16, u16),
    pending_resize: Option<(u16, u16)>,
    needs_render: bool,
    quit: bool,
    passes: u64,
    title: Option<String>,
}

impl<W: Write> Runtime<W> {
    /// Runtime writing to `writer`, assuming a terminal of `size`
    /// (columns, rows). The first tick always renders.
    pub fn new(config: RuntimeConfig, writer: W, size: (u16, u16)) -> Result<Self> {
        config.validate()?;
        let palette = config.palette()?;
        let background = palette.background_sequence();
        let (scheduler, requests) = channel();
        let writer =
            FrameDiffWriter::new(writer).with_synchronized_output(config.synchronized_output);

        Ok(Self {
            config,
            session: Session::new(),
            writer,
            scheduler,
            requests,
            palette: Rc::new(palette),
            background,
            size,
            pending_resize: None,
            needs_render: true,
            quit: false,
            passes: 0,
            title: None,
        })
    }

    /// Handle for requesting renders or quitting from outside the tree.
    pub fn scheduler(&self) -> SchedulerHandle {
        self.scheduler.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn writer(&self) -> &W {
        self.writer.writer()
    }

    pub fn writer_mut(&mut self) -> &mut W {
        self.writer.writer_mut()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current terminal size (columns, rows).
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    /// Number of completed render passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Record a terminal resize. Applied at the start of the next tick.
    pub fn request_resize(&mut self, width: u16, height: u16) {
        self.pending_resize = Some((width, height));
    }

    pub fn request_render(&mut self) {
        self.needs_render = true;
    }

    fn record(&mut self, request: RenderRequest) {
        match request {
            RenderRequest::Quit => self.quit = true,
            _ => self.needs_render = true,
        }
    }

    /// Collect requests and a pending resize, then render if anything asked
    /// for it. Returns `None` when idle or quitting.
    pub fn tick(&mut self, root: &dyn View, status: Option<&dyn View>) -> Option<PassStats> {
        let pending = self.requests.drain();
        if pending.quit {
            self.quit = true;
        }
        if pending.render {
            self.needs_render = true;
        }

        if let Some(size) = self.pending_resize.take() {
            debug!(from = ?self.size, to = ?size, "resize");
            self.writer.invalidate();
            self.size = size;
            self.needs_render = true;
        }

        if self.quit || !self.needs_render {
            return None;
        }
        self.needs_render = false;
        Some(self.render_pass(root, status))
    }

    fn environment(&self, width: usize, height: usize) -> Environment {
        Environment {
            width: Some(width),
            height: Some(height),
            palette: self.palette.clone(),
            style: self.palette.text_style(),
            focus_scope: None,
            focused: false,
            animation_interval: self.config.animation_interval(),
        }
    }

    fn status_background(&self) -> String {
        if self.palette.status_bg.is_default() {
            self.background.clone()
        } else {
            Style::new().bg(self.palette.status_bg).prologue()
        }
    }

    /// Run one full render pass.
    pub fn render_pass(&mut self, root: &dyn View, status: Option<&dyn View>) -> PassStats {
        let pass = self.passes;
        let span = debug_span!("render_pass", pass);
        let _enter = span.enter();

        let width = usize::from(self.size.0);
        let height = usize::from(self.size.1);
        let status_height = match status {
            Some(_) => usize::from(self.config.status_height).min(height),
            None => 0,
        };
        let content_height = height - status_height;

        self.session.begin_pass();

        let env = self.environment(width, content_height);
        let buffer = evaluate_root(root, &mut self.session, &self.scheduler, CONTENT_REGION, env);
        let lines = build_output_lines(&buffer, width, content_height, &self.background, RESET);
        let content = self.writer.write_content_diff(&lines, 0);

        // Status is evaluated inside the same liveness window, so its state
        // and tasks survive the pass like any other view's.
        let status_stats = match status {
            Some(view) if status_height > 0 => {
                let mut env = self.environment(width, status_height);
                env.style = self.palette.status_style();
                let buffer =
                    evaluate_root(view, &mut self.session, &self.scheduler, STATUS_REGION, env);
                let background = self.status_background();
                let lines =
                    build_output_lines(&buffer, width, status_height, &background, RESET);
                self.writer.write_status_diff(&lines, content_height)
            }
            _ => {
                self.writer.reset_status();
                DiffStats::default()
            }
        };

        let collected = self.session.store.end_pass();
        let report = self.session.lifecycle.end_pass();
        self.session.registry.finish_pass();

        self.apply_title();
        let flushed = self.writer.flush();
        self.passes += 1;

        let stats = PassStats {
            pass,
            content,
            status: status_stats,
            collected,
            appeared: report.appeared,
            disappeared: report.disappeared,
            flushed,
        };
        debug!(
            rows_written = stats.rows_written(),
            rows_cleared = content.rows_cleared + status_stats.rows_cleared,
            collected,
            disappeared = report.disappeared,
            "pass complete"
        );
        stats
    }

    fn apply_title(&mut self) {
        let Some(title) = self.session.registry.preference::<Title>() else {
            return;
        };
        if self.title.as_deref() != Some(title.as_str()) {
            self.writer.write_title(&title);
            self.title = Some(title);
        }
    }

    /// Route a key event. Returns true if something consumed it.
    ///
    /// Ctrl+C quits and Tab / Shift+Tab cycle focus before any view handler
    /// sees the event.
    pub fn dispatch_key(&mut self, event: &KeyboardEvent) -> bool {
        if event.state == KeyState::Release {
            return false;
        }
        if event.is_interrupt() {
            self.quit = true;
            return true;
        }
        if event.key == "Tab" && !event.modifiers.ctrl && !event.modifiers.alt {
            let registry = &mut self.session.registry;
            let moved = if event.modifiers.shift {
                registry.focus_previous()
            } else {
                registry.focus_next()
            };
            if moved {
                self.needs_render = true;
            }
            return moved;
        }

        let handled = self.session.registry.dispatch(event);
        if handled {
            self.needs_render = true;
        }
        handled
    }

    /// Background tasks queued by the last pass.
    pub fn take_pending_tasks(&mut self) -> Vec<LocalTask> {
        self.session.lifecycle.take_pending_tasks()
    }

    /// Cancel every task and fire every disappear callback.
    pub fn shutdown(&mut self) {
        self.session.lifecycle.shutdown();
    }

    /// Drain ready input without blocking.
    fn poll_input(&mut self) -> Result<()> {
        while let Some(event) = poll_event(Duration::ZERO)? {
            match event {
                InputEvent::Key(key) => {
                    self.dispatch_key(&key);
                }
                InputEvent::Resize(width, height) => self.request_resize(width, height),
                InputEvent::None => {}
            }
        }
        Ok(())
    }

    /// Sleep until a render request arrives or `timeout` passes.
    async fn wait(&mut self, timeout: Duration) {
        tokio::select! {
            request = self.requests.recv() => {
                if let Some(request) = request {
                    self.record(request);
                }
            }
            _ = tokio::time::sleep(timeout) => {}
        }
    }

    /// Drive the loop until quit. Must run inside a [`LocalSet`].
    pub async fn run_loop(&mut self, root: &dyn View, status: Option<&dyn View>) -> Result<()> {
        let poll = self.config.poll_interval();
        loop {
            self.poll_input()?;
            self.tick(root, status);
            for task in self.take_pending_tasks() {
                tokio::task::spawn_local(task);
            }
            if self.quit {
                return Ok(());
            }
            self.wait(poll).await;
        }
    }
}

impl<W: Write> std::fmt::Debug for Runtime<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("size", &self.size)
            .field("passes", &self.passes)
            .field("needs_render", &self.needs_render)
            .field("quit", &self.quit)
            .field("session", &self.session)
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Run `root` (and an optional fixed `status` view at the bottom) on the
/// real terminal until Ctrl+C or a quit request.
///
/// Builds a current-thread tokio runtime and a [`LocalSet`] for background
/// tasks.
pub fn run(config: RuntimeConfig, root: impl View, status: Option<AnyView>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let local = LocalSet::new();
    local.block_on(&runtime, run_local(config, root, status))
}

/// Async form of [`run`]. Must be awaited inside a [`LocalSet`].
pub async fn run_local(
    config: RuntimeConfig,
    root: impl View,
    status: Option<AnyView>,
) -> Result<()> {
    config.validate()?;
    let size = terminal_size((config.fallback_width, config.fallback_height));

    let mut guard = TerminalGuard::new();
    guard.enter(config.alternate_screen)?;

    let mut runtime = Runtime::new(config, io::stdout(), size)?;
    info!(width = size.0, height = size.1, "runtime started");

    let status = status.as_ref().map(|view| view as &dyn View);
    let result = runtime.run_loop(&root, status).await;

    runtime.shutdown();
    guard.restore()?;
    info!(passes = runtime.passes(), "runtime stopped");
    result
}

// =============================================================================
// Tests
// =============================================================================
