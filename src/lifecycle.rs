//! Lifecycle - appear/disappear notifications and background tasks.
//!
//! Every identity that uses a lifecycle feature gets one entry holding a
//! [`CancellationToken`]. The entry is created the first time the identity
//! shows up and lives for as long as the identity keeps being visited: it is
//! keyed by structural position, not by descriptor instance, so rebuilding the
//! tree every frame does not restart anything.
//!
//! # Pattern
//!
//! - `begin_pass` marks every entry unvisited
//! - features called during evaluation visit their entry
//! - `end_pass` runs queued appear callbacks, then fires disappear callbacks
//!   and cancels the token of every entry that was not visited
//!
//! Background work never touches rendering state directly. Tasks are queued
//! here as futures and the run loop spawns them onto its `LocalSet` between
//! passes; they talk back only through the [`SchedulerHandle`].

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::identity::Identity;
use crate::scheduler::{RenderRequest, SchedulerHandle};

/// A background task ready to be spawned on the loop's `LocalSet`.
pub type LocalTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

type Callback = Box<dyn FnOnce()>;

// =============================================================================
// Task Context
// =============================================================================

/// What a background task gets to work with.
#[derive(Debug, Clone)]
pub struct TaskContext {
    identity: Identity,
    scheduler: SchedulerHandle,
    token: CancellationToken,
}

impl TaskContext {
    /// Identity of the view that started the task.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Scheduler handle for requesting frames.
    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    /// Token revoked when the owning view leaves the tree.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// True once the owning view has left the tree.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Request a new frame.
    pub fn request_render(&self) {
        self.scheduler.request(RenderRequest::Animation);
    }

    /// Sleep for `duration`. Returns `false` if cancelled first.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}

/// Wake every `interval` and request a frame until cancelled.
async fn animation_loop(ctx: TaskContext, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ctx.token.cancelled() => break,
            _ = ticker.tick() => ctx.request_render(),
        }
    }
    trace!(identity = %ctx.identity, "animation stopped");
}

// =============================================================================
// Entries
// =============================================================================

struct Entry {
    token: CancellationToken,
    started: Instant,
    visited: bool,
    appeared: bool,
    on_disappear: Option<Callback>,
    started_slots: HashSet<usize>,
}

impl Entry {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            started: Instant::now(),
            visited: true,
            appeared: false,
            on_disappear: None,
            started_slots: HashSet::new(),
        }
    }
}

/// Counts from one [`Lifecycle::end_pass`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleReport {
    pub appeared: usize,
    pub disappeared: usize,
}

/// Per-identity lifecycle tracker.
#[derive(Default)]
pub struct Lifecycle {
    entries: HashMap<Identity, Entry>,
    appear_queue: Vec<Callback>,
    pending: Vec<LocalTask>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    fn visit(&mut self, identity: &Identity) -> &mut Entry {
        let entry = self
            .entries
            .entry(identity.clone())
            .or_insert_with(Entry::new);
        entry.visited = true;
        entry
    }

    /// Mark every entry unvisited.
    pub fn begin_pass(&mut self) {
        for entry in self.entries.values_mut() {
            entry.visited = false;
        }
    }

    /// Keep `identity`'s entry alive this pass.
    pub fn keep_alive(&mut self, identity: &Identity) {
        self.visit(identity);
    }

    /// Run `callback` after the pass in which `identity` first appears.
    pub fn on_appear(&mut self, identity: &Identity, callback: impl FnOnce() + 'static) {
        if !self.visit(identity).appeared {
            self.appear_queue.push(Box::new(callback));
        }
    }

    /// Run `callback` at the end of the first pass that does not visit
    /// `identity`. The latest registration wins.
    pub fn on_disappear(&mut self, identity: &Identity, callback: impl FnOnce() + 'static) {
        self.visit(identity).on_disappear = Some(Box::new(callback));
    }

    /// Start a background task for (`identity`, `slot`) unless one is
    /// already running.
    ///
    /// The task is dropped at its next suspension point once the identity
    /// leaves the tree.
    pub fn spawn<F, Fut>(
        &mut self,
        identity: &Identity,
        slot: usize,
        scheduler: &SchedulerHandle,
        task: F,
    ) where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let entry = self.visit(identity);
        if !entry.started_slots.insert(slot) {
            return;
        }
        let ctx = TaskContext {
            identity: identity.clone(),
            scheduler: scheduler.clone(),
            token: entry.token.clone(),
        };
        let token = entry.token.clone();
        let future = task(ctx);
        self.pending.push(Box::pin(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = future => {}
            }
        }));
        trace!(identity = %identity, slot, "task queued");
    }

    /// Current frame index of an animation ticking every `interval`,
    /// starting the animation on first use.
    pub fn animation_frame(
        &mut self,
        identity: &Identity,
        slot: usize,
        interval: Duration,
        scheduler: &SchedulerHandle,
    ) -> u64 {
        let interval = interval.max(Duration::from_millis(1));
        self.spawn(identity, slot, scheduler, move |ctx| animation_loop(ctx, interval));
        let elapsed = self.visit(identity).started.elapsed();
        (elapsed.as_nanos() / interval.as_nanos()) as u64
    }

    /// Cancellation token for `identity`, if it has an entry.
    pub fn token(&self, identity: &Identity) -> Option<CancellationToken> {
        self.entries.get(identity).map(|e| e.token.clone())
    }

    /// Close the pass: run appear callbacks, retire unvisited entries.
    pub fn end_pass(&mut self) -> LifecycleReport {
        let mut report = LifecycleReport::default();

        for entry in self.entries.values_mut() {
            if entry.visited {
                entry.appeared = true;
            }
        }
        for callback in std::mem::take(&mut self.appear_queue) {
            callback();
            report.appeared += 1;
        }

        let gone: Vec<Identity> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.visited)
            .map(|(identity, _)| identity.clone())
            .collect();

        for identity in gone {
            if let Some(entry) = self.entries.remove(&identity) {
                entry.token.cancel();
                if let Some(callback) = entry.on_disappear {
                    callback();
                }
                debug!(identity = %identity, "disappeared");
                report.disappeared += 1;
            }
        }

        report
    }

    /// Tasks queued since the last call.
    pub fn take_pending_tasks(&mut self) -> Vec<LocalTask> {
        std::mem::take(&mut self.pending)
    }

    /// Cancel everything and fire every disappear callback.
    pub fn shutdown(&mut self) {
        self.pending.clear();
        self.appear_queue.clear();
        for (_, entry) in self.entries.drain() {
            entry.token.cancel();
            if let Some(callback) = entry.on_disappear {
                callback();
            }
        }
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("entries", &self.entries.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
