//! Render scheduling - the rerender request channel.
//!
//! Anything that wants a new frame (a state mutation, an animation tick, an
//! external caller) sends a [`RenderRequest`] through a [`SchedulerHandle`].
//! The handle is created once when the runtime starts and passed down through
//! view contexts and task contexts; there is no process-wide flag.
//!
//! The receiving half is drained once per loop tick. Requests coalesce: any
//! number of requests between two ticks produce one render pass.
//!
//! # Example
//!
//! ```rust
//! use spark_view::scheduler::{channel, RenderRequest};
//!
//! let (handle, mut requests) = channel();
//! handle.request(RenderRequest::External);
//! handle.request(RenderRequest::StateChanged);
//!
//! let pending = requests.drain();
//! assert!(pending.render);
//! assert_eq!(pending.count, 2);
//! ```

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

/// Why a new frame was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRequest {
    /// A state cell was written.
    StateChanged,
    /// A background animation woke up.
    Animation,
    /// Requested from outside the view tree.
    External,
    /// Stop the run loop after the current tick.
    Quit,
}

/// Sending half. Cheap to clone; safe to move into background tasks.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: UnboundedSender<RenderRequest>,
}

impl SchedulerHandle {
    /// Send a request. Silently dropped if the runtime is gone.
    pub fn request(&self, request: RenderRequest) {
        let _ = self.tx.send(request);
    }

    /// Request a rerender from outside the view tree.
    pub fn rerender(&self) {
        self.request(RenderRequest::External);
    }

    /// Ask the run loop to stop.
    pub fn quit(&self) {
        self.request(RenderRequest::Quit);
    }

    /// True once the receiving half has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Requests accumulated since the last drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pending {
    pub render: bool,
    pub quit: bool,
    pub count: usize,
}

impl Pending {
    fn record(&mut self, request: RenderRequest) {
        self.count += 1;
        match request {
            RenderRequest::Quit => self.quit = true,
            _ => self.render = true,
        }
    }
}

/// Receiving half, owned by the run loop.
#[derive(Debug)]
pub struct RenderRequests {
    rx: UnboundedReceiver<RenderRequest>,
}

impl RenderRequests {
    /// Take every queued request without waiting.
    pub fn drain(&mut self) -> Pending {
        let mut pending = Pending::default();
        loop {
            match self.rx.try_recv() {
                Ok(request) => pending.record(request),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        pending
    }

    /// Wait for the next request.
    pub async fn recv(&mut self) -> Option<RenderRequest> {
        self.rx.recv().await
    }
}

/// Create a connected handle/receiver pair.
pub fn channel() -> (SchedulerHandle, RenderRequests) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SchedulerHandle { tx }, RenderRequests { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_coalesces() {
        let (handle, mut requests) = channel();
        for _ in 0..5 {
            handle.request(RenderRequest::Animation);
        }
        let pending = requests.drain();
        assert!(pending.render);
        assert!(!pending.quit);
        assert_eq!(pending.count, 5);

        assert_eq!(requests.drain(), Pending::default());
    }

    #[test]
    fn test_quit_alone_does_not_render() {
        let (handle, mut requests) = channel();
        handle.quit();
        let pending = requests.drain();
        assert!(pending.quit);
        assert!(!pending.render);
    }

    #[test]
    fn test_request_after_drop_is_ignored() {
        let (handle, requests) = channel();
        drop(requests);
        assert!(handle.is_closed());
        handle.rerender();
    }

    #[tokio::test]
    async fn test_recv_from_clone() {
        let (handle, mut requests) = channel();
        let clone = handle.clone();
        clone.request(RenderRequest::StateChanged);
        assert_eq!(requests.recv().await, Some(RenderRequest::StateChanged));
    }
}
