//! Frame scheduling primitive.
//!
//! The reveal scheduler never owns a timer or a thread. It asks the host for
//! "a tick on the next frame" through [`FrameScheduler`] and receives a
//! [`TickHandle`]; the host later delivers that handle back to
//! [`crate::reveal::RevealScheduler::tick`]. Cancelling a handle withdraws the
//! request. A handle delivered after cancellation is stale and ignored by the
//! scheduler.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Opaque handle for one requested tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

impl TickHandle {
    /// Raw handle value (for logging).
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Host-provided frame scheduling (`requestTick` / `cancelTick`).
pub trait FrameScheduler {
    /// Request one tick on a future frame.
    fn request_tick(&mut self) -> TickHandle;

    /// Withdraw a previously requested tick. Unknown handles are ignored.
    fn cancel_tick(&mut self, handle: TickHandle);
}

#[derive(Debug, Default)]
struct FrameBook {
    next_id: u64,
    requested: VecDeque<TickHandle>,
}

/// Frame queue shared between a host loop and any number of schedulers.
///
/// Cloning yields another handle onto the same queue. The host calls
/// [`FrameQueue::take_due`] once per frame and delivers every returned
/// handle to the scheduler that [`owns`](crate::reveal::RevealScheduler::owns)
/// it. Single-threaded by construction (`Rc`).
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    book: Rc<RefCell<FrameBook>>,
}

impl FrameQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all requested handles, oldest first.
    ///
    /// Ticks requested while the host is delivering these handles land in
    /// the next frame.
    pub fn take_due(&self) -> Vec<TickHandle> {
        self.book.borrow_mut().requested.drain(..).collect()
    }

    /// Number of outstanding (requested, not yet taken or cancelled) ticks.
    pub fn outstanding(&self) -> usize {
        self.book.borrow().requested.len()
    }

    /// True when no tick is outstanding; the host may sleep until input.
    pub fn is_idle(&self) -> bool {
        self.outstanding() == 0
    }

    /// Check whether `handle` is still outstanding.
    pub fn is_outstanding(&self, handle: TickHandle) -> bool {
        self.book.borrow().requested.contains(&handle)
    }
}

impl FrameScheduler for FrameQueue {
    fn request_tick(&mut self) -> TickHandle {
        let mut book = self.book.borrow_mut();
        let handle = TickHandle(book.next_id);
        book.next_id += 1;
        book.requested.push_back(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        self.book.borrow_mut().requested.retain(|h| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_returns_distinct_handles() {
        let mut frames = FrameQueue::new();
        let a = frames.request_tick();
        let b = frames.request_tick();
        assert_ne!(a, b);
        assert_eq!(frames.outstanding(), 2);
    }

    #[test]
    fn take_due_drains_in_request_order() {
        let mut frames = FrameQueue::new();
        let a = frames.request_tick();
        let b = frames.request_tick();
        assert_eq!(frames.take_due(), vec![a, b]);
        assert!(frames.is_idle());
    }

    #[test]
    fn cancel_removes_only_that_handle() {
        let mut frames = FrameQueue::new();
        let a = frames.request_tick();
        let b = frames.request_tick();
        frames.cancel_tick(a);
        assert!(!frames.is_outstanding(a));
        assert!(frames.is_outstanding(b));
    }

    #[test]
    fn cancel_unknown_handle_is_ignored() {
        let mut frames = FrameQueue::new();
        let a = frames.request_tick();
        frames.take_due();
        frames.cancel_tick(a);
        assert!(frames.is_idle());
    }

    #[test]
    fn clones_share_the_same_queue() {
        let host = FrameQueue::new();
        let mut scheduler_side = host.clone();
        let handle = scheduler_side.request_tick();
        assert!(host.is_outstanding(handle));
    }
}
