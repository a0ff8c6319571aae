// Timer seam. The engine never blocks; auto-play continuation and the
// post-settlement redraw are scheduled through this trait and cancelled on
// teardown. The browser adapter lives in `web`; tests drive ManualScheduler.

use std::cell::{Cell, RefCell};

/// Identifies a scheduled callback so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Cooperative single-threaded timer host.
pub trait Scheduler {
    /// Run `callback` once after `delay_ms`. A zero delay means "next tick",
    /// never synchronously inside this call.
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancel a pending timer. Cancelling an already-fired timer is a no-op.
    fn cancel(&self, id: TimerId);
}

struct PendingTimer {
    id: TimerId,
    delay_ms: u32,
    callback: Box<dyn FnOnce()>,
}

/// Scheduler driven by hand. Callbacks queue until `run_pending` is called,
/// which makes spin settlement and auto-play chains fully deterministic in
/// tests and headless runs.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Vec<PendingTimer>>,
    next_id: Cell<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        ManualScheduler::default()
    }

    /// Number of timers currently queued.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Delay of the earliest queued timer, if any.
    pub fn next_delay_ms(&self) -> Option<u32> {
        self.queue.borrow().iter().map(|t| t.delay_ms).min()
    }

    /// Fire everything queued at the time of the call, in schedule order.
    /// Timers scheduled by the callbacks themselves stay queued for the next
    /// call, which models one event-loop turn per invocation.
    pub fn run_pending(&self) {
        let batch: Vec<PendingTimer> = self.queue.borrow_mut().drain(..).collect();
        for timer in batch {
            (timer.callback)();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.queue.borrow_mut().push(PendingTimer {
            id,
            delay_ms,
            callback,
        });
        id
    }

    fn cancel(&self, id: TimerId) {
        self.queue.borrow_mut().retain(|t| t.id != id);
    }
}
