//! Deferred callbacks on the UI thread.
//!
//! `Timers` never blocks: callers schedule work against the injected clock
//! and the host loop calls [`Timers::run_due`] once per tick. Cancelling a
//! handle (directly or through a scope's dispose) guarantees the callback
//! never runs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use web_time::Instant;

use crate::{Clock, Dispose};

new_key_type! {
    pub struct TimerKey;
}

struct Entry {
    due: Instant,
    seq: u64,
    callback: Option<Box<dyn FnOnce()>>,
}

#[derive(Default)]
struct Queue {
    entries: SlotMap<TimerKey, Entry>,
}

#[derive(Clone)]
pub struct Timers {
    queue: Rc<RefCell<Queue>>,
    next_seq: Rc<Cell<u64>>,
    clock: Rc<dyn Clock>,
}

impl std::fmt::Debug for Timers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timers")
            .field("pending", &self.pending())
            .finish()
    }
}

impl Timers {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            queue: Rc::new(RefCell::new(Queue::default())),
            next_seq: Rc::new(Cell::new(0)),
            clock,
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn clock(&self) -> Rc<dyn Clock> {
        self.clock.clone()
    }

    pub fn schedule(&self, delay: Duration, f: impl FnOnce() + 'static) -> TimerHandle {
        self.schedule_at(self.clock.now() + delay, f)
    }

    pub fn schedule_at(&self, due: Instant, f: impl FnOnce() + 'static) -> TimerHandle {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        let key = self.queue.borrow_mut().entries.insert(Entry {
            due,
            seq,
            callback: Some(Box::new(f)),
        });
        TimerHandle {
            key,
            queue: Rc::downgrade(&self.queue),
        }
    }

    /// Fires every callback due at the current clock time, earliest first
    /// (ties in scheduling order). Callbacks may schedule further timers;
    /// those fire in the same call if they are already due.
    pub fn run_due(&self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        loop {
            let next = {
                let mut q = self.queue.borrow_mut();
                let key = q
                    .entries
                    .iter()
                    .filter(|(_, e)| e.due <= now)
                    .min_by_key(|(_, e)| (e.due, e.seq))
                    .map(|(k, _)| k);
                key.and_then(|k| q.entries.remove(k)).and_then(|e| e.callback)
            };
            match next {
                Some(cb) => {
                    cb();
                    fired += 1;
                }
                None => break,
            }
        }
        fired
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.queue.borrow().entries.values().map(|e| e.due).min()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().entries.len()
    }
}

/// Handle to a scheduled callback.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    key: TimerKey,
    queue: Weak<RefCell<Queue>>,
}

impl TimerHandle {
    /// Returns `true` if the callback was still pending.
    pub fn cancel(&self) -> bool {
        match self.queue.upgrade() {
            Some(q) => q.borrow_mut().entries.remove(self.key).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.queue
            .upgrade()
            .is_some_and(|q| q.borrow().entries.contains_key(self.key))
    }

    pub fn into_dispose(self) -> Dispose {
        Dispose::new(move || {
            self.cancel();
        })
    }
}
