//! Virtual-time timer wheel
//!
//! The runtime is single-threaded; all deferral (debounced set/get
//! flows, debounced subscriptions) goes through this wheel. Time only
//! moves when the embedder's event loop calls [`Runtime::advance`],
//! which makes every debounce window deterministic under test.
//!
//! Cancelling a timer removes its slot; a cancelled handle can never
//! fire, even if the wheel is advanced past its deadline.

use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::runtime::Runtime;

new_key_type! {
    /// Handle to a pending timer
    pub struct TimerId;
}

/// Default trailing-edge debounce window
///
/// A framework-wide configuration point: one `advance` of this length
/// settles any default-configured binding or subscription flow.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(50);

type TimerCallback = Box<dyn FnOnce(&mut Runtime)>;

pub(crate) struct Timer {
    deadline_ms: u64,
    /// Tie-breaker: same-deadline timers fire in scheduling order
    seq: u64,
    callback: TimerCallback,
}

/// Pending timers plus the virtual clock
#[derive(Default)]
pub(crate) struct Timers {
    slots: SlotMap<TimerId, Timer>,
    now_ms: u64,
    next_seq: u64,
}

impl Timers {
    pub(crate) fn set_timeout(
        &mut self,
        delay: Duration,
        callback: impl FnOnce(&mut Runtime) + 'static,
    ) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(Timer {
            deadline_ms: self.now_ms + delay.as_millis() as u64,
            seq,
            callback: Box::new(callback),
        })
    }

    /// Invalidate a pending timer. Returns whether it was still pending.
    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        self.slots.remove(id).is_some()
    }

    fn pop_due(&mut self, target_ms: u64) -> Option<Timer> {
        let id = self
            .slots
            .iter()
            .filter(|(_, t)| t.deadline_ms <= target_ms)
            .min_by_key(|(_, t)| (t.deadline_ms, t.seq))
            .map(|(id, _)| id)?;
        self.slots.remove(id)
    }
}

impl Runtime {
    /// Current virtual time, in milliseconds since runtime creation
    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms
    }

    /// Number of pending timers
    pub fn pending_timers(&self) -> usize {
        self.timers.slots.len()
    }

    /// Advance the virtual clock, firing due timers in deadline order.
    /// Callbacks may schedule further timers; those also fire if their
    /// deadline falls within the advanced window.
    pub fn advance(&mut self, dt: Duration) {
        let target_ms = self.timers.now_ms + dt.as_millis() as u64;
        while let Some(timer) = self.timers.pop_due(target_ms) {
            if timer.deadline_ms > self.timers.now_ms {
                self.timers.now_ms = timer.deadline_ms;
            }
            (timer.callback)(self);
        }
        self.timers.now_ms = target_ms;
    }
}
