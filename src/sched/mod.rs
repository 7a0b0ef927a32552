// Deferred-callback scheduling capability
// Playback and the orchestra queue depend only on these traits, which keeps
// their timing testable against a virtual clock

pub mod manual;
pub mod thread;

pub use manual::ManualScheduler;
pub use thread::{MonotonicClock, ThreadScheduler};

use std::cmp::Ordering;
use std::time::Duration;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle for one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

/// Cancellation group for scheduled tasks. Each subsystem schedules under
/// its own tag so it can cancel all of its pending work in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTag(pub u32);

/// Monotonic time source. Values are durations since an arbitrary fixed
/// origin; only differences are meaningful.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Fire-after-a-relative-delay primitive.
///
/// Relative ordering is respected for non-equal delays; tasks scheduled for
/// the same instant fire in submission order.
pub trait Scheduler: Send + Sync {
    /// Schedule `task` to run `delay` from now under `tag`.
    fn after(&self, delay: Duration, tag: TimerTag, task: Task) -> TimerId;

    /// Cancel one pending task. No-op if it already fired.
    fn cancel(&self, id: TimerId);

    /// Cancel every pending task scheduled under `tag`.
    fn cancel_tag(&self, tag: TimerTag);
}

/// Pending task ordered for a min-heap on (fire_at, seq).
pub(crate) struct Entry {
    pub(crate) fire_at: Duration,
    pub(crate) seq: u64,
    pub(crate) id: TimerId,
    pub(crate) tag: TimerTag,
    pub(crate) task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the earliest entry, FIFO on ties.
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
