// Virtual-clock scheduler for deterministic tests
// Time only moves when the test calls advance(); due tasks run on the
// caller's thread at their exact fire time

use super::{Clock, Entry, Scheduler, Task, TimerId, TimerTag};
use std::collections::{BinaryHeap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

struct ManualState {
    now: Duration,
    queue: BinaryHeap<Entry>,
    cancelled: HashSet<TimerId>,
    next_id: u64,
    next_seq: u64,
}

/// Scheduler driven by a virtual clock.
///
/// `advance` pops every task due up to the target instant and runs it with
/// the clock set to its fire time, so tasks that re-arm themselves (the
/// orchestra poll) or read the clock observe exact virtual timestamps.
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        ManualScheduler {
            state: Mutex::new(ManualState {
                now: Duration::ZERO,
                queue: BinaryHeap::new(),
                cancelled: HashSet::new(),
                next_id: 0,
                next_seq: 0,
            }),
        }
    }

    /// Move the clock forward by `step`, running every task that comes due.
    pub fn advance(&self, step: Duration) {
        let target = self.state.lock().unwrap().now + step;

        loop {
            // Tasks run outside the lock: they may schedule or cancel.
            let task = {
                let mut state = self.state.lock().unwrap();
                let due = state
                    .queue
                    .peek()
                    .is_some_and(|entry| entry.fire_at <= target);

                if !due {
                    state.now = target;
                    None
                } else {
                    let entry = state.queue.pop().unwrap();
                    if state.cancelled.remove(&entry.id) {
                        continue;
                    }
                    state.now = entry.fire_at;
                    Some(entry.task)
                }
            };

            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Number of tasks still pending (cancelled ones excluded).
    pub fn pending(&self) -> usize {
        let state = self.state.lock().unwrap();
        state
            .queue
            .iter()
            .filter(|entry| !state.cancelled.contains(&entry.id))
            .count()
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualScheduler {
    fn now(&self) -> Duration {
        self.state.lock().unwrap().now
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, tag: TimerTag, task: Task) -> TimerId {
        let mut state = self.state.lock().unwrap();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let seq = state.next_seq;
        state.next_seq += 1;
        let fire_at = state.now + delay;

        state.queue.push(Entry {
            fire_at,
            seq,
            id,
            tag,
            task,
        });
        id
    }

    fn cancel(&self, id: TimerId) {
        let mut state = self.state.lock().unwrap();
        if state.queue.iter().any(|entry| entry.id == id) {
            state.cancelled.insert(id);
        }
    }

    fn cancel_tag(&self, tag: TimerTag) {
        let mut state = self.state.lock().unwrap();
        let ids: Vec<TimerId> = state
            .queue
            .iter()
            .filter(|entry| entry.tag == tag)
            .map(|entry| entry.id)
            .collect();
        state.cancelled.extend(ids);
    }
}
