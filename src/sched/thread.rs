// Worker-thread scheduler - binary heap of pending tasks behind a condvar
// One thread services every timer; tasks must not block for long

use super::{Clock, Entry, Scheduler, Task, TimerId, TimerTag};
use std::collections::{BinaryHeap, HashSet};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Real monotonic clock, anchored at creation.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

struct State {
    queue: BinaryHeap<Entry>,
    cancelled: HashSet<TimerId>,
    next_id: u64,
    next_seq: u64,
    shutdown: bool,
}

struct Inner {
    state: Mutex<State>,
    wakeup: Condvar,
    origin: Instant,
}

/// Scheduler backed by a single worker thread.
///
/// Tasks run on the worker thread in fire-time order. Cancellation is lazy:
/// cancelled entries stay in the heap and are discarded when they surface.
pub struct ThreadScheduler {
    inner: Arc<Inner>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadScheduler {
    pub fn new() -> Self {
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                queue: BinaryHeap::new(),
                cancelled: HashSet::new(),
                next_id: 0,
                next_seq: 0,
                shutdown: false,
            }),
            wakeup: Condvar::new(),
            origin: Instant::now(),
        });

        let worker_inner = Arc::clone(&inner);
        let worker = std::thread::Builder::new()
            .name("bardbox-timers".to_string())
            .spawn(move || Self::run(worker_inner))
            .expect("failed to spawn timer thread");

        ThreadScheduler {
            inner,
            worker: Some(worker),
        }
    }

    fn run(inner: Arc<Inner>) {
        loop {
            let task = {
                let mut state = inner.state.lock().unwrap();
                loop {
                    if state.shutdown {
                        return;
                    }

                    let now = inner.origin.elapsed();
                    let due = state
                        .queue
                        .peek()
                        .map(|entry| (entry.fire_at, entry.fire_at <= now));

                    match due {
                        None => {
                            state = inner.wakeup.wait(state).unwrap();
                        }
                        Some((_, true)) => {
                            let entry = state.queue.pop().unwrap();
                            if state.cancelled.remove(&entry.id) {
                                continue;
                            }
                            break entry.task;
                        }
                        Some((fire_at, false)) => {
                            let (guard, _) = inner
                                .wakeup
                                .wait_timeout(state, fire_at - now)
                                .unwrap();
                            state = guard;
                        }
                    }
                }
            };

            task();
        }
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn after(&self, delay: Duration, tag: TimerTag, task: Task) -> TimerId {
        let mut state = self.inner.state.lock().unwrap();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let seq = state.next_seq;
        state.next_seq += 1;

        state.queue.push(Entry {
            fire_at: self.inner.origin.elapsed() + delay,
            seq,
            id,
            tag,
            task,
        });
        drop(state);

        self.inner.wakeup.notify_one();
        id
    }

    fn cancel(&self, id: TimerId) {
        let mut state = self.inner.state.lock().unwrap();
        if state.queue.iter().any(|entry| entry.id == id) {
            state.cancelled.insert(id);
        }
    }

    fn cancel_tag(&self, tag: TimerTag) {
        let mut state = self.inner.state.lock().unwrap();
        let ids: Vec<TimerId> = state
            .queue
            .iter()
            .filter(|entry| entry.tag == tag)
            .map(|entry| entry.id)
            .collect();
        state.cancelled.extend(ids);
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        {
            let mut state = self.inner.state.lock().unwrap();
            state.shutdown = true;
        }
        self.inner.wakeup.notify_one();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    #[test]
    fn test_tasks_fire_in_delay_order() {
        let scheduler = ThreadScheduler::new();
        let (tx, rx) = mpsc::channel();

        let tx_late = tx.clone();
        scheduler.after(
            Duration::from_millis(40),
            TimerTag(0),
            Box::new(move || tx_late.send("late").unwrap()),
        );
        scheduler.after(
            Duration::from_millis(5),
            TimerTag(0),
            Box::new(move || tx.send("early").unwrap()),
        );

        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), "early");
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), "late");
    }

    #[test]
    fn test_cancel_tag_drops_pending_tasks() {
        let scheduler = ThreadScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..4 {
            let fired = Arc::clone(&fired);
            scheduler.after(
                Duration::from_millis(50),
                TimerTag(7),
                Box::new(move || {
                    fired.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        scheduler.cancel_tag(TimerTag(7));

        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_single_timer() {
        let scheduler = ThreadScheduler::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_a = Arc::clone(&fired);
        let id = scheduler.after(
            Duration::from_millis(50),
            TimerTag(0),
            Box::new(move || {
                fired_a.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let fired_b = Arc::clone(&fired);
        scheduler.after(
            Duration::from_millis(50),
            TimerTag(0),
            Box::new(move || {
                fired_b.fetch_add(10, Ordering::SeqCst);
            }),
        );

        scheduler.cancel(id);
        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }
}
