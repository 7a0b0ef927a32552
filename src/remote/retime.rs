// Orchestra queue - re-times a remote event stream for local playback
//
// Arrival times over the network are useless for playback. What is
// preserved is the spacing between the sender's own timestamps: each event
// is deferred by the previous event's delay plus the source-time delta, so
// the original rhythm is reconstructed no matter how events bunched up in
// transit.

use crate::audio::AudioSink;
use crate::messaging::channels::RemoteConsumer;
use crate::notes::resolver::{resolve, Resolved};
use crate::sched::{Scheduler, TimerTag};
use ringbuf::traits::Consumer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// Cancellation group for orchestra polling and deferred plays.
pub const ORCHESTRA_TAG: TimerTag = TimerTag(2);

/// Tunables for the re-timing loop.
#[derive(Debug, Clone, Copy)]
pub struct RetimePolicy {
    /// How often the inbox is drained.
    pub poll_interval: Duration,
    /// At most this many events are scheduled per drain.
    pub drain_batch: usize,
    /// When a drain finds more than `drain_batch` events, drop the oldest
    /// surplus instead of letting playback fall behind the stream.
    pub drop_backlog: bool,
}

impl Default for RetimePolicy {
    fn default() -> Self {
        RetimePolicy {
            poll_interval: Duration::from_millis(50),
            drain_batch: 5,
            drop_backlog: true,
        }
    }
}

struct RetimeState {
    /// Source timestamp of the last event scheduled, if any.
    prev_time: Option<u64>,
    /// Delay the last event was scheduled under.
    prev_delay: Duration,
    volume: f32,
}

/// Plays a remote event stream through a local sink.
///
/// Every event advances the timing baseline, but only `skill_down` events
/// that resolve to a note make a sound; octave sentinels and releases are
/// pure timing information here because the sender already applied them.
pub struct OrchestraQueue<A: AudioSink + 'static> {
    /// Self-handle for the re-arming poll task.
    weak: Weak<Self>,
    scheduler: Arc<dyn Scheduler>,
    audio: Arc<Mutex<A>>,
    inbox: Mutex<RemoteConsumer>,
    state: Mutex<RetimeState>,
    policy: RetimePolicy,
    running: AtomicBool,
}

impl<A: AudioSink + 'static> OrchestraQueue<A> {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        audio: Arc<Mutex<A>>,
        inbox: RemoteConsumer,
    ) -> Arc<Self> {
        Self::with_policy(scheduler, audio, inbox, RetimePolicy::default())
    }

    pub fn with_policy(
        scheduler: Arc<dyn Scheduler>,
        audio: Arc<Mutex<A>>,
        inbox: RemoteConsumer,
        policy: RetimePolicy,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| OrchestraQueue {
            weak: weak.clone(),
            scheduler,
            audio,
            inbox: Mutex::new(inbox),
            state: Mutex::new(RetimeState {
                prev_time: None,
                prev_delay: Duration::ZERO,
                volume: 1.0,
            }),
            policy,
            running: AtomicBool::new(false),
        })
    }

    /// Begin polling the inbox. Drains once immediately, then every
    /// `poll_interval`. No-op if already running.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.tick();
    }

    /// Stop polling and cancel every deferred play that has not fired yet.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.scheduler.cancel_tag(ORCHESTRA_TAG);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_volume(&self, volume: f32) {
        self.state.lock().unwrap().volume = volume.clamp(0.0, 1.0);
    }

    fn tick(&self) {
        if !self.running.load(Ordering::SeqCst) {
            return;
        }
        self.drain();

        if let Some(queue) = self.weak.upgrade() {
            self.scheduler.after(
                self.policy.poll_interval,
                ORCHESTRA_TAG,
                Box::new(move || queue.tick()),
            );
        }
    }

    /// Pull everything queued since the last tick and schedule it.
    fn drain(&self) {
        let mut picks = {
            let mut inbox = self.inbox.lock().unwrap();
            let mut events = Vec::new();
            while let Some(event) = inbox.try_pop() {
                events.push(event);
            }
            events
        };
        if picks.is_empty() {
            return;
        }

        if self.policy.drop_backlog && picks.len() > self.policy.drain_batch {
            let dropped = picks.len() - self.policy.drain_batch;
            log::warn!("orchestra backlog: dropping {dropped} stale events");
            picks.drain(..dropped);
        }

        let mut state = self.state.lock().unwrap();
        for pick in picks {
            // A sender clock that steps backwards collapses the gap to zero
            // rather than scheduling into the past.
            let delta = match state.prev_time {
                Some(prev) => Duration::from_millis(pick.time.saturating_sub(prev)),
                None => Duration::ZERO,
            };
            let delay = state.prev_delay + delta;
            state.prev_time = Some(pick.time);
            state.prev_delay = delay;

            if !pick.skill_down {
                continue;
            }
            if let Some(Resolved::Note(note)) = resolve(pick.skill, pick.octave) {
                let audio = Arc::clone(&self.audio);
                let volume = state.volume;
                self.scheduler.after(
                    delay,
                    ORCHESTRA_TAG,
                    Box::new(move || audio.lock().unwrap().play(note, volume)),
                );
            }
        }
    }
}
