// Action recorder - appends offset-relative records while a take is active

use crate::notes::Octave;
use crate::sched::Clock;
use crate::session::action::{Action, ActionRecord, Recording};
use std::sync::Arc;
use std::time::Duration;

/// Append-only recorder for the in-memory action log.
///
/// Inactive by default: [`record`](Self::record) is a no-op until
/// [`start`](Self::start) captures the wall-clock origin. The origin is
/// reset exactly when a `StartRecording` record is appended; start/stop
/// alternation is the caller's toggle to guarantee.
pub struct ActionRecorder {
    clock: Arc<dyn Clock>,
    origin: Option<Duration>,
    log: Vec<ActionRecord>,
}

impl ActionRecorder {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        ActionRecorder {
            clock,
            origin: None,
            log: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    /// Begin a take: clear the log, capture the origin, and append the
    /// opening `StartRecording` record at offset 0.
    pub fn start(&mut self, octave: Octave) {
        self.log.clear();
        self.origin = Some(self.clock.now());
        self.log.push(ActionRecord {
            offset_ms: 0,
            action: Action::StartRecording { octave },
        });
    }

    /// Append an action at the current offset. No-op while inactive.
    pub fn record(&mut self, action: Action) {
        let Some(origin) = self.origin else {
            return;
        };
        let offset_ms = self.clock.now().saturating_sub(origin).as_millis() as u64;
        self.log.push(ActionRecord { offset_ms, action });
    }

    /// End the take: append the closing `StopRecording` record and freeze
    /// the log. Returns `None` when no take was active.
    pub fn stop(&mut self) -> Option<Recording> {
        self.origin?;
        self.record(Action::StopRecording);
        self.origin = None;
        Some(Recording::from_actions(std::mem::take(&mut self.log)))
    }

    /// Drop the in-progress take without freezing it.
    pub fn discard(&mut self) {
        self.origin = None;
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::{Note, PitchClass};
    use crate::sched::ManualScheduler;

    fn note_c4() -> Note {
        Note::new(PitchClass::C, 4)
    }

    #[test]
    fn test_inactive_recorder_ignores_records() {
        let clock = Arc::new(ManualScheduler::new());
        let mut recorder = ActionRecorder::new(clock);

        recorder.record(Action::PlayNote { note: note_c4() });
        assert!(!recorder.is_active());
        assert!(recorder.stop().is_none());
    }

    #[test]
    fn test_offsets_are_relative_to_origin() {
        let scheduler = Arc::new(ManualScheduler::new());
        scheduler.advance(Duration::from_millis(5000)); // arbitrary wall-clock skew

        let mut recorder = ActionRecorder::new(scheduler.clone() as Arc<dyn Clock>);
        recorder.start(Octave::default());

        scheduler.advance(Duration::from_millis(50));
        recorder.record(Action::PlayNote { note: note_c4() });

        scheduler.advance(Duration::from_millis(851));
        let recording = recorder.stop().unwrap();

        let offsets: Vec<u64> = recording
            .actions
            .iter()
            .map(|record| record.offset_ms)
            .collect();
        assert_eq!(offsets, vec![0, 50, 901]);

        assert_eq!(
            recording.actions.first().unwrap().action,
            Action::StartRecording {
                octave: Octave::default()
            }
        );
        assert_eq!(
            recording.actions.last().unwrap().action,
            Action::StopRecording
        );
    }

    #[test]
    fn test_restart_resets_origin_and_log() {
        let scheduler = Arc::new(ManualScheduler::new());
        let mut recorder = ActionRecorder::new(scheduler.clone() as Arc<dyn Clock>);

        recorder.start(Octave::default());
        scheduler.advance(Duration::from_millis(100));
        recorder.record(Action::PlayNote { note: note_c4() });

        // Starting again without a stop resets the origin and drops the log.
        recorder.start(Octave::default());
        scheduler.advance(Duration::from_millis(10));
        recorder.record(Action::PlayNote { note: note_c4() });
        let recording = recorder.stop().unwrap();

        let offsets: Vec<u64> = recording
            .actions
            .iter()
            .map(|record| record.offset_ms)
            .collect();
        assert_eq!(offsets, vec![0, 10, 10]);
        assert_eq!(recording.actions.len(), 3);
    }

    #[test]
    fn test_discard_keeps_nothing() {
        let scheduler = Arc::new(ManualScheduler::new());
        let mut recorder = ActionRecorder::new(scheduler.clone() as Arc<dyn Clock>);

        recorder.start(Octave::default());
        recorder.record(Action::PlayNote { note: note_c4() });
        recorder.discard();

        assert!(!recorder.is_active());
        assert!(recorder.stop().is_none());
    }
}
