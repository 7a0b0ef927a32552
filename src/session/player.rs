// Playback scheduler - replays a stored action log with faithful timing
// Each record is scheduled independently against one playback-start instant,
// so timing never accumulates drift across records

use crate::audio::AudioSink;
use crate::messaging::{Notification, NotificationCategory};
use crate::sched::{Scheduler, TimerTag};
use crate::session::action::{Action, Recording};
use crate::session::activation::InstrumentSession;
use crate::session::UiNotifier;
use crate::store::{serialization, RecordingId, RecordingStore, StoreError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Cancellation tag for all pending playback tasks.
pub const PLAYBACK_TAG: TimerTag = TimerTag(1);

/// How a stored log is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// Re-sound `PlayNote` records directly through the audio sink.
    Audio,
    /// Re-drive the activation state machine with the recorded
    /// activations/deactivations, exercising the same suppression and
    /// visual-feedback path a live user would.
    Live,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Schedules one deferred task per action record.
///
/// A generation counter makes cancellation atomic: `stop` bumps it while
/// holding the session mutex, and every task re-checks it under the same
/// mutex before acting, so a cancelled playback never fires a stray note.
/// A side effect already handed to the sink is not retroactively silenced.
pub struct ReplayPlayer<A: AudioSink + 'static, U: UiNotifier + 'static> {
    scheduler: Arc<dyn Scheduler>,
    session: Arc<Mutex<InstrumentSession<A, U>>>,
    generation: Arc<AtomicU64>,
    playing: Arc<AtomicBool>,
    /// Whether non-live playback replays octave changes. Live mode always
    /// applies them because it re-drives the state machine.
    replay_octaves: bool,
}

impl<A: AudioSink, U: UiNotifier> ReplayPlayer<A, U> {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        session: Arc<Mutex<InstrumentSession<A, U>>>,
    ) -> Self {
        ReplayPlayer {
            scheduler,
            session,
            generation: Arc::new(AtomicU64::new(0)),
            playing: Arc::new(AtomicBool::new(false)),
            replay_octaves: false,
        }
    }

    /// Opt non-live playback into replaying octave-shift records.
    pub fn set_replay_octaves(&mut self, enabled: bool) {
        self.replay_octaves = enabled;
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// Start replaying `recording`. A malformed log aborts before any record
    /// is scheduled; an in-progress playback is cancelled first.
    pub fn play(&self, recording: &Recording, mode: ReplayMode) -> Result<(), ReplayError> {
        if let Err(err) = serialization::validate_recording(recording) {
            let mut session = self.session.lock().unwrap();
            session.report(Notification::error(
                NotificationCategory::Playback,
                format!("cannot replay recording: {err}"),
            ));
            return Err(err.into());
        }

        if self.is_playing() {
            self.stop();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.playing.store(true, Ordering::SeqCst);

        for record in &recording.actions {
            let action = record.action;

            let wanted = match (mode, action) {
                (_, Action::Unknown) => {
                    log::warn!(
                        "skipping action of unrecognized kind at +{}ms",
                        record.offset_ms
                    );
                    self.session.lock().unwrap().report(Notification::warning(
                        NotificationCategory::Playback,
                        format!("skipping unrecognized action at +{}ms", record.offset_ms),
                    ));
                    false
                }
                (_, Action::StopRecording) => true,
                (ReplayMode::Audio, Action::PlayNote { .. }) => true,
                (ReplayMode::Audio, Action::ChangeOctave { .. })
                | (ReplayMode::Audio, Action::StartRecording { .. }) => self.replay_octaves,
                (ReplayMode::Audio, _) => false,
                (ReplayMode::Live, Action::PlayNote { .. }) => false,
                (ReplayMode::Live, _) => true,
            };
            if !wanted {
                continue;
            }

            let session = Arc::clone(&self.session);
            let generation_counter = Arc::clone(&self.generation);
            let playing = Arc::clone(&self.playing);
            let scheduler = Arc::clone(&self.scheduler);

            self.scheduler.after(
                Duration::from_millis(record.offset_ms),
                PLAYBACK_TAG,
                Box::new(move || {
                    let mut session = session.lock().unwrap();
                    if generation_counter.load(Ordering::SeqCst) != generation {
                        // Cancelled or superseded while this task was queued.
                        return;
                    }

                    match action {
                        Action::PlayNote { note } => session.sound_note(note),
                        Action::SkillActivated { skill, .. } => session.activate(skill),
                        Action::SkillDeactivated { skill, .. } => session.deactivate(skill),
                        Action::ChangeOctave { octave }
                        | Action::StartRecording { octave } => session.apply_octave(octave),
                        Action::StopRecording => {
                            generation_counter.fetch_add(1, Ordering::SeqCst);
                            playing.store(false, Ordering::SeqCst);
                            scheduler.cancel_tag(PLAYBACK_TAG);
                            session.notify_playback_stopped();
                        }
                        Action::Unknown => {}
                    }
                }),
            );
        }

        Ok(())
    }

    /// Load a stored recording and replay it. A load or decode failure is
    /// reported and aborts before any record fires.
    pub fn play_stored<S: RecordingStore>(
        &self,
        store: &S,
        id: RecordingId,
        mode: ReplayMode,
    ) -> Result<(), ReplayError> {
        match store.load(id) {
            Ok(recording) => self.play(&recording, mode),
            Err(err) => {
                let mut session = self.session.lock().unwrap();
                session.report(Notification::error(
                    NotificationCategory::Storage,
                    format!("failed to load recording {id}: {err}"),
                ));
                Err(err.into())
            }
        }
    }

    /// Cancel every pending task of the current playback. Atomic with
    /// respect to task firing: after this returns, no further record from
    /// the cancelled session can act.
    pub fn stop(&self) {
        let mut session = self.session.lock().unwrap();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.scheduler.cancel_tag(PLAYBACK_TAG);
        self.playing.store(false, Ordering::SeqCst);
        session.notify_playback_stopped();
    }

    /// Toggle semantics: stopping early is done by triggering play again.
    pub fn toggle(&self, recording: &Recording, mode: ReplayMode) -> Result<(), ReplayError> {
        if self.is_playing() {
            self.stop();
            Ok(())
        } else {
            self.play(recording, mode)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioSink, NullSink};
    use crate::messaging::NotificationLevel;
    use crate::notes::{Note, Octave, PitchClass, Skill};
    use crate::sched::{Clock, ManualScheduler};
    use crate::session::action::ActionRecord;
    use crate::session::NullUi;

    struct TimedSink {
        clock: Arc<ManualScheduler>,
        played: Arc<Mutex<Vec<(Duration, Note)>>>,
    }

    impl AudioSink for TimedSink {
        fn play(&mut self, note: Note, _volume: f32) {
            self.played.lock().unwrap().push((self.clock.now(), note));
        }
    }

    fn fixture() -> (
        Arc<ManualScheduler>,
        Arc<Mutex<InstrumentSession<TimedSink, NullUi>>>,
        ReplayPlayer<TimedSink, NullUi>,
        Arc<Mutex<Vec<(Duration, Note)>>>,
    ) {
        let scheduler = Arc::new(ManualScheduler::new());
        let played = Arc::new(Mutex::new(Vec::new()));
        let session = Arc::new(Mutex::new(InstrumentSession::new(
            scheduler.clone() as Arc<dyn Clock>,
            TimedSink {
                clock: Arc::clone(&scheduler),
                played: Arc::clone(&played),
            },
            NullUi,
        )));
        let player = ReplayPlayer::new(
            scheduler.clone() as Arc<dyn Scheduler>,
            Arc::clone(&session),
        );
        (scheduler, session, player, played)
    }

    fn stored_sequence() -> Recording {
        Recording::from_actions(vec![
            ActionRecord {
                offset_ms: 0,
                action: Action::StartRecording {
                    octave: Octave::default(),
                },
            },
            ActionRecord {
                offset_ms: 50,
                action: Action::PlayNote {
                    note: Note::new(PitchClass::C, 4),
                },
            },
            ActionRecord {
                offset_ms: 50,
                action: Action::SkillActivated {
                    skill: Skill::One,
                    octave: Octave::default(),
                },
            },
            ActionRecord {
                offset_ms: 900,
                action: Action::SkillDeactivated {
                    skill: Skill::One,
                    octave: Octave::default(),
                },
            },
            ActionRecord {
                offset_ms: 901,
                action: Action::StopRecording,
            },
        ])
    }

    #[test]
    fn test_audio_mode_replays_notes_at_recorded_offsets() {
        let (scheduler, _session, player, played) = fixture();

        player.play(&stored_sequence(), ReplayMode::Audio).unwrap();
        scheduler.advance(Duration::from_millis(2000));

        // C4 once at +50ms, nothing after +901ms, all timers cleared
        assert_eq!(
            *played.lock().unwrap(),
            vec![(Duration::from_millis(50), Note::new(PitchClass::C, 4))]
        );
        assert_eq!(scheduler.pending(), 0);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_live_mode_drives_state_machine() {
        let (scheduler, session, player, played) = fixture();

        player.play(&stored_sequence(), ReplayMode::Live).unwrap();

        scheduler.advance(Duration::from_millis(60));
        assert!(session.lock().unwrap().is_held(Skill::One));
        // Activation resolved and sounded through the same path as live play
        assert_eq!(played.lock().unwrap().len(), 1);

        scheduler.advance(Duration::from_millis(1000));
        assert!(!session.lock().unwrap().is_held(Skill::One));
        assert_eq!(played.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_stop_cancels_pending_records() {
        let (scheduler, _session, player, played) = fixture();

        player.play(&stored_sequence(), ReplayMode::Audio).unwrap();
        scheduler.advance(Duration::from_millis(60));
        assert_eq!(played.lock().unwrap().len(), 1);

        player.stop();
        scheduler.advance(Duration::from_millis(5000));

        assert_eq!(played.lock().unwrap().len(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_restart_supersedes_previous_session() {
        let (scheduler, _session, player, played) = fixture();

        player.play(&stored_sequence(), ReplayMode::Audio).unwrap();
        scheduler.advance(Duration::from_millis(60));

        // Toggling play while playing stops; toggling again restarts.
        player.toggle(&stored_sequence(), ReplayMode::Audio).unwrap();
        assert!(!player.is_playing());
        player.toggle(&stored_sequence(), ReplayMode::Audio).unwrap();
        scheduler.advance(Duration::from_millis(2000));

        // One note from the first session, one from the restarted one
        assert_eq!(played.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_recording_aborts_before_any_record() {
        let (scheduler, _session, player, played) = fixture();

        // First record is not StartRecording
        let malformed = Recording::from_actions(vec![ActionRecord {
            offset_ms: 0,
            action: Action::StopRecording,
        }]);

        assert!(player.play(&malformed, ReplayMode::Audio).is_err());
        assert_eq!(scheduler.pending(), 0);
        scheduler.advance(Duration::from_millis(100));
        assert!(played.lock().unwrap().is_empty());
        assert!(!player.is_playing());
    }

    #[test]
    fn test_unknown_kind_is_skipped_not_fatal() {
        let (scheduler, _session, player, played) = fixture();

        let mut recording = stored_sequence();
        recording.actions.insert(
            1,
            ActionRecord {
                offset_ms: 10,
                action: Action::Unknown,
            },
        );

        player.play(&recording, ReplayMode::Audio).unwrap();
        scheduler.advance(Duration::from_millis(2000));
        assert_eq!(played.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_kind_is_reported_as_a_warning() {
        struct NotifyUi {
            notifications: Arc<Mutex<Vec<Notification>>>,
        }

        impl UiNotifier for NotifyUi {
            fn skill_active(&mut self, _skill: Skill, _active: bool) {}

            fn octave_changed(&mut self, _octave: Octave) {}

            fn notify(&mut self, notification: Notification) {
                self.notifications.lock().unwrap().push(notification);
            }
        }

        let scheduler = Arc::new(ManualScheduler::new());
        let notifications = Arc::new(Mutex::new(Vec::new()));
        let session = Arc::new(Mutex::new(InstrumentSession::new(
            scheduler.clone() as Arc<dyn Clock>,
            NullSink,
            NotifyUi {
                notifications: Arc::clone(&notifications),
            },
        )));
        let player = ReplayPlayer::new(
            scheduler.clone() as Arc<dyn Scheduler>,
            Arc::clone(&session),
        );

        let mut recording = stored_sequence();
        recording.actions.insert(
            1,
            ActionRecord {
                offset_ms: 10,
                action: Action::Unknown,
            },
        );

        player.play(&recording, ReplayMode::Audio).unwrap();
        scheduler.advance(Duration::from_millis(2000));

        let notifications = notifications.lock().unwrap();
        assert!(notifications.iter().any(|notification| {
            notification.level == NotificationLevel::Warning
                && notification.category == NotificationCategory::Playback
        }));
    }

    #[test]
    fn test_non_live_octave_replay_is_a_policy_flag() {
        let (scheduler, session, mut player_owner, _played) = fixture();

        let recording = Recording::from_actions(vec![
            ActionRecord {
                offset_ms: 0,
                action: Action::StartRecording {
                    octave: Octave::default(),
                },
            },
            ActionRecord {
                offset_ms: 10,
                action: Action::ChangeOctave {
                    octave: Octave::new(0).unwrap(),
                },
            },
            ActionRecord {
                offset_ms: 20,
                action: Action::StopRecording,
            },
        ]);

        // Default: non-live playback ignores octave-shift replay
        player_owner.play(&recording, ReplayMode::Audio).unwrap();
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(session.lock().unwrap().octave().value(), 1);

        player_owner.set_replay_octaves(true);
        player_owner.play(&recording, ReplayMode::Audio).unwrap();
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(session.lock().unwrap().octave().value(), 0);
    }
}
