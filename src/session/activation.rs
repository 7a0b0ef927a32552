// Activation state machine - held-skill tracking, octave shifts, playback
// Owns the state the original kept in page-level globals

use crate::audio::AudioSink;
use crate::input::InputEvent;
use crate::messaging::{Notification, NotificationCategory};
use crate::notes::resolver::{self, Resolved};
use crate::notes::{Note, Octave, Skill};
use crate::sched::Clock;
use crate::session::action::{Action, Recording};
use crate::session::recorder::ActionRecorder;
use crate::session::UiNotifier;
use crate::store::{RecordingId, RecordingStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Per-skill activation state plus the ambient octave, volume, and recorder.
///
/// A skill is `Held` iff it has an entry in the active map; release events
/// are trusted as authoritative regardless of physical key state. Duplicate
/// activations (key repeat) are suppressed by the presence check, the
/// correctness-critical invariant of this component.
pub struct InstrumentSession<A: AudioSink, U: UiNotifier> {
    /// skill -> activation instant; presence means "held".
    active: HashMap<Skill, Duration>,
    octave: Octave,
    volume: f32,
    recorder: ActionRecorder,
    last_recording: Option<Recording>,
    clock: Arc<dyn Clock>,
    audio: A,
    ui: U,
}

impl<A: AudioSink, U: UiNotifier> InstrumentSession<A, U> {
    pub fn new(clock: Arc<dyn Clock>, audio: A, ui: U) -> Self {
        InstrumentSession {
            active: HashMap::new(),
            octave: Octave::default(),
            volume: 1.0,
            recorder: ActionRecorder::new(Arc::clone(&clock)),
            last_recording: None,
            clock,
            audio,
            ui,
        }
    }

    pub fn octave(&self) -> Octave {
        self.octave
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn is_held(&self, skill: Skill) -> bool {
        self.active.contains_key(&skill)
    }

    /// Transition a skill to `Held`.
    ///
    /// No-op while already held. The skill is marked held (and the UI
    /// notified) before resolution, so an unresolvable pair still suppresses
    /// key repeat. Shift sentinels change the ambient octave and never play
    /// audio; notes play through the sink and are recorded.
    pub fn activate(&mut self, skill: Skill) {
        if self.active.contains_key(&skill) {
            return;
        }
        self.active.insert(skill, self.clock.now());
        self.ui.skill_active(skill, true);

        let Some(resolved) = resolver::resolve(skill, self.octave) else {
            // Unknown pair: silent no-op, the skill stays held.
            return;
        };

        match resolved {
            Resolved::Shift(shift) => {
                self.apply_octave(self.octave.shifted(shift));
            }
            Resolved::Note(note) => {
                self.sound_note(note);
                self.recorder.record(Action::SkillActivated {
                    skill,
                    octave: self.octave,
                });
            }
        }
    }

    /// Transition a skill to `Idle`. No-op while idle; a stale octave
    /// mismatch still counts as a successful deactivation.
    pub fn deactivate(&mut self, skill: Skill) {
        if self.active.remove(&skill).is_none() {
            return;
        }
        self.ui.skill_active(skill, false);
        self.recorder.record(Action::SkillDeactivated {
            skill,
            octave: self.octave,
        });
    }

    /// Apply a decoded input event.
    pub fn handle_input(&mut self, event: InputEvent) {
        if event.pressed {
            self.activate(event.skill);
        } else {
            self.deactivate(event.skill);
        }
    }

    /// Sound a note at the current volume and record it.
    pub(crate) fn sound_note(&mut self, note: Note) {
        self.audio.play(note, self.volume);
        self.recorder.record(Action::PlayNote { note });
    }

    /// Set the ambient octave (already clamped by construction), record the
    /// change, and notify the UI. Runs even when the value is unchanged -
    /// a shift at the boundary still re-notifies, as the original did.
    pub(crate) fn apply_octave(&mut self, octave: Octave) {
        self.octave = octave;
        self.recorder.record(Action::ChangeOctave { octave });
        self.ui.octave_changed(octave);
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_active()
    }

    /// Begin a take at the current octave.
    pub fn start_recording(&mut self) {
        self.recorder.start(self.octave);
    }

    /// Stop the take, freeze it, and keep it for persisting.
    pub fn stop_recording(&mut self) -> Option<Recording> {
        let recording = self.recorder.stop()?;
        self.last_recording = Some(recording.clone());
        Some(recording)
    }

    /// Start or stop recording; returns the frozen take on stop.
    pub fn toggle_recording(&mut self) -> Option<Recording> {
        if self.is_recording() {
            self.stop_recording()
        } else {
            self.start_recording();
            None
        }
    }

    /// The most recent frozen take, kept until persisted or replaced.
    pub fn last_recording(&self) -> Option<&Recording> {
        self.last_recording.as_ref()
    }

    /// Persist the last take. On failure the take stays in memory so the
    /// save can be retried; the error is also reported through the UI.
    pub fn persist_recording<S: RecordingStore>(
        &mut self,
        store: &mut S,
    ) -> Result<RecordingId, StoreError> {
        let Some(recording) = self.last_recording.as_ref() else {
            return Err(StoreError::NothingToSave);
        };

        match store.save(recording) {
            Ok(id) => Ok(id),
            Err(err) => {
                self.ui.notify(Notification::error(
                    NotificationCategory::Storage,
                    format!("failed to save recording: {err}"),
                ));
                Err(err)
            }
        }
    }

    pub(crate) fn notify_playback_stopped(&mut self) {
        self.ui.playback_stopped();
    }

    pub(crate) fn report(&mut self, notification: Notification) {
        self.ui.notify(notification);
    }
}
