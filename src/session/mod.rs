// Session core - activation state machine, action recorder, replay player

pub mod action;
pub mod activation;
pub mod player;
pub mod recorder;

pub use action::{Action, ActionRecord, FormatVersion, Recording};
pub use activation::InstrumentSession;
pub use player::{ReplayError, ReplayMode, ReplayPlayer, PLAYBACK_TAG};
pub use recorder::ActionRecorder;

use crate::messaging::{channels::CommandConsumer, Command, Notification};
use crate::notes::{Octave, Skill};
use ringbuf::traits::Consumer;

/// Observational UI collaborator.
///
/// Implementations must never block the core; everything here is
/// fire-and-forget with no return value.
pub trait UiNotifier: Send {
    /// A skill's "active" indicator toggled.
    fn skill_active(&mut self, skill: Skill, active: bool);

    /// The ambient octave changed (already clamped).
    fn octave_changed(&mut self, octave: Octave);

    /// Playback finished or was cancelled; reset playback affordances.
    fn playback_stopped(&mut self) {}

    /// An operation failed or degraded; purely informational.
    fn notify(&mut self, notification: Notification) {
        let _ = notification;
    }
}

/// Notifier that ignores everything, for headless use and tests.
#[derive(Debug, Default)]
pub struct NullUi;

impl UiNotifier for NullUi {
    fn skill_active(&mut self, _skill: Skill, _active: bool) {}

    fn octave_changed(&mut self, _octave: Octave) {}
}

/// Drain every queued shell command into the session. Returns how many
/// commands were handled.
pub fn pump_commands<A, U>(
    commands: &mut CommandConsumer,
    session: &mut InstrumentSession<A, U>,
) -> usize
where
    A: crate::audio::AudioSink,
    U: UiNotifier,
{
    let mut handled = 0;
    while let Some(command) = commands.try_pop() {
        match command {
            Command::Input(event) => session.handle_input(event),
            Command::SetVolume(volume) => session.set_volume(volume),
            Command::ToggleRecording => {
                session.toggle_recording();
            }
        }
        handled += 1;
    }
    handled
}
