// Input boundary - raw trigger codes decoded into skill events
// Hardware/DOM specifics stay outside; the core only sees InputEvent

pub mod bindings;

pub use bindings::{KeyBindings, KeyCode};

use crate::notes::Skill;

/// A discrete skill press/release delivered by the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub skill: Skill,
    pub pressed: bool,
}

impl InputEvent {
    pub fn pressed(skill: Skill) -> Self {
        InputEvent {
            skill,
            pressed: true,
        }
    }

    pub fn released(skill: Skill) -> Self {
        InputEvent {
            skill,
            pressed: false,
        }
    }
}
