// Key bindings - rebindable trigger -> skill dispatch table
// Built once instead of per-listener closures; reverse direction is unique

use crate::input::InputEvent;
use crate::notes::Skill;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw input trigger identifier (a key code from the input collaborator).
pub type KeyCode = u32;

/// Mutable trigger→skill table.
///
/// Several keys may point at one skill (the defaults keep the original's
/// `C`/`V` convenience aliases for the shift skills), but one key never
/// serves two skills: binding a skill to a key owned by another skill
/// unbinds the other. Each skill keeps one primary key for reverse lookup.
///
/// Serializable so a shell can persist it in its own key/value store; the
/// store is an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    by_key: HashMap<KeyCode, Skill>,
    primary: HashMap<Skill, KeyCode>,
}

impl KeyBindings {
    /// Empty table with no triggers bound.
    pub fn empty() -> Self {
        KeyBindings {
            by_key: HashMap::new(),
            primary: HashMap::new(),
        }
    }

    /// Look up the skill bound to a trigger.
    pub fn skill_for(&self, key: KeyCode) -> Option<Skill> {
        self.by_key.get(&key).copied()
    }

    /// The primary trigger bound to a skill, if any.
    pub fn key_for(&self, skill: Skill) -> Option<KeyCode> {
        self.primary.get(&skill).copied()
    }

    /// Bind `skill` to `key` as its primary trigger.
    ///
    /// If `key` currently belongs to a different skill, that skill loses the
    /// key (and its primary binding, when this key was it). The previous
    /// primary key of `skill` is released.
    pub fn bind(&mut self, skill: Skill, key: KeyCode) {
        if let Some(previous) = self.primary.remove(&skill) {
            self.by_key.remove(&previous);
        }

        if let Some(owner) = self.by_key.insert(key, skill)
            && owner != skill
            && self.primary.get(&owner) == Some(&key)
        {
            self.primary.remove(&owner);
        }

        self.primary.insert(skill, key);
    }

    /// Add a secondary trigger for a skill without touching its primary key.
    /// Steals the key from another skill the same way `bind` does.
    pub fn alias(&mut self, skill: Skill, key: KeyCode) {
        if let Some(owner) = self.by_key.insert(key, skill)
            && owner != skill
            && self.primary.get(&owner) == Some(&key)
        {
            self.primary.remove(&owner);
        }
    }

    /// Decode a raw key transition into a skill event, if the key is bound.
    pub fn translate(&self, key: KeyCode, pressed: bool) -> Option<InputEvent> {
        self.skill_for(key)
            .map(|skill| InputEvent { skill, pressed })
    }
}

impl Default for KeyBindings {
    /// The original layout: digit row `1`..`0`, plus `C` and `V` as aliases
    /// for the shift skills.
    fn default() -> Self {
        let mut bindings = KeyBindings::empty();
        bindings.bind(Skill::One, 49);
        bindings.bind(Skill::Two, 50);
        bindings.bind(Skill::Three, 51);
        bindings.bind(Skill::Four, 52);
        bindings.bind(Skill::Five, 53);
        bindings.bind(Skill::Six, 54);
        bindings.bind(Skill::Seven, 55);
        bindings.bind(Skill::Eight, 56);
        bindings.bind(Skill::Nine, 57);
        bindings.bind(Skill::Zero, 48);
        bindings.alias(Skill::Nine, 67); // 'C'
        bindings.alias(Skill::Zero, 86); // 'V'
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let bindings = KeyBindings::default();

        assert_eq!(bindings.skill_for(49), Some(Skill::One));
        assert_eq!(bindings.skill_for(48), Some(Skill::Zero));
        assert_eq!(bindings.key_for(Skill::One), Some(49));

        // Aliases resolve but are not primary
        assert_eq!(bindings.skill_for(67), Some(Skill::Nine));
        assert_eq!(bindings.key_for(Skill::Nine), Some(57));

        assert_eq!(bindings.skill_for(65), None);
    }

    #[test]
    fn test_rebind_steals_key() {
        let mut bindings = KeyBindings::default();

        // Give skill 2 the key that belongs to skill 1
        bindings.bind(Skill::Two, 49);

        assert_eq!(bindings.skill_for(49), Some(Skill::Two));
        assert_eq!(bindings.key_for(Skill::Two), Some(49));
        // Skill 1 lost its trigger entirely
        assert_eq!(bindings.key_for(Skill::One), None);
        // Skill 2's old key is released
        assert_eq!(bindings.skill_for(50), None);
    }

    #[test]
    fn test_translate() {
        let bindings = KeyBindings::default();

        let down = bindings.translate(49, true).unwrap();
        assert_eq!(down, InputEvent::pressed(Skill::One));

        let up = bindings.translate(49, false).unwrap();
        assert_eq!(up, InputEvent::released(Skill::One));

        assert!(bindings.translate(1, true).is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut bindings = KeyBindings::default();
        bindings.bind(Skill::Five, 81);

        let json = serde_json::to_string(&bindings).unwrap();
        let back: KeyBindings = serde_json::from_str(&json).unwrap();

        assert_eq!(back.skill_for(81), Some(Skill::Five));
        assert_eq!(back.key_for(Skill::Five), Some(81));
    }
}
