use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Keys that never accumulate into the typed-word buffer.
static RESERVED_KEYS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["ctrl", "enter", "capslock", "shift"].into_iter().collect());

/// A raw key event as delivered by the platform hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub name: String,
    pub is_down: bool,
}

impl KeyInput {
    pub fn down(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_down: true,
        }
    }

    pub fn up(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_down: false,
        }
    }

    pub fn classify(&self) -> KeyClass {
        KeyClass::of(&self.name)
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]",
            self.name,
            if self.is_down { "down" } else { "up" }
        )
    }
}

/// What a key-down event means to the keystroke state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// `space` / `enter`: evaluate the buffer (or clipboard selection).
    Commit,
    /// Remove the last accumulated character.
    Backspace,
    /// A single alphanumeric character to accumulate.
    Text(char),
    /// Modifiers, function keys and anything else: no transition.
    Ignored,
}

impl KeyClass {
    pub fn of(name: &str) -> Self {
        match name {
            "space" | "enter" => return KeyClass::Commit,
            "backspace" => return KeyClass::Backspace,
            _ => {}
        }

        if RESERVED_KEYS.contains(name) {
            return KeyClass::Ignored;
        }

        // Only single-character alphanumeric names are typed text; names
        // like "f1" pass isalnum but are not part of a word.
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphanumeric() => KeyClass::Text(c),
            _ => KeyClass::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_keys() {
        assert_eq!(KeyClass::of("space"), KeyClass::Commit);
        assert_eq!(KeyClass::of("enter"), KeyClass::Commit);
    }

    #[test]
    fn test_backspace() {
        assert_eq!(KeyClass::of("backspace"), KeyClass::Backspace);
    }

    #[test]
    fn test_text_keys() {
        assert_eq!(KeyClass::of("a"), KeyClass::Text('a'));
        assert_eq!(KeyClass::of("7"), KeyClass::Text('7'));
        assert_eq!(KeyClass::of("é"), KeyClass::Text('é'));
    }

    #[test]
    fn test_reserved_and_multichar_ignored() {
        assert_eq!(KeyClass::of("ctrl"), KeyClass::Ignored);
        assert_eq!(KeyClass::of("shift"), KeyClass::Ignored);
        assert_eq!(KeyClass::of("capslock"), KeyClass::Ignored);
        assert_eq!(KeyClass::of("f1"), KeyClass::Ignored);
        assert_eq!(KeyClass::of("tab"), KeyClass::Ignored);
        assert_eq!(KeyClass::of("-"), KeyClass::Ignored);
    }

    #[test]
    fn test_key_input_display() {
        assert_eq!(KeyInput::down("a").to_string(), "a[down]");
        assert_eq!(KeyInput::up("space").to_string(), "space[up]");
    }
}
