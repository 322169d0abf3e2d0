//! Physical key identities and the platform translation tables.
//!
//! The state machine only ever sees [`Key`], a closed enumeration of the keys
//! it reacts to.  Platform interceptors translate their native codes at the
//! capture boundary; anything not listed becomes [`Key::Unknown`].
//!
//! Letters are physical US-layout positions, not characters: the key under
//! the `G` keycap is `KeyG` whatever layout the user has selected.

pub mod bindings;
pub mod linux_x11;
pub mod macos_cg;
pub mod windows_vk;

use crate::domain::grid::Letter;

/// A physical key the overlay knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,

    Escape,
    Backspace,
    Enter,
    NumpadEnter,
    Space,
    Tab,

    ControlLeft,
    ControlRight,
    ShiftLeft,
    ShiftRight,
    AltLeft,
    AltRight,
    MetaLeft,
    MetaRight,
    CapsLock,
    Function,

    /// Any key without an entry in the tables.
    Unknown,
}

/// Letter keys in label order, `A` (index 0) through `Z` (index 25).
pub const LETTER_KEYS: [Key; 26] = [
    Key::KeyA,
    Key::KeyB,
    Key::KeyC,
    Key::KeyD,
    Key::KeyE,
    Key::KeyF,
    Key::KeyG,
    Key::KeyH,
    Key::KeyI,
    Key::KeyJ,
    Key::KeyK,
    Key::KeyL,
    Key::KeyM,
    Key::KeyN,
    Key::KeyO,
    Key::KeyP,
    Key::KeyQ,
    Key::KeyR,
    Key::KeyS,
    Key::KeyT,
    Key::KeyU,
    Key::KeyV,
    Key::KeyW,
    Key::KeyX,
    Key::KeyY,
    Key::KeyZ,
];

impl Key {
    /// The grid label letter printed on this key, if it is a letter key.
    pub fn letter(self) -> Option<Letter> {
        let index = LETTER_KEYS.iter().position(|&k| k == self)?;
        Letter::from_index(index as u8)
    }

    /// The key carrying `letter`.
    pub fn from_letter(letter: Letter) -> Key {
        LETTER_KEYS[usize::from(letter.index())]
    }

    /// Modifier keys arrive as flags-changed events rather than key down/up.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::ControlLeft
                | Key::ControlRight
                | Key::ShiftLeft
                | Key::ShiftRight
                | Key::AltLeft
                | Key::AltRight
                | Key::MetaLeft
                | Key::MetaRight
                | Key::CapsLock
                | Key::Function
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_letter_key_round_trips_through_letter() {
        for (i, key) in LETTER_KEYS.iter().enumerate() {
            let letter = key.letter().expect("letter key");
            assert_eq!(usize::from(letter.index()), i);
            assert_eq!(Key::from_letter(letter), *key);
        }
    }

    #[test]
    fn test_non_letter_keys_have_no_letter() {
        assert_eq!(Key::Space.letter(), None);
        assert_eq!(Key::MetaLeft.letter(), None);
        assert_eq!(Key::Unknown.letter(), None);
    }

    #[test]
    fn test_modifier_classification() {
        assert!(Key::MetaLeft.is_modifier());
        assert!(Key::AltLeft.is_modifier());
        assert!(Key::CapsLock.is_modifier());
        assert!(!Key::Escape.is_modifier());
        assert!(!Key::KeyV.is_modifier());
    }
}
