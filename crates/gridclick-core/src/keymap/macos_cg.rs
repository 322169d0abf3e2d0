//! macOS `CGKeyCode` ↔ [`Key`] table.
//!
//! CGKeyCodes are ANSI key positions from HIToolbox `Events.h` (`kVK_*`).

use super::Key;

/// Translates a macOS virtual keycode to a [`Key`].
pub fn cgkeycode_to_key(code: u16) -> Key {
    match code {
        0x00 => Key::KeyA,
        0x01 => Key::KeyS,
        0x02 => Key::KeyD,
        0x03 => Key::KeyF,
        0x04 => Key::KeyH,
        0x05 => Key::KeyG,
        0x06 => Key::KeyZ,
        0x07 => Key::KeyX,
        0x08 => Key::KeyC,
        0x09 => Key::KeyV,
        0x0B => Key::KeyB,
        0x0C => Key::KeyQ,
        0x0D => Key::KeyW,
        0x0E => Key::KeyE,
        0x0F => Key::KeyR,
        0x10 => Key::KeyY,
        0x11 => Key::KeyT,
        0x1F => Key::KeyO,
        0x20 => Key::KeyU,
        0x22 => Key::KeyI,
        0x23 => Key::KeyP,
        0x25 => Key::KeyL,
        0x26 => Key::KeyJ,
        0x28 => Key::KeyK,
        0x2D => Key::KeyN,
        0x2E => Key::KeyM,

        0x24 => Key::Enter,       // kVK_Return
        0x30 => Key::Tab,         // kVK_Tab
        0x31 => Key::Space,       // kVK_Space
        0x33 => Key::Backspace,   // kVK_Delete
        0x35 => Key::Escape,      // kVK_Escape
        0x4C => Key::NumpadEnter, // kVK_ANSI_KeypadEnter

        0x36 => Key::MetaRight,    // kVK_RightCommand
        0x37 => Key::MetaLeft,     // kVK_Command
        0x38 => Key::ShiftLeft,    // kVK_Shift
        0x39 => Key::CapsLock,     // kVK_CapsLock
        0x3A => Key::AltLeft,      // kVK_Option
        0x3B => Key::ControlLeft,  // kVK_Control
        0x3C => Key::ShiftRight,   // kVK_RightShift
        0x3D => Key::AltRight,     // kVK_RightOption
        0x3E => Key::ControlRight, // kVK_RightControl
        0x3F => Key::Function,     // kVK_Function

        _ => Key::Unknown,
    }
}

/// Translates a [`Key`] back to its macOS virtual keycode.
///
/// Used when synthesizing chords.  Returns `None` for [`Key::Unknown`].
pub fn key_to_cgkeycode(key: Key) -> Option<u16> {
    if key == Key::Unknown {
        return None;
    }
    // Reverse scan of the forward table; every mapped code is below 0x80.
    (0u16..0x80).find(|&code| cgkeycode_to_key(code) == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_row_positions() {
        assert_eq!(cgkeycode_to_key(4), Key::KeyH);
        assert_eq!(cgkeycode_to_key(38), Key::KeyJ);
        assert_eq!(cgkeycode_to_key(40), Key::KeyK);
        assert_eq!(cgkeycode_to_key(37), Key::KeyL);
    }

    #[test]
    fn test_left_command_is_55() {
        assert_eq!(cgkeycode_to_key(55), Key::MetaLeft);
        assert_eq!(key_to_cgkeycode(Key::MetaLeft), Some(55));
    }

    #[test]
    fn test_all_letters_are_mapped() {
        for key in super::super::LETTER_KEYS {
            assert!(key_to_cgkeycode(key).is_some(), "{key:?} has no CGKeyCode");
        }
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(cgkeycode_to_key(0x7A), Key::Unknown); // F1
        assert_eq!(key_to_cgkeycode(Key::Unknown), None);
    }

    #[test]
    fn test_copy_chord_c_key() {
        assert_eq!(key_to_cgkeycode(Key::KeyC), Some(0x08));
    }
}
