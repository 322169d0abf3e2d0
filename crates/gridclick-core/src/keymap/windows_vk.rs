//! Windows Virtual-Key ↔ [`Key`] table.
//!
//! VK codes from `WinUser.h`.  Low-level keyboard hooks report side-specific
//! modifier codes (`VK_LSHIFT`, `VK_RMENU`, ...); the generic codes are mapped
//! to the left-hand key for completeness.

use super::{Key, LETTER_KEYS};

const VK_BACK: u8 = 0x08;
const VK_TAB: u8 = 0x09;
const VK_RETURN: u8 = 0x0D;
const VK_SHIFT: u8 = 0x10;
const VK_CONTROL: u8 = 0x11;
const VK_MENU: u8 = 0x12;
const VK_CAPITAL: u8 = 0x14;
const VK_ESCAPE: u8 = 0x1B;
const VK_SPACE: u8 = 0x20;
const VK_A: u8 = 0x41;
const VK_Z: u8 = 0x5A;
const VK_LWIN: u8 = 0x5B;
const VK_RWIN: u8 = 0x5C;
const VK_LSHIFT: u8 = 0xA0;
const VK_RSHIFT: u8 = 0xA1;
const VK_LCONTROL: u8 = 0xA2;
const VK_RCONTROL: u8 = 0xA3;
const VK_LMENU: u8 = 0xA4;
const VK_RMENU: u8 = 0xA5;

/// Translates a VK code to a [`Key`].
///
/// `VK_RETURN` is shared by both Enter keys; pass `extended = true` for the
/// keypad one (the hook's `LLKHF_EXTENDED` flag).
pub fn vk_to_key(vk: u8, extended: bool) -> Key {
    match vk {
        VK_A..=VK_Z => LETTER_KEYS[usize::from(vk - VK_A)],
        VK_BACK => Key::Backspace,
        VK_TAB => Key::Tab,
        VK_RETURN if extended => Key::NumpadEnter,
        VK_RETURN => Key::Enter,
        VK_ESCAPE => Key::Escape,
        VK_SPACE => Key::Space,
        VK_CAPITAL => Key::CapsLock,
        VK_SHIFT | VK_LSHIFT => Key::ShiftLeft,
        VK_RSHIFT => Key::ShiftRight,
        VK_CONTROL | VK_LCONTROL => Key::ControlLeft,
        VK_RCONTROL => Key::ControlRight,
        VK_MENU | VK_LMENU => Key::AltLeft,
        VK_RMENU => Key::AltRight,
        VK_LWIN => Key::MetaLeft,
        VK_RWIN => Key::MetaRight,
        _ => Key::Unknown,
    }
}

/// Translates a [`Key`] to the VK code used when synthesizing it.
pub fn key_to_vk(key: Key) -> Option<u8> {
    if let Some(letter) = key.letter() {
        return Some(VK_A + letter.index());
    }
    let vk = match key {
        Key::Backspace => VK_BACK,
        Key::Tab => VK_TAB,
        Key::Enter | Key::NumpadEnter => VK_RETURN,
        Key::Escape => VK_ESCAPE,
        Key::Space => VK_SPACE,
        Key::CapsLock => VK_CAPITAL,
        Key::ShiftLeft => VK_LSHIFT,
        Key::ShiftRight => VK_RSHIFT,
        Key::ControlLeft => VK_LCONTROL,
        Key::ControlRight => VK_RCONTROL,
        Key::AltLeft => VK_LMENU,
        Key::AltRight => VK_RMENU,
        Key::MetaLeft => VK_LWIN,
        Key::MetaRight => VK_RWIN,
        _ => return None,
    };
    Some(vk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_are_ascii_uppercase_codes() {
        assert_eq!(vk_to_key(b'G', false), Key::KeyG);
        assert_eq!(vk_to_key(b'K', false), Key::KeyK);
        assert_eq!(key_to_vk(Key::KeyC), Some(b'C'));
    }

    #[test]
    fn test_extended_return_is_numpad_enter() {
        assert_eq!(vk_to_key(VK_RETURN, false), Key::Enter);
        assert_eq!(vk_to_key(VK_RETURN, true), Key::NumpadEnter);
    }

    #[test]
    fn test_side_specific_modifiers() {
        assert_eq!(vk_to_key(VK_LMENU, false), Key::AltLeft);
        assert_eq!(vk_to_key(VK_RMENU, true), Key::AltRight);
        assert_eq!(vk_to_key(VK_LWIN, true), Key::MetaLeft);
        assert_eq!(vk_to_key(VK_MENU, false), Key::AltLeft);
    }

    #[test]
    fn test_unmapped_codes_are_unknown() {
        assert_eq!(vk_to_key(0x70, false), Key::Unknown); // VK_F1
        assert_eq!(key_to_vk(Key::Function), None);
    }

    #[test]
    fn test_every_mapped_key_round_trips() {
        for vk in 0u8..=0xFF {
            let key = vk_to_key(vk, false);
            if key == Key::Unknown || matches!(vk, VK_SHIFT | VK_CONTROL | VK_MENU) {
                continue;
            }
            assert_eq!(key_to_vk(key), Some(vk), "VK 0x{vk:02X}");
        }
    }
}
