//! X11 KeySym ↔ [`Key`] table.
//!
//! KeySym values from `X11/keysymdef.h`.  The X11 capture path resolves each
//! hardware keycode to the keysym at group 0, level 0 (the unshifted symbol),
//! so letters arrive as their lowercase keysyms.  Uppercase keysyms are
//! accepted as well for layouts that only publish a shifted symbol.
//!
//! # Why keysyms and not keycodes? (for beginners)
//!
//! An X11 *keycode* is whatever number the server's keyboard driver assigns
//! to a physical key (evdev scancode + 8 on most modern systems, but not
//! guaranteed).  The server publishes a per-keycode list of *keysyms*, and
//! that list is the only portable way to learn which key is which.  When we
//! synthesize a key we go the other way with `XKeysymToKeycode`.

use super::{Key, LETTER_KEYS};

const XK_SPACE: u32 = 0x0020;
const XK_UPPER_A: u32 = 0x0041;
const XK_UPPER_Z: u32 = 0x005A;
const XK_A: u32 = 0x0061;
const XK_Z: u32 = 0x007A;
const XK_ISO_LEVEL3_SHIFT: u32 = 0xFE03;
const XK_BACKSPACE: u32 = 0xFF08;
const XK_TAB: u32 = 0xFF09;
const XK_RETURN: u32 = 0xFF0D;
const XK_ESCAPE: u32 = 0xFF1B;
const XK_KP_ENTER: u32 = 0xFF8D;
const XK_SHIFT_L: u32 = 0xFFE1;
const XK_SHIFT_R: u32 = 0xFFE2;
const XK_CONTROL_L: u32 = 0xFFE3;
const XK_CONTROL_R: u32 = 0xFFE4;
const XK_CAPS_LOCK: u32 = 0xFFE5;
const XK_META_L: u32 = 0xFFE7;
const XK_META_R: u32 = 0xFFE8;
const XK_ALT_L: u32 = 0xFFE9;
const XK_ALT_R: u32 = 0xFFEA;
const XK_SUPER_L: u32 = 0xFFEB;
const XK_SUPER_R: u32 = 0xFFEC;

/// Translates an X11 keysym to a [`Key`].
///
/// `Super` and `Meta` both become the meta keys; `ISO_Level3_Shift` (AltGr
/// on most European layouts) is the right Alt key.
pub fn keysym_to_key(keysym: u32) -> Key {
    match keysym {
        XK_A..=XK_Z => LETTER_KEYS[(keysym - XK_A) as usize],
        XK_UPPER_A..=XK_UPPER_Z => LETTER_KEYS[(keysym - XK_UPPER_A) as usize],
        XK_BACKSPACE => Key::Backspace,
        XK_TAB => Key::Tab,
        XK_RETURN => Key::Enter,
        XK_KP_ENTER => Key::NumpadEnter,
        XK_ESCAPE => Key::Escape,
        XK_SPACE => Key::Space,
        XK_CAPS_LOCK => Key::CapsLock,
        XK_SHIFT_L => Key::ShiftLeft,
        XK_SHIFT_R => Key::ShiftRight,
        XK_CONTROL_L => Key::ControlLeft,
        XK_CONTROL_R => Key::ControlRight,
        XK_ALT_L => Key::AltLeft,
        XK_ALT_R | XK_ISO_LEVEL3_SHIFT => Key::AltRight,
        XK_SUPER_L | XK_META_L => Key::MetaLeft,
        XK_SUPER_R | XK_META_R => Key::MetaRight,
        _ => Key::Unknown,
    }
}

/// Translates a [`Key`] to the keysym used when synthesizing it.
pub fn key_to_keysym(key: Key) -> Option<u32> {
    if let Some(letter) = key.letter() {
        return Some(XK_A + u32::from(letter.index()));
    }
    let keysym = match key {
        Key::Backspace => XK_BACKSPACE,
        Key::Tab => XK_TAB,
        Key::Enter => XK_RETURN,
        Key::NumpadEnter => XK_KP_ENTER,
        Key::Escape => XK_ESCAPE,
        Key::Space => XK_SPACE,
        Key::CapsLock => XK_CAPS_LOCK,
        Key::ShiftLeft => XK_SHIFT_L,
        Key::ShiftRight => XK_SHIFT_R,
        Key::ControlLeft => XK_CONTROL_L,
        Key::ControlRight => XK_CONTROL_R,
        Key::AltLeft => XK_ALT_L,
        Key::AltRight => XK_ALT_R,
        Key::MetaLeft => XK_SUPER_L,
        Key::MetaRight => XK_SUPER_R,
        _ => return None,
    };
    Some(keysym)
}
