//! Fixed key bindings for each active mode.
//!
//! Bindings are not configurable.  Each table is a plain `match` over [`Key`].

use super::Key;
use crate::domain::grid::NudgeDirection;

/// Modifier whose tap toggles the overlay on this platform.
///
/// Left Command on macOS.  Left Alt everywhere else, where the Windows key is
/// already taken by the shell.
pub const fn platform_toggle_key() -> Key {
    if cfg!(target_os = "macos") {
        Key::MetaLeft
    } else {
        Key::AltLeft
    }
}

/// What a key does in fine-tuning mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FineTuneAction {
    Nudge(NudgeDirection),
    /// Down engages the drag, up releases it.
    Drag,
    PrimaryClick,
    SecondaryClick,
    EnterScroll,
    CopyAndExit,
    /// Back to grid selection.
    Back,
}

/// Fine-tuning table: vi-style HJKL, V drag, Space/M click, O scroll, Enter copy.
pub fn fine_tune_action(key: Key) -> Option<FineTuneAction> {
    let action = match key {
        Key::KeyH => FineTuneAction::Nudge(NudgeDirection::Left),
        Key::KeyJ => FineTuneAction::Nudge(NudgeDirection::Down),
        Key::KeyK => FineTuneAction::Nudge(NudgeDirection::Up),
        Key::KeyL => FineTuneAction::Nudge(NudgeDirection::Right),
        Key::KeyV => FineTuneAction::Drag,
        Key::Space => FineTuneAction::PrimaryClick,
        Key::KeyM => FineTuneAction::SecondaryClick,
        Key::KeyO => FineTuneAction::EnterScroll,
        Key::Enter | Key::NumpadEnter => FineTuneAction::CopyAndExit,
        Key::Backspace => FineTuneAction::Back,
        _ => return None,
    };
    Some(action)
}

/// Scroll direction bound in scrolling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Content moves up, revealing what is below.
    Down,
    Up,
}

impl ScrollDirection {
    /// Signed line delta for the synthesizer: negative scrolls down.
    pub fn line_delta(self, lines: i32) -> i32 {
        match self {
            ScrollDirection::Down => -lines,
            ScrollDirection::Up => lines,
        }
    }
}

/// Scrolling table: J down, K up.
pub fn scroll_action(key: Key) -> Option<ScrollDirection> {
    match key {
        Key::KeyJ => Some(ScrollDirection::Down),
        Key::KeyK => Some(ScrollDirection::Up),
        _ => None,
    }
}
