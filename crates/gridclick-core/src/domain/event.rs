//! Keyboard events as seen by the mode state machine, and the decision the
//! machine hands back to the interceptor for each of them.

use crate::keymap::Key;

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    /// A non-modifier key went down (including auto-repeat).
    Down,
    /// A non-modifier key was released.
    Up,
    /// A modifier key changed state.  `pressed` is its new state.
    FlagsChanged { pressed: bool },
}

/// One global keyboard event delivered by the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub kind: KeyEventKind,
    /// Monotonic timestamp in milliseconds.  Only differences are meaningful.
    pub time_ms: u64,
}

impl KeyEvent {
    pub const fn down(key: Key, time_ms: u64) -> Self {
        Self {
            key,
            kind: KeyEventKind::Down,
            time_ms,
        }
    }

    pub const fn up(key: Key, time_ms: u64) -> Self {
        Self {
            key,
            kind: KeyEventKind::Up,
            time_ms,
        }
    }

    pub const fn flags_changed(key: Key, pressed: bool, time_ms: u64) -> Self {
        Self {
            key,
            kind: KeyEventKind::FlagsChanged { pressed },
            time_ms,
        }
    }

    /// Returns `true` for a non-modifier key-down.
    pub fn is_key_down(&self) -> bool {
        self.kind == KeyEventKind::Down
    }

    pub fn is_flags_changed(&self) -> bool {
        matches!(self.kind, KeyEventKind::FlagsChanged { .. })
    }
}

/// Whether the intercepted event continues to the focused application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDecision {
    /// Deliver the event unchanged.
    PassThrough,
    /// Drop the event; no other application sees it.
    Swallow,
}

impl EventDecision {
    pub fn is_swallow(self) -> bool {
        self == EventDecision::Swallow
    }
}
