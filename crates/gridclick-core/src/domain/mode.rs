//! The overlay's interaction modes.

use std::fmt;

/// Exactly one mode is active at any time.  The process starts [`Mode::Hidden`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Overlay not shown; every event passes through and only the toggle tap is watched.
    #[default]
    Hidden,
    /// Grid shown; typing two letters picks a cell.
    GridSelection,
    /// Pointer placed; nudge, click, drag, copy.
    FineTuning,
    /// J/K scroll under the pointer.
    Scrolling,
}

impl Mode {
    /// Returns `true` while the overlay is on screen and keys are being consumed.
    pub fn is_active(self) -> bool {
        self != Mode::Hidden
    }

    /// Whether the grid lines and labels are drawn.  The other active modes
    /// only show the status banner.
    pub fn shows_grid(self) -> bool {
        self == Mode::GridSelection
    }

    /// Text of the status banner, or `None` when hidden.
    pub fn status_hint(self) -> Option<&'static str> {
        match self {
            Mode::Hidden => None,
            Mode::GridSelection => Some("Grid Mode | A-Z: Select | Backspace: Clear | ESC: Exit"),
            Mode::FineTuning => Some(
                "Fine Tune | HJKL: Move | Space: Click | M: Right Click | V: Drag | O: Scroll | Enter: Copy | ESC: Exit",
            ),
            Mode::Scrolling => Some("Scroll Mode | J/K: Scroll | ESC: Exit"),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Hidden => "hidden",
            Mode::GridSelection => "grid-selection",
            Mode::FineTuning => "fine-tuning",
            Mode::Scrolling => "scrolling",
        };
        f.write_str(name)
    }
}
