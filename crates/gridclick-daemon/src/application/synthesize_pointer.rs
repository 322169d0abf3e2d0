//! The port through which the overlay generates pointer and keyboard input.
//!
//! Platform adapters live in `infrastructure::input_synthesis`.  Every event
//! they post must be indistinguishable from hardware input to the focused
//! application, and must be recognisable to our own interceptor so it is not
//! fed back into the state machine.

use gridclick_core::Point;
use thiserror::Error;

/// Errors raised while posting synthetic input.
///
/// The state machine never propagates these: a failed click is logged and
/// the mode transition still happens.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The OS refused to create or post the event.
    #[error("platform error: {0}")]
    Platform(String),

    /// The synthesizer was used before its event source was available.
    #[error("event source not initialized")]
    NotInitialized,
}

/// Mouse button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left button (click, drag).
    Primary,
    /// Right button (context menu).
    Secondary,
}

/// Event synthesis port.
pub trait PointerSynthesizer: Send + Sync {
    /// Moves the pointer to `point`.  With `dragging` set the move is posted
    /// as a drag so the target application sees the held button.
    fn move_to(&self, point: Point, dragging: bool) -> Result<(), SynthesisError>;

    /// Presses and holds `button` at `point`.
    fn press_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError>;

    /// Releases `button` at `point`.
    fn release_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError>;

    /// A complete down/up click.  May block for a few tens of milliseconds
    /// between the two halves.
    fn click(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError>;

    /// Scrolls by `lines`; negative scrolls down.
    fn scroll(&self, lines: i32) -> Result<(), SynthesisError>;

    /// Sends the platform copy shortcut to the focused application.
    fn send_copy_chord(&self) -> Result<(), SynthesisError>;

    /// Current pointer position, if the platform can report it.
    fn cursor_position(&self) -> Option<Point>;
}
