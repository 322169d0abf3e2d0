//! # gridclick-core
//!
//! Domain library for GridClick, a keyboard-driven pointer overlay.  It holds
//! the pure logic: grid coordinate mapping, the tap-vs-hold gesture detector,
//! the overlay modes, key events and the fixed physical-key tables.
//!
//! This crate has zero dependencies on OS APIs or UI frameworks, so every
//! piece of it can be unit tested on any platform.
//!
//! # Architecture overview (for beginners)
//!
//! GridClick lets you move and click the mouse from the keyboard.  Tapping a
//! modifier key shows a 26×26 grid over the display under the pointer; typing
//! two letters (row, column) jumps the pointer to the centre of that cell, and
//! a handful of keys then nudge, click, drag or scroll.
//!
//! This crate (`gridclick-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Geometry (`Point`, `DisplayBounds`), the grid mapper
//!   (`GridGeometry`), the tap detector (`TapDetector`), the overlay `Mode`
//!   and the `KeyEvent` the interceptor hands to the state machine.
//!
//! - **`keymap`** – The closed `Key` enumeration, translation tables from
//!   platform key codes (macOS CGKeyCodes, Windows Virtual Keys, X11
//!   keysyms) and the fixed key bindings of each mode.

pub mod domain;
pub mod keymap;

// Re-export the most-used types at the crate root so callers can write
// `gridclick_core::GridGeometry` instead of `gridclick_core::domain::grid::GridGeometry`.
pub use domain::event::{EventDecision, KeyEvent, KeyEventKind};
pub use domain::geometry::{display_at_point, DisplayBounds, Point};
pub use domain::gesture::{Clock, MonotonicClock, TapDetected, TapDetector};
pub use domain::grid::{nudge, GridCell, GridError, GridGeometry, Letter, NudgeDirection};
pub use domain::mode::Mode;
pub use keymap::Key;
