//! Platform implementations of [`PointerSynthesizer`].
//!
//! The correct implementation is selected at compile time via `#[cfg(target_os = ...)]`.
//!
//! [`PointerSynthesizer`]: crate::application::synthesize_pointer::PointerSynthesizer

use std::time::Duration;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

/// Gap between primary button down and up in a click.
pub const PRIMARY_CLICK_HOLD: Duration = Duration::from_millis(60);

/// Gap between secondary button down and up.  Some context menus ignore
/// shorter right clicks.
pub const SECONDARY_CLICK_HOLD: Duration = Duration::from_millis(100);

/// How long the copy chord holds `C` down.
pub const CHORD_KEY_HOLD: Duration = Duration::from_millis(10);
