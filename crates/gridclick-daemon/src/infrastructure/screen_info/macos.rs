//! macOS display enumeration via Core Graphics.
//!
//! `CGDisplay::bounds` is expressed in the global display space: origin at the
//! top-left of the main display, Y growing downwards.  That is the space
//! `CGEventPost` and `CGEventGetLocation` use, so bounds are returned as-is.

#![cfg(target_os = "macos")]

use core_graphics::display::CGDisplay;
use gridclick_core::DisplayBounds;

use crate::application::locate_display::{DisplayLocator, ScreenInfoError};

/// macOS implementation of [`DisplayLocator`].
#[derive(Debug, Default)]
pub struct MacDisplayLocator;

impl MacDisplayLocator {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayLocator for MacDisplayLocator {
    fn displays(&self) -> Result<Vec<DisplayBounds>, ScreenInfoError> {
        let ids = CGDisplay::active_displays()
            .map_err(|e| ScreenInfoError::Platform(format!("CGGetActiveDisplayList failed: {e}")))?;
        if ids.is_empty() {
            return Err(ScreenInfoError::NoDisplays);
        }

        let main_id = CGDisplay::main().id;
        let mut displays: Vec<(bool, DisplayBounds)> = ids
            .iter()
            .map(|&id| {
                // Displays unplugged since enumeration report an empty rect.
                let rect = CGDisplay::new(id).bounds();
                (
                    id == main_id,
                    DisplayBounds::new(rect.origin.x, rect.origin.y, rect.size.width, rect.size.height),
                )
            })
            .filter(|(_, bounds)| bounds.width > 0.0 && bounds.height > 0.0)
            .collect();

        displays.sort_by_key(|(main, _)| !main);
        Ok(displays.into_iter().map(|(_, bounds)| bounds).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_locator_main_display_at_origin() {
        let displays = MacDisplayLocator::new().displays().expect("enumerate");
        assert_eq!((displays[0].x, displays[0].y), (0.0, 0.0));
    }
}
