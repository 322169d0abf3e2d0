//! Linux display enumeration via Xlib and Xinerama.
//!
//! With Xinerama active (the norm for multi-monitor X.Org setups) each head
//! is reported at its offset within the root window, primary first.
//! Without it the default screen's root window is the single display.
//! Root window coordinates are what XTest posts motion in.

#![cfg(target_os = "linux")]

use std::os::raw::c_short;

use gridclick_core::DisplayBounds;
use x11::{xinerama, xlib};

use crate::application::locate_display::{DisplayLocator, ScreenInfoError};
use crate::infrastructure::x11_session::XConnection;

/// X11 implementation of [`DisplayLocator`].  Opens a short-lived connection
/// per query so monitor hot-plugs are picked up.
#[derive(Debug, Default)]
pub struct X11DisplayLocator;

impl X11DisplayLocator {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayLocator for X11DisplayLocator {
    fn displays(&self) -> Result<Vec<DisplayBounds>, ScreenInfoError> {
        let connection = XConnection::open().map_err(ScreenInfoError::Platform)?;
        let display = connection.as_ptr();

        let mut heads = Vec::new();
        // SAFETY: `display` is open for the rest of this function.
        unsafe {
            if xinerama::XineramaIsActive(display) != 0 {
                let mut count = 0;
                let screens = xinerama::XineramaQueryScreens(display, &mut count);
                if !screens.is_null() {
                    let len = usize::try_from(count).unwrap_or(0);
                    heads.extend(
                        std::slice::from_raw_parts(screens, len)
                            .iter()
                            .filter_map(|s| head_bounds(s.x_org, s.y_org, s.width, s.height)),
                    );
                    xlib::XFree(screens.cast());
                }
            }
            if heads.is_empty() {
                let screen = xlib::XDefaultScreen(display);
                let width = xlib::XDisplayWidth(display, screen);
                let height = xlib::XDisplayHeight(display, screen);
                if width > 0 && height > 0 {
                    heads.push(DisplayBounds::new(0.0, 0.0, f64::from(width), f64::from(height)));
                }
            }
        }

        if heads.is_empty() {
            return Err(ScreenInfoError::NoDisplays);
        }
        Ok(heads)
    }
}

/// Bounds of one Xinerama head; `None` for a disabled (zero-sized) head.
fn head_bounds(x: c_short, y: c_short, width: c_short, height: c_short) -> Option<DisplayBounds> {
    (width > 0 && height > 0).then(|| {
        DisplayBounds::new(f64::from(x), f64::from(y), f64::from(width), f64::from(height))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_offsets_are_kept() {
        assert_eq!(
            head_bounds(1920, 0, 2560, 1440),
            Some(DisplayBounds::new(1920.0, 0.0, 2560.0, 1440.0))
        );
    }

    #[test]
    fn test_disabled_head_is_skipped() {
        assert_eq!(head_bounds(0, 0, 0, 1080), None);
        assert_eq!(head_bounds(0, 0, 1920, 0), None);
    }
}
