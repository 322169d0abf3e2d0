//! Linux X11 pointer synthesis via the XTest extension.
//!
//! Uses `XTestFakeMotionEvent`, `XTestFakeButtonEvent` and
//! `XTestFakeKeyEvent` on a dedicated connection.  Coordinates are root
//! window pixels, which under Xinerama span every monitor.
//!
//! # Mouse wheel via button events
//!
//! X11 has no wheel event.  A wheel click is a press+release of button 4
//! (up) or 5 (down); toolkits scroll about three lines per click.
//!
//! # Copy chord and the keyboard grab
//!
//! While the overlay is active the interceptor holds a keyboard grab, which
//! would route our own Ctrl+C back to us.  The chord drops the grab first.

#![cfg(target_os = "linux")]

use std::os::raw::{c_int, c_uint, c_ulong};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use gridclick_core::keymap::linux_x11::key_to_keysym;
use gridclick_core::{Key, Point};
use x11::{xlib, xtest};

use super::{CHORD_KEY_HOLD, PRIMARY_CLICK_HOLD, SECONDARY_CLICK_HOLD};
use crate::application::synthesize_pointer::{MouseButton, PointerSynthesizer, SynthesisError};
use crate::infrastructure::x11_session::{X11Session, XConnection};

/// Lines a toolkit scrolls per wheel click.
const LINES_PER_WHEEL_CLICK: u32 = 3;

const BUTTON_PRIMARY: c_uint = 1;
const BUTTON_SECONDARY: c_uint = 3;
const BUTTON_WHEEL_UP: c_uint = 4;
const BUTTON_WHEEL_DOWN: c_uint = 5;

/// `-1` selects the screen the pointer is on.
const CURRENT_SCREEN: c_int = -1;

/// XTest implementation of [`PointerSynthesizer`].
#[derive(Debug)]
pub struct X11PointerSynthesizer {
    connection: Mutex<XConnection>,
    session: Arc<X11Session>,
}

impl X11PointerSynthesizer {
    /// Opens a connection and checks for XTest.
    ///
    /// # Errors
    ///
    /// [`SynthesisError::Platform`] if the display is unreachable or lacks
    /// the XTEST extension.
    pub fn new(session: Arc<X11Session>) -> Result<Self, SynthesisError> {
        let connection = XConnection::open().map_err(SynthesisError::Platform)?;
        let (mut event_base, mut error_base, mut major, mut minor) = (0, 0, 0, 0);
        // SAFETY: the connection is open; the out-pointers are valid locals.
        let present = unsafe {
            xtest::XTestQueryExtension(
                connection.as_ptr(),
                &mut event_base,
                &mut error_base,
                &mut major,
                &mut minor,
            )
        };
        if present == 0 {
            return Err(SynthesisError::Platform("X server lacks the XTEST extension".to_string()));
        }
        Ok(Self {
            connection: Mutex::new(connection),
            session,
        })
    }

    /// Runs `f` against the display, then flushes the output buffer.
    fn with_display<T>(&self, f: impl FnOnce(*mut xlib::Display) -> T) -> T {
        let connection = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        let display = connection.as_ptr();
        let result = f(display);
        // SAFETY: `display` is open and guarded by the lock.
        unsafe {
            xlib::XFlush(display);
        }
        result
    }

    fn button(&self, button: c_uint, pressed: bool, point: Option<Point>) -> Result<(), SynthesisError> {
        self.with_display(|display| {
            if let Some(point) = point {
                fake_motion(display, point)?;
            }
            // SAFETY: `display` is open.
            let ok = unsafe { xtest::XTestFakeButtonEvent(display, button, c_int::from(pressed), 0) };
            check(ok, "XTestFakeButtonEvent")
        })
    }
}

impl PointerSynthesizer for X11PointerSynthesizer {
    fn move_to(&self, point: Point, _dragging: bool) -> Result<(), SynthesisError> {
        // The server derives drag state from the held button.
        self.with_display(|display| fake_motion(display, point))
    }

    fn press_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        self.button(button_number(button), true, Some(point))
    }

    fn release_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        self.button(button_number(button), false, Some(point))
    }

    fn click(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        let hold = match button {
            MouseButton::Primary => PRIMARY_CLICK_HOLD,
            MouseButton::Secondary => SECONDARY_CLICK_HOLD,
        };
        self.press_button(button, point)?;
        thread::sleep(hold);
        self.button(button_number(button), false, None)
    }

    fn scroll(&self, lines: i32) -> Result<(), SynthesisError> {
        let Some((button, clicks)) = wheel_clicks(lines) else {
            return Ok(());
        };
        for _ in 0..clicks {
            self.button(button, true, None)?;
            self.button(button, false, None)?;
        }
        Ok(())
    }

    fn send_copy_chord(&self) -> Result<(), SynthesisError> {
        self.session.set_exclusive(false);

        let (control, c) = self.with_display(|display| {
            Ok::<_, SynthesisError>((keycode(display, Key::ControlLeft)?, keycode(display, Key::KeyC)?))
        })?;
        let halves = [[(control, true), (c, true)], [(c, false), (control, false)]];
        for (index, half) in halves.iter().enumerate() {
            if index == 1 {
                thread::sleep(CHORD_KEY_HOLD);
            }
            self.with_display(|display| {
                for &(code, pressed) in half {
                    self.session.injected.expect(code, pressed);
                    // SAFETY: `display` is open; `code` came from XKeysymToKeycode.
                    let ok = unsafe { xtest::XTestFakeKeyEvent(display, c_uint::from(code), c_int::from(pressed), 0) };
                    check(ok, "XTestFakeKeyEvent")?;
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    fn cursor_position(&self) -> Option<Point> {
        self.with_display(|display| {
            let (mut root, mut child) = (0, 0);
            let (mut root_x, mut root_y, mut win_x, mut win_y) = (0, 0, 0, 0);
            let mut mask = 0;
            // SAFETY: `display` is open; every out-pointer is a valid local.
            let same_screen = unsafe {
                xlib::XQueryPointer(
                    display,
                    xlib::XDefaultRootWindow(display),
                    &mut root,
                    &mut child,
                    &mut root_x,
                    &mut root_y,
                    &mut win_x,
                    &mut win_y,
                    &mut mask,
                )
            };
            (same_screen != 0).then(|| Point::new(f64::from(root_x), f64::from(root_y)))
        })
    }
}

fn fake_motion(display: *mut xlib::Display, point: Point) -> Result<(), SynthesisError> {
    // SAFETY: `display` is open.
    let ok = unsafe {
        xtest::XTestFakeMotionEvent(display, CURRENT_SCREEN, point.x.round() as c_int, point.y.round() as c_int, 0)
    };
    check(ok, "XTestFakeMotionEvent")
}

fn keycode(display: *mut xlib::Display, key: Key) -> Result<u8, SynthesisError> {
    let keysym = key_to_keysym(key).ok_or_else(|| SynthesisError::Platform(format!("no keysym for {key:?}")))?;
    // SAFETY: `display` is open.
    let code = unsafe { xlib::XKeysymToKeycode(display, c_ulong::from(keysym)) };
    if code == 0 {
        return Err(SynthesisError::Platform(format!("keysym 0x{keysym:04X} is not on the keyboard")));
    }
    Ok(code)
}

fn check(status: c_int, call: &str) -> Result<(), SynthesisError> {
    if status == 0 {
        Err(SynthesisError::Platform(format!("{call} failed")))
    } else {
        Ok(())
    }
}

fn button_number(button: MouseButton) -> c_uint {
    match button {
        MouseButton::Primary => BUTTON_PRIMARY,
        MouseButton::Secondary => BUTTON_SECONDARY,
    }
}

/// Wheel button and click count for `lines`; positive scrolls up.
fn wheel_clicks(lines: i32) -> Option<(c_uint, u32)> {
    if lines == 0 {
        return None;
    }
    let button = if lines > 0 { BUTTON_WHEEL_UP } else { BUTTON_WHEEL_DOWN };
    Some((button, lines.unsigned_abs().div_ceil(LINES_PER_WHEEL_CLICK)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_down_uses_button_five() {
        assert_eq!(wheel_clicks(-5), Some((BUTTON_WHEEL_DOWN, 2)));
    }

    #[test]
    fn test_scroll_up_uses_button_four() {
        assert_eq!(wheel_clicks(5), Some((BUTTON_WHEEL_UP, 2)));
        assert_eq!(wheel_clicks(1), Some((BUTTON_WHEEL_UP, 1)));
    }

    #[test]
    fn test_zero_lines_does_not_scroll() {
        assert_eq!(wheel_clicks(0), None);
    }

    #[test]
    fn test_buttons_follow_x11_numbering() {
        assert_eq!(button_number(MouseButton::Primary), 1);
        assert_eq!(button_number(MouseButton::Secondary), 3);
    }
}
