//! Xlib plumbing shared by the Linux adapters.
//!
//! X11 has no way to drop a single key event on its way to another client.
//! The Linux interceptor therefore *observes* keys through the XRecord
//! extension and, while the overlay is active, holds an active keyboard grab
//! so the focused window receives nothing.  The grab is owned by
//! [`X11Session`], which the synthesizer also holds: it must drop the grab
//! before posting the copy chord, or the chord would be delivered to us.
//!
//! # Threads
//!
//! `XInitThreads` runs before the first connection is opened.  Each
//! [`XConnection`] is still used by one thread at a time, either behind a
//! `Mutex` or owned by the interceptor thread.
//!
//! # Safety
//!
//! All `unsafe` blocks are Xlib FFI calls on a connection this module opened.

#![cfg(target_os = "linux")]

use std::collections::VecDeque;
use std::os::raw::c_int;
use std::ptr;
use std::sync::{Mutex, Once, PoisonError};

use tracing::{debug, warn};
use x11::xlib;

/// Injected key events remembered at most.  Entries the recorder never
/// reports back are pushed out by newer ones.
const MAX_INJECTED: usize = 16;

static XLIB_INIT: Once = Once::new();

/// An open Xlib display connection, closed on drop.
#[derive(Debug)]
pub struct XConnection(*mut xlib::Display);

// SAFETY: Xlib is switched to thread-safe mode before any connection exists,
// and a connection is never used from two threads at once.
unsafe impl Send for XConnection {}

impl XConnection {
    /// Connects to the display named by `$DISPLAY`.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure if the X server is unreachable.
    pub fn open() -> Result<Self, String> {
        XLIB_INIT.call_once(|| {
            // SAFETY: runs once, before any other Xlib call in this process.
            unsafe {
                xlib::XInitThreads();
                xlib::XSetErrorHandler(Some(log_x_error));
            }
        });

        // SAFETY: a null name selects the display named by $DISPLAY.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            let name = std::env::var("DISPLAY").unwrap_or_else(|_| "<unset>".to_string());
            return Err(format!("XOpenDisplay failed; DISPLAY={name}"));
        }
        Ok(Self(display))
    }

    pub fn as_ptr(&self) -> *mut xlib::Display {
        self.0
    }
}

impl Drop for XConnection {
    fn drop(&mut self) {
        // SAFETY: the pointer came from XOpenDisplay and is closed exactly once.
        unsafe {
            xlib::XCloseDisplay(self.0);
        }
    }
}

/// Replaces Xlib's default handler, which exits the process.
unsafe extern "C" fn log_x_error(_display: *mut xlib::Display, event: *mut xlib::XErrorEvent) -> c_int {
    if let Some(event) = event.as_ref() {
        warn!(
            error_code = event.error_code,
            request_code = event.request_code,
            minor_code = event.minor_code,
            "X protocol error"
        );
    }
    0
}

/// Key events this process posted through XTest, oldest first.
///
/// XRecord reports injected events like hardware ones.  The synthesizer
/// registers each key it is about to post, and the interceptor consumes the
/// matching record instead of handing it to the state machine.
#[derive(Debug, Default)]
pub struct InjectedKeys {
    pending: Mutex<VecDeque<(u8, bool)>>,
}

impl InjectedKeys {
    pub fn expect(&self, keycode: u8, pressed: bool) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.len() == MAX_INJECTED {
            pending.pop_front();
        }
        pending.push_back((keycode, pressed));
    }

    /// Whether a recorded event is the oldest one we injected.  A match is
    /// consumed.
    pub fn take(&self, keycode: u8, pressed: bool) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.front() == Some(&(keycode, pressed)) {
            pending.pop_front();
            true
        } else {
            false
        }
    }
}

/// The keyboard grab plus the injected-key ledger.
#[derive(Debug)]
pub struct X11Session {
    /// Connection that owns the grab.  Grabbed key events are queued here and
    /// discarded by [`drain`](Self::drain).
    grab: Mutex<GrabState>,
    pub injected: InjectedKeys,
}

#[derive(Debug)]
struct GrabState {
    connection: XConnection,
    grabbed: bool,
}

impl X11Session {
    /// # Errors
    ///
    /// Returns a description of the failure if the X server is unreachable.
    pub fn open() -> Result<Self, String> {
        Ok(Self {
            grab: Mutex::new(GrabState {
                connection: XConnection::open()?,
                grabbed: false,
            }),
            injected: InjectedKeys::default(),
        })
    }

    /// Grabs the keyboard when `exclusive`, releases it otherwise.  No-op
    /// when already in the requested state.
    pub fn set_exclusive(&self, exclusive: bool) {
        let mut state = self.grab.lock().unwrap_or_else(PoisonError::into_inner);
        if state.grabbed == exclusive {
            return;
        }
        let display = state.connection.as_ptr();

        if exclusive {
            // SAFETY: `display` is open and the default root window always exists.
            let status = unsafe {
                xlib::XGrabKeyboard(
                    display,
                    xlib::XDefaultRootWindow(display),
                    xlib::False,
                    xlib::GrabModeAsync,
                    xlib::GrabModeAsync,
                    xlib::CurrentTime,
                )
            };
            if status == xlib::GrabSuccess {
                state.grabbed = true;
                debug!("keyboard grabbed");
            } else {
                warn!(status, "keyboard grab refused; keys still reach the focused window");
            }
        } else {
            // SAFETY: ungrabbing is valid whether or not the grab is held.
            unsafe {
                xlib::XUngrabKeyboard(display, xlib::CurrentTime);
            }
            state.grabbed = false;
            debug!("keyboard released");
        }

        // SAFETY: `display` is open.
        unsafe {
            xlib::XFlush(display);
        }
    }

    /// Discards the key events the grab delivered to us.
    pub fn drain(&self) {
        let state = self.grab.lock().unwrap_or_else(PoisonError::into_inner);
        let display = state.connection.as_ptr();
        // SAFETY: `display` is open; XEvent is plain data, so all-zero is a
        // valid initial value for XNextEvent to overwrite.
        unsafe {
            let mut event: xlib::XEvent = std::mem::zeroed();
            while xlib::XPending(display) > 0 {
                xlib::XNextEvent(display, &mut event);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_keys_match_in_order() {
        // Arrange
        let injected = InjectedKeys::default();
        injected.expect(37, true);
        injected.expect(54, true);

        // Act / Assert
        assert!(!injected.take(54, true), "out of order");
        assert!(injected.take(37, true));
        assert!(injected.take(54, true));
        assert!(!injected.take(54, true), "already consumed");
    }

    #[test]
    fn test_hardware_key_is_not_mistaken_for_injected() {
        let injected = InjectedKeys::default();
        injected.expect(54, true);
        assert!(!injected.take(54, false));
        assert!(!injected.take(42, true));
        assert!(injected.take(54, true));
    }

    #[test]
    fn test_unreported_injections_age_out() {
        let injected = InjectedKeys::default();
        injected.expect(1, true);
        for _ in 0..MAX_INJECTED {
            injected.expect(2, true);
        }
        assert!(!injected.take(1, true));
        assert!(injected.take(2, true));
    }
}
