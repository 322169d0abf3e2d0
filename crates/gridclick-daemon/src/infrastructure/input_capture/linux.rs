//! Linux X11 interceptor built on the XRecord extension.
//!
//! # How it works (for beginners)
//!
//! XRecord lets a client subscribe to a copy of the device events the X
//! server processes, for every client at once.  We ask for `KeyPress` and
//! `KeyRelease` only.  Recording needs two connections: `control` creates the
//! context, and `data` receives the intercepted events, which
//! `XRecordProcessReplies` hands to [`record_callback`] on this thread.
//!
//! Recording cannot stop an event.  Swallowing is done instead with a
//! keyboard grab held by the shared [`X11Session`] for as long as the overlay
//! is in an active mode.  A grabbed keyboard still passes its events through
//! XRecord, so the state machine keeps seeing every key.
//!
//! # Autorepeat
//!
//! The server reports a held key as a release/press pair with the same server
//! timestamp.  [`RepeatFilter`] folds each pair back into a repeated press so
//! a held drag key does not release and re-press the button.
//!
//! # Self-synthesized keys
//!
//! The synthesizer registers every key it injects in
//! [`X11Session::injected`]; matching records are dropped here.

#![cfg(target_os = "linux")]

use std::os::raw::{c_char, c_int};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gridclick_core::keymap::linux_x11::keysym_to_key;
use gridclick_core::{Clock, Key, KeyEvent, KeyEventKind, MonotonicClock};
use tracing::{info, trace};
use x11::xlib;
use x11::xrecord;

use super::{CaptureError, EventHandler, InputInterceptor};
use crate::infrastructure::overlay::SharedOverlay;
use crate::infrastructure::x11_session::{X11Session, XConnection};

/// How often pending replies are read and a stop request is checked.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Wire-protocol event codes (`X.h`).  The top bit marks `SendEvent` copies.
const KEY_PRESS: u8 = xlib::KeyPress as u8;
const KEY_RELEASE: u8 = xlib::KeyRelease as u8;
const SEND_EVENT_BIT: u8 = 0x80;

/// X11 interceptor: XRecord for observing, a keyboard grab for swallowing.
#[derive(Debug)]
pub struct X11RecordInterceptor {
    stop_requested: AtomicBool,
    clock: MonotonicClock,
    session: Arc<X11Session>,
    overlay: Arc<SharedOverlay>,
}

impl X11RecordInterceptor {
    /// `overlay` tells the interceptor when to hold the keyboard grab.
    pub fn new(session: Arc<X11Session>, overlay: Arc<SharedOverlay>) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            clock: MonotonicClock::new(),
            session,
            overlay,
        }
    }
}

impl InputInterceptor for X11RecordInterceptor {
    fn run(&self, handler: EventHandler) -> Result<(), CaptureError> {
        let control = XConnection::open().map_err(CaptureError::DisplayUnavailable)?;
        let data = XConnection::open().map_err(CaptureError::DisplayUnavailable)?;

        let (mut major, mut minor) = (0, 0);
        // SAFETY: `control` is open; the out-pointers are valid locals.
        if unsafe { xrecord::XRecordQueryVersion(control.as_ptr(), &mut major, &mut minor) } == 0 {
            return Err(CaptureError::HookInstallFailed(
                "X server lacks the RECORD extension".to_string(),
            ));
        }

        let context = create_key_context(&control)?;
        let state = Box::into_raw(Box::new(RecordState {
            handler,
            keymap: read_keymap(&control),
            clock: self.clock,
            session: Arc::clone(&self.session),
            overlay: Arc::clone(&self.overlay),
            repeats: RepeatFilter::default(),
        }));

        // SAFETY: `state` stays alive until after the context is disabled and
        // freed below, and the callback only runs inside XRecordProcessReplies
        // on this thread.
        let enabled = unsafe {
            xrecord::XRecordEnableContextAsync(data.as_ptr(), context, Some(record_callback), state.cast::<c_char>())
        };
        if enabled == 0 {
            // SAFETY: `context` was created on `control`; `state` is unshared.
            unsafe {
                xrecord::XRecordFreeContext(control.as_ptr(), context);
                drop(Box::from_raw(state));
            }
            return Err(CaptureError::HookInstallFailed("XRecordEnableContextAsync failed".to_string()));
        }
        info!(major, minor, "XRecord context enabled");

        while !self.stop_requested.load(Ordering::SeqCst) {
            // SAFETY: `data` is open and owned by this thread.
            unsafe { xrecord::XRecordProcessReplies(data.as_ptr()) };
            // SAFETY: the callback is not running; this thread is the only user.
            unsafe { (*state).tick() };
            self.session.drain();
            thread::sleep(POLL_INTERVAL);
        }

        // SAFETY: `context` belongs to `control`; once it is freed the
        // callback can no longer run, so `state` can be reclaimed.
        unsafe {
            xrecord::XRecordDisableContext(control.as_ptr(), context);
            xlib::XSync(control.as_ptr(), xlib::False);
            xrecord::XRecordFreeContext(control.as_ptr(), context);
            drop(Box::from_raw(state));
        }
        self.session.set_exclusive(false);
        info!("XRecord context removed");
        Ok(())
    }

    fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }
}

/// A record context covering key presses and releases from every client.
fn create_key_context(control: &XConnection) -> Result<xrecord::XRecordContext, CaptureError> {
    // SAFETY: XRecordAllocRange returns a zeroed range or null.
    let mut range = unsafe { xrecord::XRecordAllocRange() };
    if range.is_null() {
        return Err(CaptureError::HookInstallFailed("XRecordAllocRange failed".to_string()));
    }
    let mut clients: xrecord::XRecordClientSpec = xrecord::XRecordAllClients;

    // SAFETY: `range` is non-null and owned here until XFree; `control` is open.
    let context = unsafe {
        (*range).device_events.first = KEY_PRESS;
        (*range).device_events.last = KEY_RELEASE;
        let context = xrecord::XRecordCreateContext(control.as_ptr(), 0, &mut clients, 1, &mut range, 1);
        xlib::XFree(range.cast());
        xlib::XSync(control.as_ptr(), xlib::False);
        context
    };
    if context == 0 {
        return Err(CaptureError::HookInstallFailed("XRecordCreateContext failed".to_string()));
    }
    Ok(context)
}

/// Keycode → [`Key`] for the layout active at startup.
fn read_keymap(control: &XConnection) -> [Key; 256] {
    let display = control.as_ptr();
    let (mut min, mut max): (c_int, c_int) = (0, 0);
    // SAFETY: `display` is open; the out-pointers are valid locals.
    unsafe { xlib::XDisplayKeycodes(display, &mut min, &mut max) };

    let mut keymap = [Key::Unknown; 256];
    for keycode in min.max(0)..=max.min(255) {
        // SAFETY: `keycode` lies in the range the server reported.
        let keysym = unsafe { xlib::XkbKeycodeToKeysym(display, keycode as u8, 0, 0) };
        keymap[keycode as usize] = keysym_to_key(keysym as u32);
    }
    keymap
}

/// Everything the record callback needs, owned by `run`.
struct RecordState {
    handler: EventHandler,
    keymap: [Key; 256],
    clock: MonotonicClock,
    session: Arc<X11Session>,
    overlay: Arc<SharedOverlay>,
    repeats: RepeatFilter,
}

impl RecordState {
    fn record(&mut self, raw: RawKey) {
        for ready in self.repeats.push(raw) {
            self.deliver(ready);
        }
    }

    /// Per-poll housekeeping: a release with no partner press is final, and
    /// a cancel from another thread may have hidden the overlay.
    fn tick(&mut self) {
        if let Some(release) = self.repeats.flush() {
            self.deliver(release);
        }
        self.sync_grab();
    }

    fn deliver(&mut self, raw: RawKey) {
        if self.session.injected.take(raw.keycode, raw.pressed) {
            trace!(keycode = raw.keycode, "skipping injected key");
            return;
        }
        let event = to_key_event(raw, &self.keymap);
        // The decision is realised by the grab, not per event.
        let _ = (self.handler)(event);
        self.sync_grab();
    }

    fn sync_grab(&self) {
        self.session.set_exclusive(self.overlay.snapshot().mode.is_active());
    }
}

/// XRecord delivery callback.
///
/// # Safety
///
/// `closure` must be the `RecordState` pointer registered with the context,
/// and `data` a record XRecord allocated for this call.
unsafe extern "C" fn record_callback(closure: *mut c_char, data: *mut xrecord::XRecordInterceptData) {
    let Some(intercept) = data.as_ref() else {
        return;
    };
    if intercept.category == xrecord::XRecordFromServer && !intercept.data.is_null() && intercept.data_len >= 2 {
        // xEvent layout: type, detail (keycode), sequence, time.
        let bytes = std::slice::from_raw_parts(intercept.data, 8);
        let kind = bytes[0] & !SEND_EVENT_BIT;
        if kind == KEY_PRESS || kind == KEY_RELEASE {
            let state = &mut *closure.cast::<RecordState>();
            state.record(RawKey {
                keycode: bytes[1],
                pressed: kind == KEY_PRESS,
                server_time: u32::from_ne_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
                time_ms: state.clock.now_ms(),
            });
        }
    }
    xrecord::XRecordFreeData(data);
}

/// One recorded key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawKey {
    keycode: u8,
    pressed: bool,
    /// X server timestamp, used only to pair autorepeat events.
    server_time: u32,
    time_ms: u64,
}

/// Holds each release back until the next record shows whether it was half
/// of an autorepeat pair.
#[derive(Debug, Default)]
struct RepeatFilter {
    pending_release: Option<RawKey>,
}

impl RepeatFilter {
    /// Events ready for delivery, in order.
    fn push(&mut self, raw: RawKey) -> Vec<RawKey> {
        let held = self.pending_release.take();
        if !raw.pressed {
            self.pending_release = Some(raw);
            return held.into_iter().collect();
        }
        match held {
            Some(release) if release.keycode == raw.keycode && release.server_time == raw.server_time => {
                vec![raw]
            }
            Some(release) => vec![release, raw],
            None => vec![raw],
        }
    }

    fn flush(&mut self) -> Option<RawKey> {
        self.pending_release.take()
    }
}

fn to_key_event(raw: RawKey, keymap: &[Key; 256]) -> KeyEvent {
    let key = keymap[usize::from(raw.keycode)];
    let kind = if key.is_modifier() {
        KeyEventKind::FlagsChanged { pressed: raw.pressed }
    } else if raw.pressed {
        KeyEventKind::Down
    } else {
        KeyEventKind::Up
    };
    KeyEvent {
        key,
        kind,
        time_ms: raw.time_ms,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(keycode: u8, pressed: bool, server_time: u32) -> RawKey {
        RawKey {
            keycode,
            pressed,
            server_time,
            time_ms: u64::from(server_time),
        }
    }

    fn keymap() -> [Key; 256] {
        let mut keymap = [Key::Unknown; 256];
        keymap[9] = Key::Escape;
        keymap[40] = Key::KeyD;
        keymap[64] = Key::AltLeft;
        keymap
    }

    #[test]
    fn test_autorepeat_pair_becomes_repeated_press() {
        // Arrange
        let mut filter = RepeatFilter::default();

        // Act
        let first = filter.push(raw(40, true, 100));
        let release = filter.push(raw(40, false, 600));
        let repeat = filter.push(raw(40, true, 600));

        // Assert
        assert_eq!(first, vec![raw(40, true, 100)]);
        assert!(release.is_empty());
        assert_eq!(repeat, vec![raw(40, true, 600)]);
        assert_eq!(filter.flush(), None);
    }

    #[test]
    fn test_real_release_is_delivered_on_flush() {
        let mut filter = RepeatFilter::default();
        filter.push(raw(40, true, 100));
        assert!(filter.push(raw(40, false, 250)).is_empty());
        assert_eq!(filter.flush(), Some(raw(40, false, 250)));
    }

    #[test]
    fn test_release_then_other_key_keeps_order() {
        let mut filter = RepeatFilter::default();
        filter.push(raw(40, false, 250));
        assert_eq!(filter.push(raw(9, true, 250)), vec![raw(40, false, 250), raw(9, true, 250)]);
    }

    #[test]
    fn test_same_key_pressed_later_is_not_a_repeat() {
        let mut filter = RepeatFilter::default();
        filter.push(raw(40, false, 250));
        assert_eq!(filter.push(raw(40, true, 400)), vec![raw(40, false, 250), raw(40, true, 400)]);
    }

    #[test]
    fn test_consecutive_releases_are_not_lost() {
        let mut filter = RepeatFilter::default();
        assert!(filter.push(raw(40, false, 250)).is_empty());
        assert_eq!(filter.push(raw(9, false, 260)), vec![raw(40, false, 250)]);
        assert_eq!(filter.flush(), Some(raw(9, false, 260)));
    }

    #[test]
    fn test_modifier_keycode_translates_to_flags_changed() {
        let event = to_key_event(raw(64, true, 10), &keymap());
        assert_eq!(event, KeyEvent::flags_changed(Key::AltLeft, true, 10));
    }

    #[test]
    fn test_plain_keycodes_translate_to_down_and_up() {
        assert_eq!(to_key_event(raw(9, true, 5), &keymap()), KeyEvent::down(Key::Escape, 5));
        assert_eq!(to_key_event(raw(40, false, 7), &keymap()), KeyEvent::up(Key::KeyD, 7));
        assert_eq!(to_key_event(raw(200, true, 9), &keymap()).key, Key::Unknown);
    }
}
