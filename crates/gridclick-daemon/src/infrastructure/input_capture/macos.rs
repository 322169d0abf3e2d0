//! macOS `CGEventTap` interceptor.
//!
//! Creates an active session-level tap for key down, key up and
//! flags-changed events and runs it on the calling thread's `CFRunLoop`.
//! Swallowing an event is done by retyping it to `kCGEventNull`, which the
//! window server drops.
//!
//! # Accessibility permission
//!
//! `CGEventTapCreate` returns NULL unless the process has been granted
//! Accessibility (or Input Monitoring) in System Settings → Privacy &
//! Security.  That failure surfaces as [`CaptureError::PermissionDenied`].
//!
//! # Timestamps
//!
//! Events are stamped from a [`MonotonicClock`] when they reach the tap.
//!
//! # Disabled taps
//!
//! The window server disables a tap whose callback runs too long, or when
//! secure input toggles.  The callback then receives a `TapDisabledBy*`
//! notification, turns the tap back on and feeds the handler an Escape press
//! so any active overlay (and a held drag button) is cancelled.  Keys typed
//! while the tap was off went straight to applications.

#![cfg(target_os = "macos")]

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use core_foundation::base::TCFType;
use core_foundation::mach_port::CFMachPortRef;
use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement,
    CGEventType, EventField,
};
use gridclick_core::keymap::macos_cg::cgkeycode_to_key;
use gridclick_core::{Clock, EventDecision, Key, KeyEvent, KeyEventKind, MonotonicClock};
use tracing::{info, warn};

use super::{CaptureError, EventHandler, InputInterceptor};
use crate::infrastructure::input_synthesis::macos::SYNTHETIC_EVENT_MARKER;

/// How often the run loop checks for a stop request.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(250);

// Device-dependent modifier bits (IOKit `NX_DEVICE*KEYMASK`).  They tell the
// left and right keys apart, which the device-independent masks cannot.
const NX_DEVICELCTLKEYMASK: u64 = 0x0000_0001;
const NX_DEVICELSHIFTKEYMASK: u64 = 0x0000_0002;
const NX_DEVICERSHIFTKEYMASK: u64 = 0x0000_0004;
const NX_DEVICELCMDKEYMASK: u64 = 0x0000_0008;
const NX_DEVICERCMDKEYMASK: u64 = 0x0000_0010;
const NX_DEVICELALTKEYMASK: u64 = 0x0000_0020;
const NX_DEVICERALTKEYMASK: u64 = 0x0000_0040;
const NX_DEVICERCTLKEYMASK: u64 = 0x0000_2000;
const CG_EVENT_FLAG_ALPHA_SHIFT: u64 = 0x0001_0000;
const CG_EVENT_FLAG_SECONDARY_FN: u64 = 0x0080_0000;

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

/// macOS session event tap.
#[derive(Debug, Default)]
pub struct MacEventTap {
    stop_requested: AtomicBool,
    clock: MonotonicClock,
}

impl MacEventTap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputInterceptor for MacEventTap {
    fn run(&self, handler: EventHandler) -> Result<(), CaptureError> {
        let handler = Mutex::new(handler);
        let clock = self.clock;
        let port: Cell<CFMachPortRef> = Cell::new(std::ptr::null_mut());
        let dispatch = |key_event: KeyEvent| match handler.lock() {
            Ok(mut h) => h(key_event),
            Err(_) => EventDecision::PassThrough,
        };

        let tap = CGEventTap::new(
            CGEventTapLocation::Session,
            CGEventTapPlacement::HeadInsertEventTap,
            CGEventTapOptions::Default,
            vec![
                CGEventType::KeyDown,
                CGEventType::KeyUp,
                CGEventType::FlagsChanged,
            ],
            |_proxy, event_type, event| {
                if is_tap_disabled(event_type) {
                    warn!("event tap disabled by the system; re-enabling");
                    let mach_port = port.get();
                    if !mach_port.is_null() {
                        // SAFETY: `mach_port` belongs to `tap`, which outlives
                        // every invocation of this callback.
                        unsafe { CGEventTapEnable(mach_port, true) };
                    }
                    dispatch(KeyEvent::down(Key::Escape, clock.now_ms()));
                    return None;
                }
                if event.get_integer_value_field(EventField::EVENT_SOURCE_USER_DATA) == SYNTHETIC_EVENT_MARKER {
                    return None;
                }
                let Some(key_event) = translate(event_type, event, clock.now_ms()) else {
                    return None;
                };
                if dispatch(key_event).is_swallow() {
                    event.set_type(CGEventType::Null);
                }
                None
            },
        )
        .map_err(|()| {
            CaptureError::PermissionDenied(
                "CGEventTapCreate failed; grant Accessibility access to this binary".to_string(),
            )
        })?;
        port.set(tap.mach_port.as_concrete_TypeRef());

        let source = tap
            .mach_port
            .create_runloop_source(0)
            .map_err(|()| CaptureError::HookInstallFailed("CFMachPortCreateRunLoopSource failed".to_string()))?;
        let run_loop = CFRunLoop::get_current();
        // SAFETY: kCFRunLoopCommonModes is an immutable CFString constant
        // exported by CoreFoundation.
        unsafe {
            run_loop.add_source(&source, kCFRunLoopCommonModes);
        }
        tap.enable();
        info!("event tap installed");

        while !self.stop_requested.load(Ordering::SeqCst) {
            // SAFETY: kCFRunLoopDefaultMode is an immutable CFString constant
            // exported by CoreFoundation.
            CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, STOP_POLL_INTERVAL, false);
        }

        // SAFETY: as above.
        unsafe {
            run_loop.remove_source(&source, kCFRunLoopCommonModes);
        }
        info!("event tap removed");
        Ok(())
    }

    fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }
}

/// Notifications the window server sends after switching the tap off.
fn is_tap_disabled(event_type: CGEventType) -> bool {
    matches!(
        event_type,
        CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput
    )
}

/// Translates a tapped CoreGraphics event into a [`KeyEvent`].
fn translate(event_type: CGEventType, event: &CGEvent, time_ms: u64) -> Option<KeyEvent> {
    let code = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
    let key = cgkeycode_to_key(code);
    let kind = match event_type {
        CGEventType::KeyDown => KeyEventKind::Down,
        CGEventType::KeyUp => KeyEventKind::Up,
        CGEventType::FlagsChanged => KeyEventKind::FlagsChanged {
            pressed: modifier_pressed(key, event.get_flags().bits()),
        },
        _ => return None,
    };
    Some(KeyEvent { key, kind, time_ms })
}

/// Whether `key` is down according to the flags of its own flags-changed event.
fn modifier_pressed(key: Key, bits: u64) -> bool {
    let mask = match key {
        Key::ControlLeft => NX_DEVICELCTLKEYMASK,
        Key::ControlRight => NX_DEVICERCTLKEYMASK,
        Key::ShiftLeft => NX_DEVICELSHIFTKEYMASK,
        Key::ShiftRight => NX_DEVICERSHIFTKEYMASK,
        Key::MetaLeft => NX_DEVICELCMDKEYMASK,
        Key::MetaRight => NX_DEVICERCMDKEYMASK,
        Key::AltLeft => NX_DEVICELALTKEYMASK,
        Key::AltRight => NX_DEVICERALTKEYMASK,
        Key::CapsLock => CG_EVENT_FLAG_ALPHA_SHIFT,
        Key::Function => CG_EVENT_FLAG_SECONDARY_FN,
        _ => return false,
    };
    bits & mask != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const CG_EVENT_FLAG_COMMAND: u64 = 0x0010_0000;

    #[test]
    fn test_left_command_pressed_uses_device_bit() {
        let bits = CG_EVENT_FLAG_COMMAND | NX_DEVICELCMDKEYMASK;
        assert!(modifier_pressed(Key::MetaLeft, bits));
        assert!(!modifier_pressed(Key::MetaRight, bits));
    }

    #[test]
    fn test_left_release_while_right_held() {
        let bits = CG_EVENT_FLAG_COMMAND | NX_DEVICERCMDKEYMASK;
        assert!(!modifier_pressed(Key::MetaLeft, bits));
    }

    #[test]
    fn test_caps_lock_uses_alpha_shift() {
        assert!(modifier_pressed(Key::CapsLock, CG_EVENT_FLAG_ALPHA_SHIFT));
    }

    #[test]
    fn test_disable_notifications_are_recognised() {
        assert!(is_tap_disabled(CGEventType::TapDisabledByTimeout));
        assert!(is_tap_disabled(CGEventType::TapDisabledByUserInput));
        assert!(!is_tap_disabled(CGEventType::KeyDown));
        assert!(!is_tap_disabled(CGEventType::FlagsChanged));
    }

    #[test]
    fn test_non_modifier_is_never_pressed() {
        assert!(!modifier_pressed(Key::KeyA, u64::MAX));
    }
}
