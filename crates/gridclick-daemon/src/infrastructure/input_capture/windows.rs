//! Windows low-level keyboard hook.
//!
//! Installs `WH_KEYBOARD_LL` on the thread that calls [`InputInterceptor::run`]
//! and pumps that thread's message loop.  The hook callback translates each
//! `KBDLLHOOKSTRUCT` into a [`KeyEvent`], asks the handler for a decision and
//! returns `LRESULT(1)` to swallow.
//!
//! Events carrying `LLKHF_INJECTED` (including our own `SendInput` copy chord)
//! are forwarded without consulting the handler.
//!
//! Events are stamped from a process-wide [`MonotonicClock`].  The hook's own
//! `time` field is a 32-bit tick count that wraps every 49.7 days, so a press
//! held across the wrap would measure as zero milliseconds.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, OnceLock};

use gridclick_core::keymap::windows_vk::vk_to_key;
use gridclick_core::{Clock, EventDecision, KeyEvent, KeyEventKind, MonotonicClock};
use tracing::{debug, info};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, KBDLLHOOKSTRUCT_FLAGS, LLKHF_EXTENDED,
    LLKHF_INJECTED, MSG, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN,
    WM_SYSKEYUP,
};

use super::{CaptureError, EventHandler, InputInterceptor};

/// Handler called from the hook procedure.  Hook procedures receive no user
/// pointer, so the handler lives in a static for the duration of `run`.
static HANDLER: Mutex<Option<EventHandler>> = Mutex::new(None);

/// Timestamp source for hook events.
static CLOCK: OnceLock<MonotonicClock> = OnceLock::new();

/// Thread id running the message loop, or 0 when idle.
static HOOK_THREAD_ID: AtomicU32 = AtomicU32::new(0);

/// Windows `WH_KEYBOARD_LL` interceptor.  Only one may run per process.
#[derive(Debug, Default)]
pub struct WindowsKeyboardHook {
    stop_requested: AtomicBool,
}

impl WindowsKeyboardHook {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputInterceptor for WindowsKeyboardHook {
    fn run(&self, handler: EventHandler) -> Result<(), CaptureError> {
        {
            let mut slot = HANDLER
                .lock()
                .map_err(|_| CaptureError::HookInstallFailed("handler lock poisoned".to_string()))?;
            if slot.is_some() {
                return Err(CaptureError::AlreadyRunning);
            }
            *slot = Some(handler);
        }

        CLOCK.get_or_init(MonotonicClock::new);

        // SAFETY: GetCurrentThreadId has no preconditions.
        let thread_id = unsafe { GetCurrentThreadId() };
        HOOK_THREAD_ID.store(thread_id, Ordering::SeqCst);

        // SAFETY: SetWindowsHookExW requires the calling thread to run a message
        // loop, which follows immediately.  A null module handle is valid for
        // low-level hooks.
        let hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) } {
            Ok(hook) => hook,
            Err(e) => {
                clear_registration();
                return Err(CaptureError::HookInstallFailed(e.to_string()));
            }
        };
        info!(thread_id, "keyboard hook installed");

        if !self.stop_requested.load(Ordering::SeqCst) {
            let mut msg = MSG::default();
            // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
            // GetMessageW returns 0 on WM_QUIT and -1 on error; both end the loop.
            unsafe {
                while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
                    DispatchMessageW(&msg);
                }
            }
        }

        // SAFETY: `hook` was returned by SetWindowsHookExW on this thread.
        unsafe {
            UnhookWindowsHookEx(hook).ok();
        }
        clear_registration();
        info!("keyboard hook removed");
        Ok(())
    }

    fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        let thread_id = HOOK_THREAD_ID.load(Ordering::SeqCst);
        if thread_id != 0 {
            // SAFETY: Posting WM_QUIT to a thread id is always sound; if the
            // thread has already exited the call simply fails.
            let posted = unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) };
            if let Err(e) = posted {
                debug!("WM_QUIT not delivered: {e}");
            }
        }
    }
}

fn clear_registration() {
    HOOK_THREAD_ID.store(0, Ordering::SeqCst);
    if let Ok(mut slot) = HANDLER.lock() {
        *slot = None;
    }
}

/// Translates one hook notification into a [`KeyEvent`] stamped `time_ms`.
fn translate(message: u32, hook: &KBDLLHOOKSTRUCT, time_ms: u64) -> Option<KeyEvent> {
    let pressed = match message {
        WM_KEYDOWN | WM_SYSKEYDOWN => true,
        WM_KEYUP | WM_SYSKEYUP => false,
        _ => return None,
    };
    let extended = (hook.flags & LLKHF_EXTENDED) != KBDLLHOOKSTRUCT_FLAGS(0);
    let key = vk_to_key(hook.vkCode as u8, extended);
    let kind = if key.is_modifier() {
        KeyEventKind::FlagsChanged { pressed }
    } else if pressed {
        KeyEventKind::Down
    } else {
        KeyEventKind::Up
    };
    Some(KeyEvent { key, kind, time_ms })
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows on the thread that installed the hook.  Must return
/// quickly to avoid hook removal by the OS.
unsafe extern "system" fn keyboard_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        // SAFETY: Must call CallNextHookEx when n_code < 0.
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
    let hook = &*(l_param.0 as *const KBDLLHOOKSTRUCT);

    if (hook.flags & LLKHF_INJECTED) != KBDLLHOOKSTRUCT_FLAGS(0) {
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    let now = CLOCK.get_or_init(MonotonicClock::new).now_ms();
    let decision = match translate(w_param.0 as u32, hook, now) {
        Some(event) => match HANDLER.lock() {
            Ok(mut slot) => slot
                .as_mut()
                .map_or(EventDecision::PassThrough, |handler| handler(event)),
            Err(_) => EventDecision::PassThrough,
        },
        None => EventDecision::PassThrough,
    };

    if decision.is_swallow() {
        return LRESULT(1);
    }

    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridclick_core::domain::gesture::DEFAULT_TAP_THRESHOLD;
    use gridclick_core::{Key, TapDetector};

    fn hook_struct(vk: u32, flags: KBDLLHOOKSTRUCT_FLAGS) -> KBDLLHOOKSTRUCT {
        KBDLLHOOKSTRUCT {
            vkCode: vk,
            scanCode: 0,
            flags,
            time: 1234,
            dwExtraInfo: 0,
        }
    }

    fn at_tick(mut hook: KBDLLHOOKSTRUCT, time: u32) -> KBDLLHOOKSTRUCT {
        hook.time = time;
        hook
    }

    #[test]
    fn test_letter_down_translates_to_key_down() {
        let event = translate(WM_KEYDOWN, &hook_struct(0x47, KBDLLHOOKSTRUCT_FLAGS(0)), 1234).unwrap();
        assert_eq!(event, KeyEvent::down(Key::KeyG, 1234));
    }

    #[test]
    fn test_left_alt_translates_to_flags_changed() {
        let down = translate(WM_SYSKEYDOWN, &hook_struct(0xA4, KBDLLHOOKSTRUCT_FLAGS(0)), 1234).unwrap();
        let up = translate(WM_KEYUP, &hook_struct(0xA4, KBDLLHOOKSTRUCT_FLAGS(0)), 1234).unwrap();
        assert_eq!(down, KeyEvent::flags_changed(Key::AltLeft, true, 1234));
        assert_eq!(up, KeyEvent::flags_changed(Key::AltLeft, false, 1234));
    }

    #[test]
    fn test_extended_return_is_numpad_enter() {
        let event = translate(WM_KEYDOWN, &hook_struct(0x0D, LLKHF_EXTENDED), 0).unwrap();
        assert_eq!(event.key, Key::NumpadEnter);
    }

    #[test]
    fn test_hold_across_tick_wrap_is_not_a_tap() {
        // Arrange: the OS tick count wraps between the press and the release.
        let alt = hook_struct(0xA4, KBDLLHOOKSTRUCT_FLAGS(0));
        let mut detector = TapDetector::new(Key::AltLeft, DEFAULT_TAP_THRESHOLD);
        let down = translate(WM_SYSKEYDOWN, &at_tick(alt, u32::MAX - 100), 5_000).unwrap();
        let up = translate(WM_KEYUP, &at_tick(alt, 400), 5_500).unwrap();

        // Act
        let pressed = detector.on_modifier_event(down.key, true, down.time_ms);
        let released = detector.on_modifier_event(up.key, false, up.time_ms);

        // Assert
        assert_eq!(up.time_ms - down.time_ms, 500);
        assert_eq!((pressed, released), (None, None));
    }
}
