//! Windows pointer synthesis via `SendInput`.
//!
//! Absolute moves are normalised against the whole virtual desktop
//! (`MOUSEEVENTF_VIRTUALDESK`), so a point on any monitor maps to
//! `[0, 65535]` on both axes.
//!
//! # Safety
//!
//! `unsafe` is used only for Win32 FFI calls and each block carries a
//! `// SAFETY:` comment.

#![cfg(target_os = "windows")]

use std::thread;

use gridclick_core::keymap::windows_vk::key_to_vk;
use gridclick_core::{Key, Point};
use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_KEYUP, MOUSEEVENTF_ABSOLUTE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_MOVE, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEEVENTF_VIRTUALDESK,
    MOUSEEVENTF_WHEEL, MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN,
};

use super::{CHORD_KEY_HOLD, PRIMARY_CLICK_HOLD, SECONDARY_CLICK_HOLD};
use crate::application::synthesize_pointer::{MouseButton, PointerSynthesizer, SynthesisError};

/// Wheel units per scrolled line (`WHEEL_DELTA / 3`).
const WHEEL_UNITS_PER_LINE: i32 = 40;

/// Windows implementation of [`PointerSynthesizer`].
#[derive(Debug, Default)]
pub struct WindowsPointerSynthesizer;

impl WindowsPointerSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl PointerSynthesizer for WindowsPointerSynthesizer {
    fn move_to(&self, point: Point, _dragging: bool) -> Result<(), SynthesisError> {
        // Windows derives drag state from the held button, so a plain move suffices.
        let (dx, dy) = normalize_to_virtual_desk(point, virtual_desk());
        send(&[mouse_input(
            dx,
            dy,
            0,
            MOUSEEVENTF_MOVE | MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_VIRTUALDESK,
        )])
    }

    fn press_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        self.move_to(point, false)?;
        send(&[mouse_input(0, 0, 0, button_flags(button).0)])
    }

    fn release_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        self.move_to(point, true)?;
        send(&[mouse_input(0, 0, 0, button_flags(button).1)])
    }

    fn click(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        let hold = match button {
            MouseButton::Primary => PRIMARY_CLICK_HOLD,
            MouseButton::Secondary => SECONDARY_CLICK_HOLD,
        };
        self.press_button(button, point)?;
        thread::sleep(hold);
        send(&[mouse_input(0, 0, 0, button_flags(button).1)])
    }

    fn scroll(&self, lines: i32) -> Result<(), SynthesisError> {
        let delta = lines.saturating_mul(WHEEL_UNITS_PER_LINE);
        send(&[mouse_input(0, 0, delta as u32, MOUSEEVENTF_WHEEL)])
    }

    fn send_copy_chord(&self) -> Result<(), SynthesisError> {
        let ctrl = vk(Key::ControlLeft)?;
        let c = vk(Key::KeyC)?;
        send(&[key_input(ctrl, false), key_input(c, false)])?;
        thread::sleep(CHORD_KEY_HOLD);
        send(&[key_input(c, true), key_input(ctrl, true)])
    }

    fn cursor_position(&self) -> Option<Point> {
        let mut pos = POINT::default();
        // SAFETY: `pos` is a valid, writable POINT on the stack.
        unsafe { GetCursorPos(&mut pos) }.ok()?;
        Some(Point::new(f64::from(pos.x), f64::from(pos.y)))
    }
}

/// Virtual desktop rectangle as `(left, top, width, height)`.
fn virtual_desk() -> (i32, i32, i32, i32) {
    // SAFETY: GetSystemMetrics has no preconditions.
    unsafe {
        (
            GetSystemMetrics(SM_XVIRTUALSCREEN),
            GetSystemMetrics(SM_YVIRTUALSCREEN),
            GetSystemMetrics(SM_CXVIRTUALSCREEN),
            GetSystemMetrics(SM_CYVIRTUALSCREEN),
        )
    }
}

/// Maps a desktop point into `SendInput`'s absolute `[0, 65535]` space.
fn normalize_to_virtual_desk(point: Point, (left, top, width, height): (i32, i32, i32, i32)) -> (i32, i32) {
    let axis = |value: f64, origin: i32, extent: i32| -> i32 {
        let span = f64::from((extent - 1).max(1));
        let scaled = (value - f64::from(origin)) * 65535.0 / span;
        scaled.round().clamp(0.0, 65535.0) as i32
    };
    (axis(point.x, left, width), axis(point.y, top, height))
}

fn button_flags(button: MouseButton) -> (MOUSE_EVENT_FLAGS, MOUSE_EVENT_FLAGS) {
    match button {
        MouseButton::Primary => (MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP),
        MouseButton::Secondary => (MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP),
    }
}

fn vk(key: Key) -> Result<u8, SynthesisError> {
    key_to_vk(key).ok_or_else(|| SynthesisError::Platform(format!("no virtual key for {key:?}")))
}

fn mouse_input(dx: i32, dy: i32, data: u32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: data,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn key_input(vk: u8, up: bool) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(u16::from(vk)),
                wScan: 0,
                dwFlags: if up { KEYEVENTF_KEYUP } else { KEYBD_EVENT_FLAGS(0) },
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn send(inputs: &[INPUT]) -> Result<(), SynthesisError> {
    // SAFETY: `inputs` is a slice of fully initialised INPUT structures and
    // the size argument matches their layout.
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize == inputs.len() {
        Ok(())
    } else {
        Err(SynthesisError::Platform(format!(
            "SendInput accepted {sent} of {} events: {}",
            inputs.len(),
            windows::core::Error::from_win32()
        )))
    }
}
