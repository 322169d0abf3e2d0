//! macOS pointer synthesis via Quartz events.
//!
//! Every event is created from a fresh HID-state `CGEventSource`, stamped with
//! [`SYNTHETIC_EVENT_MARKER`] in its user-data field and posted at the HID tap
//! location.  The event tap recognises the marker and lets our own events
//! through untouched.

#![cfg(target_os = "macos")]

use std::thread;

use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTapLocation, CGEventType, CGMouseButton, EventField,
    ScrollEventUnit,
};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;
use gridclick_core::keymap::macos_cg::key_to_cgkeycode;
use gridclick_core::{Key, Point};

use super::{CHORD_KEY_HOLD, PRIMARY_CLICK_HOLD, SECONDARY_CLICK_HOLD};
use crate::application::synthesize_pointer::{MouseButton, PointerSynthesizer, SynthesisError};

/// Value written to `kCGEventSourceUserData` on every event we post ("GDCK").
pub const SYNTHETIC_EVENT_MARKER: i64 = 0x4744_434b;

/// Pixels scrolled per line.
const PIXELS_PER_LINE: i32 = 8;

/// macOS implementation of [`PointerSynthesizer`].
#[derive(Debug, Default)]
pub struct MacPointerSynthesizer;

impl MacPointerSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl PointerSynthesizer for MacPointerSynthesizer {
    fn move_to(&self, point: Point, dragging: bool) -> Result<(), SynthesisError> {
        let event_type = if dragging {
            CGEventType::LeftMouseDragged
        } else {
            CGEventType::MouseMoved
        };
        let event = mouse_event(event_type, point, CGMouseButton::Left)?;
        post(&event);
        Ok(())
    }

    fn press_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        let (down, _, cg_button) = button_events(button);
        let event = mouse_event(down, point, cg_button)?;
        event.set_integer_value_field(EventField::MOUSE_EVENT_CLICK_STATE, 1);
        post(&event);
        Ok(())
    }

    fn release_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        let (_, up, cg_button) = button_events(button);
        let event = mouse_event(up, point, cg_button)?;
        event.set_integer_value_field(EventField::MOUSE_EVENT_CLICK_STATE, 1);
        post(&event);
        Ok(())
    }

    fn click(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        let hold = match button {
            MouseButton::Primary => PRIMARY_CLICK_HOLD,
            MouseButton::Secondary => SECONDARY_CLICK_HOLD,
        };
        self.press_button(button, point)?;
        thread::sleep(hold);
        self.release_button(button, point)
    }

    fn scroll(&self, lines: i32) -> Result<(), SynthesisError> {
        let pixels = lines.saturating_mul(PIXELS_PER_LINE);
        let event = CGEvent::new_scroll_event(source()?, ScrollEventUnit::PIXEL, 1, pixels, 0, 0)
            .map_err(|()| SynthesisError::Platform("CGEventCreateScrollWheelEvent failed".to_string()))?;
        post(&event);
        Ok(())
    }

    fn send_copy_chord(&self) -> Result<(), SynthesisError> {
        let events = copy_chord()?
            .into_iter()
            .map(|(code, down, flags)| key_event(code, down, flags))
            .collect::<Result<Vec<_>, _>>()?;
        for (index, event) in events.iter().enumerate() {
            post(event);
            if index == 1 {
                thread::sleep(CHORD_KEY_HOLD);
            }
        }
        Ok(())
    }

    fn cursor_position(&self) -> Option<Point> {
        let event = CGEvent::new(source().ok()?).ok()?;
        let location = event.location();
        Some(Point::new(location.x, location.y))
    }
}

fn source() -> Result<CGEventSource, SynthesisError> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState).map_err(|()| SynthesisError::NotInitialized)
}

fn button_events(button: MouseButton) -> (CGEventType, CGEventType, CGMouseButton) {
    match button {
        MouseButton::Primary => (CGEventType::LeftMouseDown, CGEventType::LeftMouseUp, CGMouseButton::Left),
        MouseButton::Secondary => (CGEventType::RightMouseDown, CGEventType::RightMouseUp, CGMouseButton::Right),
    }
}

fn mouse_event(event_type: CGEventType, point: Point, button: CGMouseButton) -> Result<CGEvent, SynthesisError> {
    CGEvent::new_mouse_event(source()?, event_type, CGPoint::new(point.x, point.y), button)
        .map_err(|()| SynthesisError::Platform("CGEventCreateMouseEvent failed".to_string()))
}

/// Command down, C down, C up, Command up.  Applications that read the live
/// modifier state see Command held for the whole chord.
fn copy_chord() -> Result<[(u16, bool, CGEventFlags); 4], SynthesisError> {
    let command = key_to_cgkeycode(Key::MetaLeft)
        .ok_or_else(|| SynthesisError::Platform("no keycode for Command".to_string()))?;
    let c = key_to_cgkeycode(Key::KeyC)
        .ok_or_else(|| SynthesisError::Platform("no keycode for C".to_string()))?;
    let held = CGEventFlags::CGEventFlagCommand;
    Ok([
        (command, true, held),
        (c, true, held),
        (c, false, held),
        (command, false, CGEventFlags::CGEventFlagNull),
    ])
}

fn key_event(code: u16, down: bool, flags: CGEventFlags) -> Result<CGEvent, SynthesisError> {
    let event = CGEvent::new_keyboard_event(source()?, code, down)
        .map_err(|()| SynthesisError::Platform("CGEventCreateKeyboardEvent failed".to_string()))?;
    event.set_flags(flags);
    Ok(event)
}

fn post(event: &CGEvent) {
    event.set_integer_value_field(EventField::EVENT_SOURCE_USER_DATA, SYNTHETIC_EVENT_MARKER);
    event.post(CGEventTapLocation::HID);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_is_nonzero() {
        // Hardware events carry 0 in the user-data field.
        assert_ne!(SYNTHETIC_EVENT_MARKER, 0);
    }

    #[test]
    fn test_button_events_pair_down_and_up() {
        let (down, up, _) = button_events(MouseButton::Secondary);
        assert_eq!(down as u32, CGEventType::RightMouseDown as u32);
        assert_eq!(up as u32, CGEventType::RightMouseUp as u32);
    }

    #[test]
    fn test_copy_chord_wraps_c_in_command() {
        // Act
        let chord = copy_chord().unwrap();

        // Assert
        let keys: Vec<(u16, bool)> = chord.iter().map(|&(code, down, _)| (code, down)).collect();
        assert_eq!(keys, vec![(0x37, true), (0x08, true), (0x08, false), (0x37, false)]);
        assert!(chord[..3].iter().all(|&(_, _, flags)| flags.contains(CGEventFlags::CGEventFlagCommand)));
        assert!(!chord[3].2.contains(CGEventFlags::CGEventFlagCommand));
    }
}
