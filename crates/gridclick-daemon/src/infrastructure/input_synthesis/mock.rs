//! Recording synthesizer for tests.
//!
//! Every call is appended to an ordered log so tests can assert on the exact
//! sequence of synthetic input (for example: release before copy chord).

use std::sync::Mutex;

use gridclick_core::Point;

use crate::application::synthesize_pointer::{MouseButton, PointerSynthesizer, SynthesisError};

/// One recorded synthesizer call.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthCall {
    Move { point: Point, dragging: bool },
    Press(MouseButton, Point),
    Release(MouseButton, Point),
    Click(MouseButton, Point),
    Scroll(i32),
    CopyChord,
}

/// A [`PointerSynthesizer`] that records calls instead of posting events.
///
/// The reported cursor follows successful moves.  With `should_fail` set every
/// call is still recorded and then returns an error.
#[derive(Default)]
pub struct RecordingSynthesizer {
    pub calls: Mutex<Vec<SynthCall>>,
    pub cursor: Mutex<Option<Point>>,
    pub should_fail: bool,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the call log.
    pub fn calls(&self) -> Vec<SynthCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Simulates the user moving the physical mouse.
    pub fn set_cursor(&self, point: Point) {
        *self.cursor.lock().expect("lock poisoned") = Some(point);
    }

    fn record(&self, call: SynthCall) -> Result<(), SynthesisError> {
        self.calls.lock().expect("lock poisoned").push(call);
        if self.should_fail {
            Err(SynthesisError::Platform("mock failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl PointerSynthesizer for RecordingSynthesizer {
    fn move_to(&self, point: Point, dragging: bool) -> Result<(), SynthesisError> {
        self.record(SynthCall::Move { point, dragging })?;
        self.set_cursor(point);
        Ok(())
    }

    fn press_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        self.record(SynthCall::Press(button, point))
    }

    fn release_button(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        self.record(SynthCall::Release(button, point))
    }

    fn click(&self, button: MouseButton, point: Point) -> Result<(), SynthesisError> {
        self.record(SynthCall::Click(button, point))
    }

    fn scroll(&self, lines: i32) -> Result<(), SynthesisError> {
        self.record(SynthCall::Scroll(lines))
    }

    fn send_copy_chord(&self) -> Result<(), SynthesisError> {
        self.record(SynthCall::CopyChord)
    }

    fn cursor_position(&self) -> Option<Point> {
        *self.cursor.lock().expect("lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calls_are_recorded_in_order() {
        let synth = RecordingSynthesizer::new();
        synth.press_button(MouseButton::Primary, Point::new(1.0, 1.0)).unwrap();
        synth.scroll(-5).unwrap();
        synth.send_copy_chord().unwrap();
        assert_eq!(
            synth.calls(),
            vec![
                SynthCall::Press(MouseButton::Primary, Point::new(1.0, 1.0)),
                SynthCall::Scroll(-5),
                SynthCall::CopyChord,
            ]
        );
    }

    #[test]
    fn test_cursor_follows_successful_moves_only() {
        // Arrange
        let ok = RecordingSynthesizer::new();
        let failing = RecordingSynthesizer::failing();

        // Act
        ok.move_to(Point::new(5.0, 6.0), false).unwrap();
        let err = failing.move_to(Point::new(5.0, 6.0), false);

        // Assert
        assert_eq!(ok.cursor_position(), Some(Point::new(5.0, 6.0)));
        assert!(err.is_err());
        assert_eq!(failing.cursor_position(), None);
        assert_eq!(failing.calls().len(), 1);
    }
}
