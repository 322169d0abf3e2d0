//! Fixed display layouts for tests.

use gridclick_core::DisplayBounds;

use crate::application::locate_display::{DisplayLocator, ScreenInfoError};

/// A [`DisplayLocator`] returning a list fixed at construction time.
pub struct FixedDisplayLocator {
    pub displays: Vec<DisplayBounds>,
    pub should_fail: bool,
}

impl FixedDisplayLocator {
    pub fn new(displays: Vec<DisplayBounds>) -> Self {
        Self {
            displays,
            should_fail: false,
        }
    }

    /// One 1920×1080 display at the origin.
    pub fn single_1080p() -> Self {
        Self::new(vec![DisplayBounds::new(0.0, 0.0, 1920.0, 1080.0)])
    }

    /// Two 1920×1080 displays side by side, primary on the left.
    pub fn dual_1080p() -> Self {
        Self::new(vec![
            DisplayBounds::new(0.0, 0.0, 1920.0, 1080.0),
            DisplayBounds::new(1920.0, 0.0, 1920.0, 1080.0),
        ])
    }

    /// Enumeration always fails.
    pub fn failing() -> Self {
        Self {
            displays: Vec::new(),
            should_fail: true,
        }
    }
}

impl DisplayLocator for FixedDisplayLocator {
    fn displays(&self) -> Result<Vec<DisplayBounds>, ScreenInfoError> {
        if self.should_fail {
            return Err(ScreenInfoError::Platform("mock failure".to_string()));
        }
        if self.displays.is_empty() {
            return Err(ScreenInfoError::NoDisplays);
        }
        Ok(self.displays.clone())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_layout_is_primary_first() {
        let displays = FixedDisplayLocator::dual_1080p().displays().unwrap();
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[0].x, 0.0);
        assert_eq!(displays[1].x, 1920.0);
    }

    #[test]
    fn test_empty_layout_reports_no_displays() {
        let result = FixedDisplayLocator::new(Vec::new()).displays();
        assert!(matches!(result, Err(ScreenInfoError::NoDisplays)));
    }

    #[test]
    fn test_failing_locator_reports_platform_error() {
        let result = FixedDisplayLocator::failing().displays();
        assert!(matches!(result, Err(ScreenInfoError::Platform(_))));
    }
}
