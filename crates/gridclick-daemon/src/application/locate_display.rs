//! Picks the display the grid covers when the overlay is summoned.
//!
//! Only one display is targeted at a time: the one under the pointer at the
//! moment the overlay opens.

use gridclick_core::{display_at_point, DisplayBounds, Point};
use thiserror::Error;
use tracing::warn;

/// Errors from display enumeration.
#[derive(Debug, Error)]
pub enum ScreenInfoError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("no displays found")]
    NoDisplays,
}

/// Enumerates connected displays.
#[cfg_attr(test, mockall::automock)]
pub trait DisplayLocator: Send + Sync {
    /// All active displays in global coordinates, primary first.
    fn displays(&self) -> Result<Vec<DisplayBounds>, ScreenInfoError>;
}

/// The display containing `pointer`, else the primary display.
///
/// Returns `None` only when enumeration fails or reports nothing.
pub fn display_under_pointer(locator: &dyn DisplayLocator, pointer: Point) -> Option<DisplayBounds> {
    let displays = match locator.displays() {
        Ok(d) => d,
        Err(e) => {
            warn!("display enumeration failed: {e}");
            return None;
        }
    };
    display_at_point(&displays, pointer).or_else(|| displays.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_displays() -> Vec<DisplayBounds> {
        vec![
            DisplayBounds::new(0.0, 0.0, 1920.0, 1080.0),
            DisplayBounds::new(1920.0, 0.0, 2560.0, 1440.0),
        ]
    }

    #[test]
    fn test_pointer_on_secondary_selects_secondary() {
        // Arrange
        let mut locator = MockDisplayLocator::new();
        locator.expect_displays().returning(|| Ok(two_displays()));

        // Act
        let display = display_under_pointer(&locator, Point::new(2000.0, 100.0));

        // Assert
        assert_eq!(display, Some(two_displays()[1]));
    }

    #[test]
    fn test_pointer_in_gap_falls_back_to_primary() {
        let mut locator = MockDisplayLocator::new();
        locator.expect_displays().returning(|| Ok(two_displays()));
        let display = display_under_pointer(&locator, Point::new(100.0, 1300.0));
        assert_eq!(display, Some(two_displays()[0]));
    }

    #[test]
    fn test_enumeration_failure_yields_none() {
        let mut locator = MockDisplayLocator::new();
        locator
            .expect_displays()
            .times(1)
            .returning(|| Err(ScreenInfoError::Platform("denied".into())));
        assert_eq!(display_under_pointer(&locator, Point::default()), None);
    }

    #[test]
    fn test_empty_enumeration_yields_none() {
        let mut locator = MockDisplayLocator::new();
        locator.expect_displays().returning(|| Ok(Vec::new()));
        assert_eq!(display_under_pointer(&locator, Point::default()), None);
    }
}
