//! The port through which the state machine drives the overlay.
//!
//! The renderer itself (window, grid lines, labels, banner) is not part of
//! this crate.  The state machine pushes the few facts a renderer needs and
//! then asks for a redraw; the renderer reads an [`OverlaySnapshot`] and
//! treats it as eventually consistent.

use gridclick_core::{DisplayBounds, GridGeometry, Letter, Mode};

/// Overlay presentation port.
#[cfg_attr(test, mockall::automock)]
pub trait OverlayPresenter: Send + Sync {
    /// The active mode changed.
    fn set_mode(&self, mode: Mode);

    /// The first letter of the label being typed, or `None` once cleared.
    fn set_label(&self, first_letter: Option<Letter>);

    /// A primary button is now held (or released) on the user's behalf.
    fn set_drag_engaged(&self, engaged: bool);

    /// The display the overlay surface should cover.
    fn set_display(&self, display: DisplayBounds);

    /// Something visible changed.
    fn request_redraw(&self);
}

/// Read-only view of everything the renderer draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySnapshot {
    pub mode: Mode,
    pub first_letter: Option<Letter>,
    pub drag_engaged: bool,
    pub display: Option<DisplayBounds>,
    pub geometry: GridGeometry,
}

impl OverlaySnapshot {
    /// A hidden overlay for `geometry`.
    pub fn hidden(geometry: GridGeometry) -> Self {
        Self {
            mode: Mode::Hidden,
            first_letter: None,
            drag_engaged: false,
            display: None,
            geometry,
        }
    }

    pub fn status_hint(&self) -> Option<&'static str> {
        self.mode.status_hint()
    }

    /// Rows the grid should draw: all of them, only the row already typed,
    /// or none outside grid selection.
    pub fn visible_rows(&self) -> std::ops::Range<u8> {
        if self.mode.shows_grid() {
            self.geometry.visible_rows(self.first_letter)
        } else {
            0..0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_snapshot_draws_nothing() {
        let snap = OverlaySnapshot::hidden(GridGeometry::default());
        assert!(snap.status_hint().is_none());
        assert!(snap.visible_rows().is_empty());
    }

    #[test]
    fn test_grid_rows_narrow_once_first_letter_typed() {
        // Arrange
        let mut snap = OverlaySnapshot::hidden(GridGeometry::default());
        snap.mode = Mode::GridSelection;

        // Act / Assert
        assert_eq!(snap.visible_rows(), 0..26);
        snap.first_letter = Letter::from_char('D');
        assert_eq!(snap.visible_rows(), 3..4);
    }

    #[test]
    fn test_fine_tuning_shows_banner_without_grid() {
        let mut snap = OverlaySnapshot::hidden(GridGeometry::default());
        snap.mode = Mode::FineTuning;
        assert!(snap.status_hint().is_some());
        assert!(snap.visible_rows().is_empty());
    }
}
