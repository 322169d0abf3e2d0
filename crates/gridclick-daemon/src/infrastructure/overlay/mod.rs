//! Shared overlay state for renderers.
//!
//! [`SharedOverlay`] is the [`OverlayPresenter`] the daemon installs.  It keeps
//! the latest [`OverlaySnapshot`] behind a lock and bumps a generation counter
//! on every redraw request.  A renderer on another thread polls
//! [`SharedOverlay::redraw_generation`] and, when it changes, reads a fresh
//! snapshot.  Without a renderer attached the status hint is still logged, so
//! the daemon is usable from a terminal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use gridclick_core::{DisplayBounds, GridGeometry, Letter, Mode};
use tracing::{debug, info};

use crate::application::present_overlay::{OverlayPresenter, OverlaySnapshot};

/// Lock-protected overlay snapshot plus a redraw counter.
#[derive(Debug)]
pub struct SharedOverlay {
    snapshot: RwLock<OverlaySnapshot>,
    generation: AtomicU64,
}

impl SharedOverlay {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            snapshot: RwLock::new(OverlaySnapshot::hidden(geometry)),
            generation: AtomicU64::new(0),
        }
    }

    /// A copy of the current state.  A poisoned lock still yields the last
    /// written value.
    pub fn snapshot(&self) -> OverlaySnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Number of redraws requested so far.
    pub fn redraw_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn update(&self, f: impl FnOnce(&mut OverlaySnapshot)) {
        match self.snapshot.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl OverlayPresenter for SharedOverlay {
    fn set_mode(&self, mode: Mode) {
        self.update(|s| {
            s.mode = mode;
            if mode == Mode::Hidden {
                s.display = None;
            }
        });
        match mode.status_hint() {
            Some(hint) => info!(%mode, "{hint}"),
            None => info!("overlay hidden"),
        }
    }

    fn set_label(&self, first_letter: Option<Letter>) {
        self.update(|s| s.first_letter = first_letter);
    }

    fn set_drag_engaged(&self, engaged: bool) {
        self.update(|s| s.drag_engaged = engaged);
    }

    fn set_display(&self, bounds: DisplayBounds) {
        debug!(
            x = bounds.x,
            y = bounds.y,
            width = bounds.width,
            height = bounds.height,
            "overlay display"
        );
        self.update(|s| s.display = Some(bounds));
    }

    fn request_redraw(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_overlay_is_hidden() {
        let overlay = SharedOverlay::new(GridGeometry::default());
        let snap = overlay.snapshot();
        assert_eq!(snap.mode, Mode::Hidden);
        assert_eq!(snap.display, None);
        assert_eq!(overlay.redraw_generation(), 0);
    }

    #[test]
    fn test_setters_update_snapshot() {
        // Arrange
        let overlay = SharedOverlay::new(GridGeometry::default());
        let display = DisplayBounds::new(0.0, 0.0, 1920.0, 1080.0);

        // Act
        overlay.set_display(display);
        overlay.set_mode(Mode::GridSelection);
        overlay.set_label(Letter::from_char('g'));
        overlay.set_drag_engaged(true);

        // Assert
        let snap = overlay.snapshot();
        assert_eq!(snap.mode, Mode::GridSelection);
        assert_eq!(snap.display, Some(display));
        assert_eq!(snap.first_letter, Letter::from_char('G'));
        assert!(snap.drag_engaged);
        assert_eq!(snap.visible_rows(), 6..7);
    }

    #[test]
    fn test_set_display_replaces_previous_bounds() {
        let overlay = SharedOverlay::new(GridGeometry::default());
        overlay.set_display(DisplayBounds::new(0.0, 0.0, 1920.0, 1080.0));
        overlay.set_display(DisplayBounds::new(1920.0, 0.0, 2560.0, 1440.0));
        assert_eq!(overlay.snapshot().display, Some(DisplayBounds::new(1920.0, 0.0, 2560.0, 1440.0)));
    }

    #[test]
    fn test_hiding_forgets_display() {
        let overlay = SharedOverlay::new(GridGeometry::default());
        overlay.set_display(DisplayBounds::new(0.0, 0.0, 800.0, 600.0));
        overlay.set_mode(Mode::GridSelection);
        overlay.set_mode(Mode::Hidden);
        assert_eq!(overlay.snapshot().display, None);
    }

    #[test]
    fn test_redraw_bumps_generation() {
        let overlay = SharedOverlay::new(GridGeometry::default());
        overlay.request_redraw();
        overlay.request_redraw();
        assert_eq!(overlay.redraw_generation(), 2);
    }
}
