//! OverlayController: the overlay's mode state machine.
//!
//! Every global keyboard event passes through [`OverlayController::handle_event`]
//! inline in the OS hook.  The controller updates its state record, calls the
//! synthesis and presentation ports, and returns whether the event should be
//! swallowed.
//!
//! # Modes (for beginners)
//!
//! ```text
//!            tap toggle             two letters            O
//!  Hidden ───────────────▶ GridSelection ──────▶ FineTuning ──────▶ Scrolling
//!    ▲                         ▲   │  ◀──────────────  │                  │
//!    │                         │   │    Backspace       │                  │
//!    └──── ESC / toggle ───────┼───┘                    │                  │
//!    └──── ESC / Enter (copy) ─┼────────────────────────┘                  │
//!    └──── ESC ────────────────┼───────────────────────────────────────────┘
//!                              └──────────── toggle ───────────────────────┘
//! ```
//!
//! While hidden nothing is swallowed and only the tap detector runs.  In any
//! other mode every key down/up is swallowed, modifiers always pass through,
//! and ESC always returns to hidden.
//!
//! # Drag safety
//!
//! All mode changes go through one private `transition` function.  It releases
//! an engaged drag before anything else, so no path out of fine-tuning can
//! leave the primary button held down.

use std::sync::Arc;
use std::time::Duration;

use gridclick_core::domain::gesture::DEFAULT_TAP_THRESHOLD;
use gridclick_core::keymap::bindings::{
    fine_tune_action, platform_toggle_key, scroll_action, FineTuneAction,
};
use gridclick_core::{
    nudge, DisplayBounds, EventDecision, GridGeometry, Key, KeyEvent, KeyEventKind, Letter, Mode,
    NudgeDirection, Point, TapDetector,
};
use tracing::{debug, info, trace, warn};

use super::locate_display::{display_under_pointer, DisplayLocator};
use super::present_overlay::{OverlayPresenter, OverlaySnapshot};
use super::synthesize_pointer::{MouseButton, PointerSynthesizer};

/// Startup-time tunables.  Read-only once the controller exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub geometry: GridGeometry,
    /// Pixels moved per H/J/K/L press.
    pub nudge_step: f64,
    /// Lines scrolled per J/K press in scroll mode.
    pub scroll_lines: i32,
    pub tap_threshold: Duration,
    pub toggle_key: Key,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            geometry: GridGeometry::default(),
            nudge_step: 15.0,
            scroll_lines: 5,
            tap_threshold: DEFAULT_TAP_THRESHOLD,
            toggle_key: platform_toggle_key(),
        }
    }
}

/// The controller's state record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayState {
    pub mode: Mode,
    /// First letter of a label in progress.  Only ever set in grid selection.
    pub first_letter: Option<Letter>,
    /// `true` means a primary button-down has been sent and not yet released.
    pub drag_engaged: bool,
    /// Display the grid was opened on.
    pub display: Option<DisplayBounds>,
    /// Last position the controller moved the pointer to.
    pub pointer: Option<Point>,
}

/// The mode state machine.
pub struct OverlayController {
    state: OverlayState,
    settings: ControllerSettings,
    tap: TapDetector,
    synthesizer: Arc<dyn PointerSynthesizer>,
    presenter: Arc<dyn OverlayPresenter>,
    locator: Arc<dyn DisplayLocator>,
}

impl OverlayController {
    pub fn new(
        settings: ControllerSettings,
        synthesizer: Arc<dyn PointerSynthesizer>,
        presenter: Arc<dyn OverlayPresenter>,
        locator: Arc<dyn DisplayLocator>,
    ) -> Self {
        Self {
            state: OverlayState::default(),
            tap: TapDetector::new(settings.toggle_key, settings.tap_threshold),
            settings,
            synthesizer,
            presenter,
            locator,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            mode: self.state.mode,
            first_letter: self.state.first_letter,
            drag_engaged: self.state.drag_engaged,
            display: self.state.display,
            geometry: self.settings.geometry,
        }
    }

    /// Processes one intercepted event and decides its fate.
    ///
    /// State changes for this event are complete before the function returns.
    pub fn handle_event(&mut self, event: KeyEvent) -> EventDecision {
        if self.state.mode == Mode::Hidden {
            self.watch_for_toggle(event);
            return EventDecision::PassThrough;
        }

        let pressed = match event.kind {
            KeyEventKind::FlagsChanged { .. } => return EventDecision::PassThrough,
            KeyEventKind::Down => true,
            KeyEventKind::Up => false,
        };

        if pressed && event.key == Key::Escape {
            self.cancel();
            return EventDecision::Swallow;
        }

        match self.state.mode {
            Mode::GridSelection if pressed => self.on_grid_key(event.key),
            Mode::FineTuning => self.on_fine_tune_key(event.key, pressed),
            Mode::Scrolling if pressed => self.on_scroll_key(event.key),
            _ => {}
        }
        EventDecision::Swallow
    }

    /// Toggle gesture: opens the grid from hidden or scrolling, otherwise hides.
    pub fn toggle_overlay(&mut self) {
        match self.state.mode {
            Mode::Hidden | Mode::Scrolling => self.open_grid(),
            Mode::GridSelection | Mode::FineTuning => self.transition(Mode::Hidden),
        }
        self.presenter.request_redraw();
    }

    /// Forced exit.  Always ends hidden with no drag engaged.
    pub fn cancel(&mut self) {
        let was_active = self.state.mode.is_active();
        self.transition(Mode::Hidden);
        if was_active {
            self.presenter.request_redraw();
        }
    }

    // ── Per-mode handlers ─────────────────────────────────────────────────────

    fn watch_for_toggle(&mut self, event: KeyEvent) {
        match event.kind {
            KeyEventKind::FlagsChanged { pressed } => {
                if let Some(tap) = self.tap.on_modifier_event(event.key, pressed, event.time_ms) {
                    debug!(held_ms = tap.held_ms, "toggle tap detected");
                    self.toggle_overlay();
                }
            }
            KeyEventKind::Down => self.tap.on_key_down(),
            KeyEventKind::Up => {}
        }
    }

    fn on_grid_key(&mut self, key: Key) {
        if key == Key::Backspace {
            self.set_first_letter(None);
            self.presenter.request_redraw();
            return;
        }

        let Some(letter) = key.letter() else {
            trace!(?key, "unbound key in grid selection");
            return;
        };

        match self.state.first_letter {
            None => {
                self.set_first_letter(Some(letter));
                self.presenter.request_redraw();
            }
            Some(first) => self.select_cell(first, letter),
        }
    }

    fn on_fine_tune_key(&mut self, key: Key, pressed: bool) {
        let Some(action) = fine_tune_action(key) else {
            trace!(?key, "unbound key in fine-tuning");
            return;
        };

        match (action, pressed) {
            (FineTuneAction::Drag, true) => {
                if !self.state.drag_engaged {
                    self.engage_drag();
                }
            }
            (FineTuneAction::Drag, false) => {
                if self.state.drag_engaged {
                    self.release_drag();
                }
            }
            (_, false) => {}
            (FineTuneAction::Nudge(direction), true) => self.nudge(direction),
            (FineTuneAction::PrimaryClick, true) => self.click(MouseButton::Primary),
            (FineTuneAction::SecondaryClick, true) => self.click(MouseButton::Secondary),
            (FineTuneAction::EnterScroll, true) => {
                info!("scroll mode");
                self.transition(Mode::Scrolling);
                self.presenter.request_redraw();
            }
            (FineTuneAction::CopyAndExit, true) => self.copy_and_exit(),
            (FineTuneAction::Back, true) => {
                self.transition(Mode::GridSelection);
                self.presenter.request_redraw();
            }
        }
    }

    fn on_scroll_key(&mut self, key: Key) {
        let Some(direction) = scroll_action(key) else {
            return;
        };
        let lines = direction.line_delta(self.settings.scroll_lines);
        if let Err(e) = self.synthesizer.scroll(lines) {
            warn!("scroll by {lines} lines failed: {e}");
        }
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    fn open_grid(&mut self) {
        let pointer = self.pointer_position();
        match display_under_pointer(self.locator.as_ref(), pointer) {
            Some(display) => {
                self.state.display = Some(display);
                self.presenter.set_display(display);
            }
            None => {
                self.state.display = None;
                warn!("no display under the pointer; labels will be discarded");
            }
        }
        self.transition(Mode::GridSelection);
    }

    fn select_cell(&mut self, first: Letter, second: Letter) {
        let cell = match self.settings.geometry.decode_label(first, second) {
            Ok(cell) => cell,
            Err(e) => {
                debug!("discarding label {first}{second}: {e}");
                self.set_first_letter(None);
                self.presenter.request_redraw();
                return;
            }
        };

        let Some(display) = self.state.display else {
            warn!("discarding label {first}{second}: no active display");
            self.set_first_letter(None);
            self.presenter.request_redraw();
            return;
        };

        let target = self.settings.geometry.cell_to_point(cell, &display);
        debug!(row = cell.row, col = cell.col, x = target.x, y = target.y, "cell {first}{second} selected");
        self.move_pointer(target);
        self.transition(Mode::FineTuning);
        self.presenter.request_redraw();
    }

    fn nudge(&mut self, direction: NudgeDirection) {
        let (dx, dy) = direction.offset(self.settings.nudge_step);
        let target = nudge(self.pointer_position(), dx, dy);
        self.move_pointer(target);
    }

    fn move_pointer(&mut self, target: Point) {
        if let Err(e) = self.synthesizer.move_to(target, self.state.drag_engaged) {
            warn!("pointer move to ({}, {}) failed: {e}", target.x, target.y);
        }
        self.state.pointer = Some(target);
    }

    fn click(&mut self, button: MouseButton) {
        let at = self.pointer_position();
        if let Err(e) = self.synthesizer.click(button, at) {
            warn!("{button:?} click failed: {e}");
        }
    }

    fn engage_drag(&mut self) {
        let at = self.pointer_position();
        if let Err(e) = self.synthesizer.press_button(MouseButton::Primary, at) {
            warn!("drag press failed: {e}");
        }
        // Set regardless of the press result so every exit path still sends a release.
        self.state.drag_engaged = true;
        self.presenter.set_drag_engaged(true);
        debug!("drag engaged");
    }

    fn release_drag(&mut self) {
        let at = self.pointer_position();
        if let Err(e) = self.synthesizer.release_button(MouseButton::Primary, at) {
            warn!("drag release failed: {e}");
        }
        self.state.drag_engaged = false;
        self.presenter.set_drag_engaged(false);
        debug!("drag released");
    }

    fn copy_and_exit(&mut self) {
        if self.state.drag_engaged {
            self.release_drag();
        }
        if let Err(e) = self.synthesizer.send_copy_chord() {
            warn!("copy chord failed: {e}");
        }
        info!("copied selection, overlay hidden");
        self.transition(Mode::Hidden);
        self.presenter.request_redraw();
    }

    // ── State plumbing ────────────────────────────────────────────────────────

    /// Single exit point for mode changes.
    fn transition(&mut self, next: Mode) {
        if self.state.drag_engaged {
            self.release_drag();
        }
        self.set_first_letter(None);
        if next == Mode::Hidden {
            self.tap.reset();
            self.state.display = None;
        }

        let previous = std::mem::replace(&mut self.state.mode, next);
        if previous != next {
            debug!(%previous, %next, "mode transition");
            self.presenter.set_mode(next);
        }
    }

    fn set_first_letter(&mut self, letter: Option<Letter>) {
        self.state.first_letter = letter;
        self.presenter.set_label(letter);
    }

    /// Where the pointer is now: asked from the OS, else where we last put it.
    fn pointer_position(&self) -> Point {
        self.synthesizer
            .cursor_position()
            .or(self.state.pointer)
            .unwrap_or_default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
