//! Tap-vs-hold gesture detection for the overlay toggle key.
//!
//! The overlay is summoned by *tapping* a modifier key: pressing and releasing
//! it quickly without touching anything else.  Holding the same modifier for a
//! normal shortcut (Cmd+C, Alt+Tab, ...) must never toggle the overlay, so the
//! detector only fires when:
//!
//! 1. the toggle key went down,
//! 2. no other key or modifier changed while it was held, and
//! 3. it came back up strictly less than `threshold` later.
//!
//! Time is injected: callers pass the timestamp carried by each event, so the
//! detector is deterministic under test.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::keymap::Key;

/// Default tap threshold.
pub const DEFAULT_TAP_THRESHOLD: Duration = Duration::from_millis(300);

/// Emitted when a complete tap of the toggle key has been recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapDetected {
    /// How long the key was held.
    pub held_ms: u64,
}

/// Watches one modifier key and classifies down/up pairs as taps.
#[derive(Debug, Clone)]
pub struct TapDetector {
    toggle_key: Key,
    threshold_ms: u64,
    /// Timestamp of the pending down, if any.
    pending_since: Option<u64>,
}

impl TapDetector {
    pub fn new(toggle_key: Key, threshold: Duration) -> Self {
        Self {
            toggle_key,
            threshold_ms: u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX),
            pending_since: None,
        }
    }

    pub fn toggle_key(&self) -> Key {
        self.toggle_key
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Feeds one modifier state change.
    ///
    /// Returns `Some(TapDetected)` only for the release that completes a tap.
    /// A change of any other modifier cancels the pending tap.  Auto-repeated
    /// downs of the toggle key keep the first timestamp.
    pub fn on_modifier_event(&mut self, key: Key, pressed: bool, time_ms: u64) -> Option<TapDetected> {
        if key != self.toggle_key {
            self.pending_since = None;
            return None;
        }

        if pressed {
            if self.pending_since.is_none() {
                self.pending_since = Some(time_ms);
            }
            return None;
        }

        let down_at = self.pending_since.take()?;
        let held_ms = time_ms.saturating_sub(down_at);
        if held_ms < self.threshold_ms {
            Some(TapDetected { held_ms })
        } else {
            trace!(held_ms, threshold_ms = self.threshold_ms, "toggle key held, not a tap");
            None
        }
    }

    /// A non-modifier key went down while the toggle key may be held.
    pub fn on_key_down(&mut self) {
        self.pending_since = None;
    }

    /// Drops any pending tap.
    pub fn reset(&mut self) {
        self.pending_since = None;
    }
}

/// Source of monotonic millisecond timestamps.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by [`Instant`], counting from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
