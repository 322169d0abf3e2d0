//! Infrastructure layer for the daemon.
//!
//! Contains the OS-facing adapters behind the application ports.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `gridclick_core`, but MUST NOT be imported by the `application` or domain
//! layers (tests excepted).
//!
//! # Sub-modules
//!
//! - **`input_capture`** – global keyboard interception (`WH_KEYBOARD_LL` /
//!   `CGEventTap` / XRecord).  A `MockInterceptor` is provided for tests.
//! - **`input_synthesis`** – pointer, wheel and copy-chord injection
//!   (`SendInput` / `CGEventPost` / XTest).  A `RecordingSynthesizer` is
//!   provided for tests.
//! - **`screen_info`** – display enumeration for choosing the grid's target.
//! - **`overlay`** – the shared snapshot a renderer draws from.
//! - **`storage`** – TOML configuration loading.
//! - **`x11_session`** (Linux) – the Xlib connection and keyboard grab the
//!   X11 interceptor and synthesizer share.

use std::sync::{Arc, Mutex, PoisonError};

use crate::application::handle_keys::OverlayController;
use crate::application::locate_display::DisplayLocator;
use crate::application::synthesize_pointer::PointerSynthesizer;

pub mod input_capture;
pub mod input_synthesis;
pub mod overlay;
pub mod screen_info;
pub mod storage;
#[cfg(target_os = "linux")]
pub mod x11_session;

use input_capture::{CaptureError, EventHandler, InputInterceptor};
use overlay::SharedOverlay;

/// The platform adapters for the current OS.
pub struct NativeBackend {
    pub interceptor: Arc<dyn InputInterceptor>,
    pub synthesizer: Arc<dyn PointerSynthesizer>,
    pub locator: Arc<dyn DisplayLocator>,
    /// The presenter the controller drives.  The X11 interceptor also reads
    /// it to know when to hold the keyboard grab.
    pub overlay: Arc<SharedOverlay>,
}

/// Builds the adapters for the OS this binary was compiled for around
/// `overlay`.
///
/// # Errors
///
/// - [`CaptureError::DisplayUnavailable`] on Linux when no X server is
///   reachable.
/// - [`CaptureError::UnsupportedPlatform`] on anything other than Windows,
///   macOS or Linux.
pub fn native_backend(overlay: Arc<SharedOverlay>) -> Result<NativeBackend, CaptureError> {
    #[cfg(target_os = "windows")]
    {
        Ok(NativeBackend {
            interceptor: Arc::new(input_capture::windows::WindowsKeyboardHook::new()),
            synthesizer: Arc::new(input_synthesis::windows::WindowsPointerSynthesizer::new()),
            locator: Arc::new(screen_info::windows::WindowsDisplayLocator::new()),
            overlay,
        })
    }

    #[cfg(target_os = "macos")]
    {
        Ok(NativeBackend {
            interceptor: Arc::new(input_capture::macos::MacEventTap::new()),
            synthesizer: Arc::new(input_synthesis::macos::MacPointerSynthesizer::new()),
            locator: Arc::new(screen_info::macos::MacDisplayLocator::new()),
            overlay,
        })
    }

    #[cfg(target_os = "linux")]
    {
        let session = Arc::new(x11_session::X11Session::open().map_err(CaptureError::DisplayUnavailable)?);
        let synthesizer = input_synthesis::linux::X11PointerSynthesizer::new(Arc::clone(&session))
            .map_err(|e| CaptureError::DisplayUnavailable(e.to_string()))?;
        Ok(NativeBackend {
            interceptor: Arc::new(input_capture::linux::X11RecordInterceptor::new(
                session,
                Arc::clone(&overlay),
            )),
            synthesizer: Arc::new(synthesizer),
            locator: Arc::new(screen_info::linux::X11DisplayLocator::new()),
            overlay,
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        let _ = overlay;
        Err(CaptureError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }
}

/// Wraps a shared controller as an interceptor callback.
///
/// A poisoned lock is recovered; the controller's state is consistent between
/// events.
pub fn controller_handler(controller: Arc<Mutex<OverlayController>>) -> EventHandler {
    Box::new(move |event| {
        controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle_event(event)
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handle_keys::ControllerSettings;
    use gridclick_core::{EventDecision, GridGeometry, Key, KeyEvent, Mode};

    #[test]
    fn test_controller_handler_forwards_to_controller() {
        // Arrange
        let settings = ControllerSettings {
            toggle_key: Key::AltLeft,
            ..ControllerSettings::default()
        };
        let controller = Arc::new(Mutex::new(OverlayController::new(
            settings,
            Arc::new(input_synthesis::mock::RecordingSynthesizer::default()),
            Arc::new(overlay::SharedOverlay::new(GridGeometry::default())),
            Arc::new(screen_info::mock::FixedDisplayLocator::single_1080p()),
        )));
        let mut handler = controller_handler(Arc::clone(&controller));

        // Act
        handler(KeyEvent::flags_changed(Key::AltLeft, true, 0));
        handler(KeyEvent::flags_changed(Key::AltLeft, false, 50));
        let decision = handler(KeyEvent::down(Key::KeyG, 60));

        // Assert
        assert_eq!(decision, EventDecision::Swallow);
        assert_eq!(controller.lock().unwrap().state().mode, Mode::GridSelection);
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    #[test]
    fn test_native_backend_unsupported_elsewhere() {
        let overlay = Arc::new(SharedOverlay::new(GridGeometry::default()));
        assert!(matches!(native_backend(overlay), Err(CaptureError::UnsupportedPlatform(_))));
    }
}
