//! Global keyboard interception.
//!
//! An [`InputInterceptor`] sits in the OS input path and hands every keyboard
//! event to a synchronous handler *before* the focused application sees it.
//! The handler's [`EventDecision`] decides whether the event continues.
//!
//! # Platform implementations
//!
//! - **Windows**: a `WH_KEYBOARD_LL` hook on the thread that calls `run`,
//!   pumping a Win32 message loop until `stop`.
//! - **macOS**: a session-level `CGEventTap` for key down/up and
//!   flags-changed events, driven by the calling thread's `CFRunLoop`.
//!   Requires the Accessibility permission.
//! - **Linux (X11)**: the XRecord extension observes keys from every client;
//!   an active keyboard grab stands in for swallowing while the overlay is
//!   shown.
//!
//! All adapters skip events this process synthesized itself and report
//! modifier keys as `FlagsChanged` events.
//!
//! # Callback budget
//!
//! The OS removes hooks that stall (about 300 ms on Windows, and macOS
//! disables slow taps).  Handlers must return promptly; the only blocking they
//! may do is the few tens of milliseconds a synthesized click takes.
//!
//! # Testability
//!
//! [`mock::MockInterceptor`] lets tests inject events and observe decisions
//! without any OS hook.

use gridclick_core::{EventDecision, KeyEvent};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

/// The synchronous per-event callback.
pub type EventHandler = Box<dyn FnMut(KeyEvent) -> EventDecision + Send>;

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to install keyboard hook: {0}")]
    HookInstallFailed(String),
    #[error("input monitoring not permitted: {0}")]
    PermissionDenied(String),
    #[error("an interceptor is already running")]
    AlreadyRunning,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
    #[error("cannot connect to the display server: {0}")]
    DisplayUnavailable(String),
}

/// Trait abstracting a global keyboard interceptor.
pub trait InputInterceptor: Send + Sync {
    /// Installs the interceptor and delivers events to `handler` until
    /// [`stop`](Self::stop) is called.  Platform implementations block the
    /// calling thread for that whole time.
    fn run(&self, handler: EventHandler) -> Result<(), CaptureError>;

    /// Asks a running interceptor to uninstall itself and return from `run`.
    /// Safe to call from any thread, and before `run`.
    fn stop(&self);
}
