//! Platform display enumeration behind [`DisplayLocator`].
//!
//! | Module    | OS      | API used                                     |
//! |-----------|---------|----------------------------------------------|
//! | `windows` | Windows | `EnumDisplayMonitors` + `GetMonitorInfoW`    |
//! | `macos`   | macOS   | `CGGetActiveDisplayList` + `CGDisplayBounds` |
//! | `linux`   | X11     | `XineramaQueryScreens`, else the root window |
//!
//! All report bounds in global desktop coordinates with a top-left origin and
//! Y growing downwards, the same space the synthesizers post events in.
//!
//! [`mock::FixedDisplayLocator`] is always compiled so tests on any platform
//! can use it without a physical display.
//!
//! [`DisplayLocator`]: crate::application::locate_display::DisplayLocator

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;
