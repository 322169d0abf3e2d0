//! Windows display enumeration via `EnumDisplayMonitors` / `GetMonitorInfoW`.
//!
//! `rcMonitor` is already in virtual-desktop coordinates, so secondary
//! monitors left of or above the primary have negative origins.

#![cfg(target_os = "windows")]

use gridclick_core::DisplayBounds;
use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO};

use crate::application::locate_display::{DisplayLocator, ScreenInfoError};

/// `MONITORINFOF_PRIMARY`.
const MONITOR_PRIMARY_FLAG: u32 = 1;

/// Windows implementation of [`DisplayLocator`].
#[derive(Debug, Default)]
pub struct WindowsDisplayLocator;

impl WindowsDisplayLocator {
    pub fn new() -> Self {
        Self
    }
}

impl DisplayLocator for WindowsDisplayLocator {
    fn displays(&self) -> Result<Vec<DisplayBounds>, ScreenInfoError> {
        let mut found: Vec<(DisplayBounds, bool)> = Vec::new();

        // SAFETY: `monitor_enum_proc` has the MONITORENUMPROC signature and
        // `found` outlives the synchronous enumeration.  A null HDC enumerates
        // the whole virtual desktop.
        let ok = unsafe {
            EnumDisplayMonitors(
                HDC::default(),
                None,
                Some(monitor_enum_proc),
                LPARAM(&mut found as *mut Vec<(DisplayBounds, bool)> as isize),
            )
        };
        if !ok.as_bool() {
            return Err(ScreenInfoError::Platform(format!(
                "EnumDisplayMonitors failed: {}",
                windows::core::Error::from_win32()
            )));
        }
        if found.is_empty() {
            return Err(ScreenInfoError::NoDisplays);
        }

        found.sort_by_key(|(_, primary)| !primary);
        Ok(found.into_iter().map(|(bounds, _)| bounds).collect())
    }
}

/// # Safety
///
/// Called by Win32 inside `EnumDisplayMonitors`.  `lparam` must point to the
/// `Vec<(DisplayBounds, bool)>` passed by [`WindowsDisplayLocator::displays`].
unsafe extern "system" fn monitor_enum_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    let found = &mut *(lparam.0 as *mut Vec<(DisplayBounds, bool)>);

    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    // SAFETY: `hmonitor` is a live handle supplied by Win32 and `info.cbSize`
    // is set.
    if GetMonitorInfoW(hmonitor, &mut info).as_bool() {
        let rc = info.rcMonitor;
        found.push((
            DisplayBounds::new(
                f64::from(rc.left),
                f64::from(rc.top),
                f64::from(rc.right - rc.left),
                f64::from(rc.bottom - rc.top),
            ),
            info.dwFlags & MONITOR_PRIMARY_FLAG != 0,
        ));
    }

    BOOL(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_locator_primary_contains_origin() {
        let displays = WindowsDisplayLocator::new().displays().expect("enumerate");
        assert!(displays[0].contains(gridclick_core::Point::new(0.0, 0.0)));
    }
}
