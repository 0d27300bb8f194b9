#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::HWND,
    UI::HiDpi::{
        GetDpiForSystem, GetDpiForWindow, SetProcessDpiAwarenessContext,
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    },
};

/// Dots per inch of a monitor or window.  Layout constants are written at
/// 96 DPI and scaled through this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Dpi(u32);

impl Dpi {
    pub(crate) const BASE: Self = Self(96);

    /// Primary-monitor DPI. Used before window creation.
    pub(crate) fn system() -> Self {
        // SAFETY: GetDpiForSystem takes no parameters and always succeeds on Win10+.
        Self::or_base(unsafe { GetDpiForSystem() })
    }

    /// DPI of the monitor `hwnd` is on.
    pub(crate) fn of_window(hwnd: HWND) -> Self {
        // SAFETY: hwnd is a valid window handle provided by the caller.
        Self::or_base(unsafe { GetDpiForWindow(hwnd) })
    }

    /// Scale a length given at 96 DPI.
    pub(crate) fn scale(self, px: i32) -> i32 {
        px * self.0 as i32 / Self::BASE.0 as i32
    }

    fn or_base(value: u32) -> Self {
        if value == 0 {
            Self::BASE
        } else {
            Self(value)
        }
    }
}

/// Opt into Per-Monitor v2 DPI awareness.
/// MUST be called before any window is created on the calling thread.
pub(crate) fn init() {
    // SAFETY: Must precede all window creation; single call at process start.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_identity_at_base_dpi() {
        assert_eq!(Dpi::BASE.scale(500), 500);
    }

    #[test]
    fn scale_at_150_percent() {
        assert_eq!(Dpi(144).scale(300), 450);
    }

    #[test]
    fn zero_dpi_falls_back_to_base() {
        assert_eq!(Dpi::or_base(0), Dpi::BASE);
    }
}
