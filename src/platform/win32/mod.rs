// ── Win32 platform implementation ─────────────────────────────────────────────
//
// The only module in the codebase where `unsafe` code is permitted.  Every
// `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

use std::{ffi::OsStr, os::windows::ffi::OsStrExt};

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub mod window; // main window, painting, message loop

pub(crate) mod dpi; // per-monitor DPI v2 helpers
pub(crate) mod drop_target; // OLE IDropTarget → drop_surface

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Null-terminated UTF-16 copy of `s`, for `PCWSTR` arguments.
pub(crate) fn to_wide(s: impl AsRef<OsStr>) -> Vec<u16> {
    s.as_ref().encode_wide().chain(std::iter::once(0)).collect()
}
