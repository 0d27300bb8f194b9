// ── Platform abstraction layer ────────────────────────────────────────────────
//
// The window shell and the OLE drop target.  No `unsafe` lives here; all
// Win32 FFI is confined to the `win32` sub-module and never leaks outward.
// Other targets have no window shell and only convert launch arguments.

#[cfg(windows)]
pub mod win32;
