// ── OLE drop target ───────────────────────────────────────────────────────────
//
// Adapts `IDropTarget` callbacks to `drop_surface`:
//   • DragEnter reads the CF_HDROP file list and asks `on_drag_enter`.
//   • DragOver repeats that decision as the drop effect.
//   • Drop runs `on_drop` synchronously on the UI thread (OLE calls every
//     method on the thread that registered the target) and shows the report
//     on the surface.
// Drags that carry no file list (text, browser links) arrive as an empty
// payload and are rejected.

#![allow(unsafe_code)]

use std::{cell::Cell, ffi::OsString, os::windows::ffi::OsStringExt, path::PathBuf};

use windows::{
    core::implement,
    Win32::{
        Foundation::{HWND, POINTL},
        System::{
            Com::{IDataObject, DVASPECT_CONTENT, FORMATETC, STGMEDIUM, TYMED_HGLOBAL},
            Ole::{
                IDropTarget, IDropTarget_Impl, RegisterDragDrop, ReleaseStgMedium,
                RevokeDragDrop, DROPEFFECT, DROPEFFECT_COPY, DROPEFFECT_NONE,
            },
            SystemServices::MODIFIERKEYS_FLAGS,
        },
        UI::Shell::{DragQueryFileW, HDROP},
    },
};
use windows_core::Ref;

use super::window;
use crate::{
    convert::MarkdownConverter,
    drop_surface::{self, DragPayload},
    error::{AppError, Result},
    logging::TracingLog,
};

/// Standard clipboard format for a list of file paths.
const CF_HDROP: u16 = 15;

/// `DragQueryFileW` index that asks for the number of files.
const QUERY_FILE_COUNT: u32 = 0xFFFF_FFFF;

// ── Registration ──────────────────────────────────────────────────────────────

/// Make the client area of `hwnd` a drop target.
///
/// OLE holds its own reference until `revoke`; the returned interface is the
/// caller's reference and should live as long as the message loop.
pub(crate) fn register(hwnd: HWND) -> Result<IDropTarget> {
    let target: IDropTarget = SurfaceDropTarget {
        hwnd,
        converter: MarkdownConverter,
        accepted: Cell::new(false),
    }
    .into();

    // SAFETY: OleInitialize has been called on this thread and hwnd is a
    // live window owned by it.
    unsafe { RegisterDragDrop(hwnd, &target) }.map_err(AppError::from)?;
    Ok(target)
}

/// Undo `register`.  Must run before `hwnd` is destroyed.
pub(crate) fn revoke(hwnd: HWND) {
    // SAFETY: hwnd is still valid (called from WM_DESTROY).  Failure only
    // means no target was registered, which needs no handling.
    unsafe {
        let _ = RevokeDragDrop(hwnd);
    }
}

// ── IDropTarget ───────────────────────────────────────────────────────────────

#[implement(IDropTarget)]
struct SurfaceDropTarget {
    hwnd: HWND,
    converter: MarkdownConverter,
    /// Decision taken at DragEnter, held until DragLeave or Drop.
    accepted: Cell<bool>,
}

impl SurfaceDropTarget {
    fn effect(&self) -> DROPEFFECT {
        if self.accepted.get() {
            DROPEFFECT_COPY
        } else {
            DROPEFFECT_NONE
        }
    }
}

impl IDropTarget_Impl for SurfaceDropTarget_Impl {
    fn DragEnter(
        &self,
        pdataobj: Ref<'_, IDataObject>,
        _grfkeystate: MODIFIERKEYS_FLAGS,
        _pt: &POINTL,
        pdweffect: *mut DROPEFFECT,
    ) -> windows_core::Result<()> {
        let payload = read_payload(pdataobj.as_ref());
        let decision = drop_surface::on_drag_enter(&payload, &TracingLog);
        self.accepted.set(decision.is_accept());
        set_effect(pdweffect, self.effect());
        Ok(())
    }

    fn DragOver(
        &self,
        _grfkeystate: MODIFIERKEYS_FLAGS,
        _pt: &POINTL,
        pdweffect: *mut DROPEFFECT,
    ) -> windows_core::Result<()> {
        set_effect(pdweffect, self.effect());
        Ok(())
    }

    fn DragLeave(&self) -> windows_core::Result<()> {
        self.accepted.set(false);
        Ok(())
    }

    fn Drop(
        &self,
        pdataobj: Ref<'_, IDataObject>,
        _grfkeystate: MODIFIERKEYS_FLAGS,
        _pt: &POINTL,
        pdweffect: *mut DROPEFFECT,
    ) -> windows_core::Result<()> {
        // A rejected drag never reaches the surface.
        if !self.accepted.replace(false) {
            set_effect(pdweffect, DROPEFFECT_NONE);
            return Ok(());
        }

        let payload = read_payload(pdataobj.as_ref());
        let pending = payload.accepted_files().len();
        window::set_surface_text(
            self.hwnd,
            format!("Converting {pending} file{}…", if pending == 1 { "" } else { "s" }),
        );

        let report = drop_surface::on_drop(&payload, &self.converter, &TracingLog);
        window::set_surface_text(self.hwnd, report.status_text());

        set_effect(pdweffect, DROPEFFECT_COPY);
        Ok(())
    }
}

fn set_effect(out: *mut DROPEFFECT, effect: DROPEFFECT) {
    if out.is_null() {
        return;
    }
    // SAFETY: OLE passes a valid, writable DROPEFFECT that lives for the
    // duration of the callback; null was excluded above.
    unsafe { *out = effect };
}

// ── CF_HDROP extraction ───────────────────────────────────────────────────────

/// File paths carried by `data`, in the order the source listed them.  Any
/// failure to read the list yields an empty payload.
fn read_payload(data: Option<&IDataObject>) -> DragPayload {
    let Some(data) = data else {
        return DragPayload::default();
    };

    let format = FORMATETC {
        cfFormat: CF_HDROP,
        ptd: std::ptr::null_mut(),
        dwAspect: DVASPECT_CONTENT.0 as u32,
        lindex: -1,
        tymed: TYMED_HGLOBAL.0 as u32,
    };

    // SAFETY: format is a fully initialised FORMATETC that outlives the call.
    let Ok(mut medium) = (unsafe { data.GetData(&format) }) else {
        return DragPayload::default();
    };

    // SAFETY: medium came from a successful GetData for CF_HDROP.
    let paths = unsafe { hdrop_paths(&medium) };

    // SAFETY: medium is owned by us after GetData and released exactly once.
    unsafe { ReleaseStgMedium(&mut medium) };

    DragPayload::from_paths(paths)
}

/// Read every path from an HGLOBAL-backed CF_HDROP medium.
///
/// # Safety
/// `medium` must be the result of a successful `GetData` for CF_HDROP that
/// has not been released yet.
unsafe fn hdrop_paths(medium: &STGMEDIUM) -> Vec<PathBuf> {
    if medium.tymed != TYMED_HGLOBAL.0 as u32 || medium.u.hGlobal.0.is_null() {
        return Vec::new();
    }

    let hdrop = HDROP(medium.u.hGlobal.0);
    let count = DragQueryFileW(hdrop, QUERY_FILE_COUNT, None);

    let mut paths = Vec::with_capacity(count as usize);
    for index in 0..count {
        // Length excludes the terminator; the buffer needs room for it.
        let len = DragQueryFileW(hdrop, index, None);
        if len == 0 {
            continue;
        }
        let mut buf = vec![0u16; len as usize + 1];
        let copied = DragQueryFileW(hdrop, index, Some(&mut buf));
        paths.push(PathBuf::from(OsString::from_wide(&buf[..copied as usize])));
    }
    paths
}
