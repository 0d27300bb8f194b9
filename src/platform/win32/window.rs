// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class, with `icon.ico` when it can be loaded.
//   • Create the fixed-size top-level window and register it as a drop target.
//   • Paint the drop surface: dashed rounded box with centred status text.
//   • Run the Win32 message loop and hand back the WM_QUIT exit code.
//   • Expose a safe error-dialog helper for use by main().

#![allow(unsafe_code)]

use std::{cell::RefCell, path::PathBuf};

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{
            BeginPaint, CreateFontIndirectW, CreatePen, CreateSolidBrush, DeleteObject, DrawTextW,
            EndPaint, GetStockObject, InvalidateRect, RoundRect, SelectObject, SetBkMode,
            SetTextColor, UpdateWindow, DT_CALCRECT, DT_CENTER, DT_NOPREFIX, DT_WORDBREAK,
            HBRUSH, HDC, HGDIOBJ, LOGFONTW, PAINTSTRUCT, PS_DASH, TRANSPARENT, WHITE_BRUSH,
        },
        System::{
            LibraryLoader::GetModuleHandleW,
            Ole::{OleInitialize, OleUninitialize},
        },
        UI::WindowsAndMessaging::{
            AdjustWindowRectEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
            GetClientRect, GetMessageW, LoadCursorW, LoadIconW, LoadImageW, MessageBoxW,
            PostQuitMessage, RegisterClassExW, ShowWindow, TranslateMessage, CS_HREDRAW,
            CS_VREDRAW, CW_USEDEFAULT, HICON, IDC_ARROW, IDI_APPLICATION, IMAGE_ICON,
            LR_DEFAULTSIZE, LR_LOADFROMFILE, MB_ICONERROR, MB_OK, MSG, SW_SHOW, WINDOW_EX_STYLE,
            WINDOW_STYLE, WM_CLOSE, WM_DESTROY, WM_PAINT, WNDCLASSEXW, WS_CAPTION,
            WS_MINIMIZEBOX, WS_OVERLAPPED, WS_SYSMENU,
        },
    },
};

use super::{dpi, dpi::Dpi, drop_target, to_wide};
use crate::error::{AppError, Result};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
const CLASS_NAME: PCWSTR = w!("MarkDropMainWindow");

/// Client width at 96 DPI.  The window cannot be resized.
const CLIENT_WIDTH: i32 = 500;

/// Client height at 96 DPI.
const CLIENT_HEIGHT: i32 = 300;

/// Caption, minimize and close only: no resize border, no maximize box.
const WINDOW_STYLE_FIXED: WINDOW_STYLE =
    WINDOW_STYLE(WS_OVERLAPPED.0 | WS_CAPTION.0 | WS_SYSMENU.0 | WS_MINIMIZEBOX.0);

/// Optional window icon, looked up next to the executable.
const ICON_FILE: &str = "icon.ico";

// ── Drop surface look ─────────────────────────────────────────────────────────

/// Text shown until the first drop.
const PROMPT: &str = "Drag and drop PDF, Word (docx), or PowerPoint (pptx) files here";

// Lengths at 96 DPI.
const SURFACE_MARGIN: i32 = 10;
const SURFACE_PADDING: i32 = 16;
const SURFACE_RADIUS: i32 = 16;
const SURFACE_FONT_PX: i32 = 16;

// COLORREF is 0x00BBGGRR; these are all greys.
const SURFACE_FILL: COLORREF = COLORREF(0x00F0_F0F0);
const SURFACE_BORDER: COLORREF = COLORREF(0x00AA_AAAA);
const SURFACE_TEXT_COLOR: COLORREF = COLORREF(0x0033_3333);

thread_local! {
    /// Text painted in the middle of the drop surface.  Only the UI thread
    /// reads or writes it.
    static SURFACE_TEXT: RefCell<String> = RefCell::new(PROMPT.to_owned());
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Register the window class, create the window, accept drops on it, and
/// drive the message loop until the user closes the application.
///
/// `initial_text` replaces the prompt (used when files were passed at
/// launch).  Returns the exit code carried by WM_QUIT.
pub(crate) fn run(initial_text: Option<String>) -> Result<i32> {
    dpi::init();

    if let Some(text) = initial_text {
        SURFACE_TEXT.with(|t| *t.borrow_mut() = text);
    }

    // SAFETY: GetModuleHandleW(null) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime and never fails in practice.
    let hmodule = unsafe { GetModuleHandleW(PCWSTR::null()) }.map_err(AppError::from)?;
    let hinstance = HINSTANCE(hmodule.0);

    register_class(hinstance)?;
    let hwnd = create_window(hinstance)?;

    // SAFETY: called once on the UI thread before any OLE drag-and-drop API.
    // Balanced by OleUninitialize below, after the message loop ends.
    unsafe { OleInitialize(None) }.map_err(AppError::from)?;

    let result = drop_target::register(hwnd).and_then(|_target| {
        // SAFETY: hwnd was just returned by CreateWindowExW and is valid.
        // ShowWindow returns the previous visibility state; UpdateWindow returns
        // a success BOOL; both are intentionally ignored here.
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
        }
        tracing::info!("Application window displayed");

        // `_target` keeps our reference to the drop target alive until the
        // loop ends; WM_DESTROY revokes the registration.
        message_loop()
    });

    // SAFETY: matches the successful OleInitialize above, same thread.
    unsafe { OleUninitialize() };

    result
}

/// Replace the drop surface text and repaint it immediately.
///
/// Immediate because drops are converted synchronously: without it the
/// surface would not update until the whole batch had finished.
pub(crate) fn set_surface_text(hwnd: HWND, text: String) {
    SURFACE_TEXT.with(|t| *t.borrow_mut() = text);

    // SAFETY: hwnd is the live main window (the drop target only exists
    // while it is registered on that window).  Return values carry no
    // actionable failure information.
    unsafe {
        let _ = InvalidateRect(Some(hwnd), None, true);
        let _ = UpdateWindow(hwnd);
    }
}

/// Show a modal error dialog with the given message.
///
/// Safe to call from any context; performs the UTF-16 conversion internally.
/// Used by `main()` when `run()` returns an error.
pub(crate) fn show_error_dialog(message: &str) {
    let msg_wide = to_wide(message);

    // SAFETY: msg_wide is a valid null-terminated UTF-16 string that remains
    // allocated for the duration of the MessageBoxW call.  No owner window.
    // Return value (button pressed) is intentionally unused for an error dialog.
    unsafe {
        let _ = MessageBoxW(
            None,
            PCWSTR(msg_wide.as_ptr()),
            w!("MarkDrop: fatal error"),
            MB_OK | MB_ICONERROR,
        );
    }
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    let icon = match load_window_icon() {
        Some(icon) => icon,
        // SAFETY: LoadIconW with IDI_APPLICATION loads the built-in
        // application icon, which exists on all Windows versions.
        None => unsafe { LoadIconW(None, IDI_APPLICATION) }.map_err(AppError::from)?,
    };

    // SAFETY: LoadCursorW with IDC_ARROW always succeeds; the arrow cursor is
    // a built-in resource guaranteed to exist on all Windows versions.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.map_err(AppError::from)?;

    // SAFETY: GetStockObject with WHITE_BRUSH always returns a valid HGDIOBJ.
    // Casting to HBRUSH is correct: stock brush objects are compatible types.
    let bg_brush = unsafe { HBRUSH(GetStockObject(WHITE_BRUSH).0) };

    let wndclass = WNDCLASSEXW {
        // WNDCLASSEXW is ~80 bytes; the cast to u32 is always lossless.
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        hInstance: hinstance,
        hIcon: icon,
        hCursor: cursor,
        hbrBackground: bg_brush,
        lpszClassName: CLASS_NAME,
        hIconSm: icon,
        ..Default::default()
    };

    // SAFETY: wndclass is fully initialised with valid handles;
    // CLASS_NAME is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW"));
    }

    Ok(())
}

/// Best effort: `icon.ico` beside the executable, or `None` so the caller
/// falls back to the stock icon.  Never an error.
fn load_window_icon() -> Option<HICON> {
    let path: PathBuf = std::env::current_exe().ok()?.parent()?.join(ICON_FILE);
    tracing::info!("Icon path: {}", path.display());

    if !path.exists() {
        return None;
    }

    let path_wide = to_wide(&path);
    // SAFETY: path_wide is a valid null-terminated UTF-16 path that outlives
    // the call.  LR_LOADFROMFILE reads the file; no module handle is needed.
    let handle = unsafe {
        LoadImageW(
            None,
            PCWSTR(path_wide.as_ptr()),
            IMAGE_ICON,
            0,
            0,
            LR_LOADFROMFILE | LR_DEFAULTSIZE,
        )
    }
    .ok()?;

    Some(HICON(handle.0))
}

// ── Window creation ───────────────────────────────────────────────────────────

fn create_window(hinstance: HINSTANCE) -> Result<HWND> {
    let dpi = Dpi::system();

    // Grow the client size by the caption and border so the drop surface
    // gets the full CLIENT_WIDTH × CLIENT_HEIGHT.
    let mut frame = RECT {
        left: 0,
        top: 0,
        right: dpi.scale(CLIENT_WIDTH),
        bottom: dpi.scale(CLIENT_HEIGHT),
    };
    // SAFETY: frame is a valid, writable RECT for the duration of the call.
    unsafe { AdjustWindowRectEx(&mut frame, WINDOW_STYLE_FIXED, false, WINDOW_EX_STYLE(0)) }
        .map_err(AppError::from)?;

    let title = to_wide(format!("MarkDrop v{}", env!("CARGO_PKG_VERSION")));

    // SAFETY: CLASS_NAME was just registered; hinstance is the exe's module;
    // title outlives the call.  No parent, no menu, no creation data.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            PCWSTR(title.as_ptr()),
            WINDOW_STYLE_FIXED,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            frame.right - frame.left,
            frame.bottom - frame.top,
            None,
            None,
            Some(hinstance),
            None,
        )
    }
    .map_err(AppError::from)?;

    Ok(hwnd)
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop() -> Result<i32> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; None retrieves messages
        // for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };

        match ret.0 {
            // GetMessageW returns -1 on error.
            -1 => return Err(last_error("GetMessageW")),
            // Returns 0 when WM_QUIT is retrieved; exit the loop cleanly.
            0 => break,
            // Any other value: a normal message to dispatch.
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessageW call.
                // TranslateMessage return value (whether it generated WM_CHAR)
                // and DispatchMessageW's LRESULT are intentionally unused.
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            },
        }
    }

    // WM_QUIT carries the PostQuitMessage exit code in wParam.
    Ok(msg.wParam.0 as i32)
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            paint(hwnd);
            LRESULT(0)
        }

        WM_CLOSE => {
            // SAFETY: hwnd is the window being closed; DestroyWindow triggers
            // WM_DESTROY, which posts WM_QUIT via PostQuitMessage.
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            // The drop target must be revoked while the window still exists.
            drop_target::revoke(hwnd);
            // SAFETY: PostQuitMessage with exit code 0 is always safe to call
            // from WM_DESTROY. It posts WM_QUIT to the thread's message queue.
            PostQuitMessage(0);
            LRESULT(0)
        }

        // Default processing for all unhandled messages.
        // SAFETY: hwnd and message parameters are valid, provided by Windows.
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Painting ──────────────────────────────────────────────────────────────────

fn paint(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    // SAFETY: called from WM_PAINT for hwnd; ps is a valid, writable
    // PAINTSTRUCT and is passed unchanged to EndPaint below.
    let hdc = unsafe { BeginPaint(hwnd, &mut ps) };

    let mut client = RECT::default();
    // SAFETY: hwnd is valid for this message; client is writable.
    if unsafe { GetClientRect(hwnd, &mut client) }.is_ok() {
        let text = SURFACE_TEXT.with(|t| t.borrow().clone());
        draw_surface(hdc, client, Dpi::of_window(hwnd), &text);
    }

    // SAFETY: pairs with BeginPaint above.
    unsafe {
        let _ = EndPaint(hwnd, &ps);
    }
}

/// Rounded, dashed, light-grey box inset from the client edge, with `text`
/// centred both ways inside it.
fn draw_surface(hdc: HDC, client: RECT, dpi: Dpi, text: &str) {
    let margin = dpi.scale(SURFACE_MARGIN);
    let surface = RECT {
        left: client.left + margin,
        top: client.top + margin,
        right: client.right - margin,
        bottom: client.bottom - margin,
    };
    let radius = dpi.scale(SURFACE_RADIUS);

    let mut face = [0u16; 32];
    for (dst, src) in face.iter_mut().zip("Segoe UI".encode_utf16()) {
        *dst = src;
    }
    let logfont = LOGFONTW {
        lfHeight: -dpi.scale(SURFACE_FONT_PX),
        lfWeight: 400,
        lfFaceName: face,
        ..Default::default()
    };

    // SAFETY: hdc is the paint DC from BeginPaint.  Every GDI object created
    // here is selected out again before it is deleted, and the previously
    // selected objects are restored before returning.
    unsafe {
        let fill = CreateSolidBrush(SURFACE_FILL);
        let border = CreatePen(PS_DASH, 1, SURFACE_BORDER);
        let old_brush = SelectObject(hdc, HGDIOBJ(fill.0));
        let old_pen = SelectObject(hdc, HGDIOBJ(border.0));
        let _ = RoundRect(
            hdc,
            surface.left,
            surface.top,
            surface.right,
            surface.bottom,
            radius,
            radius,
        );
        SelectObject(hdc, old_pen);
        SelectObject(hdc, old_brush);
        let _ = DeleteObject(HGDIOBJ(border.0));
        let _ = DeleteObject(HGDIOBJ(fill.0));

        let font = CreateFontIndirectW(&logfont);
        let old_font = SelectObject(hdc, HGDIOBJ(font.0));
        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, SURFACE_TEXT_COLOR);

        let pad = dpi.scale(SURFACE_PADDING);
        let mut bounds = RECT {
            left: surface.left + pad,
            top: surface.top + pad,
            right: surface.right - pad,
            bottom: surface.bottom - pad,
        };
        let mut wide: Vec<u16> = text.encode_utf16().collect();
        let format = DT_CENTER | DT_WORDBREAK | DT_NOPREFIX;

        // Measure first, then shift down so the block is vertically centred.
        let mut measured = bounds;
        DrawTextW(hdc, &mut wide, &mut measured, format | DT_CALCRECT);
        let spare = (bounds.bottom - bounds.top) - (measured.bottom - measured.top);
        bounds.top += spare.max(0) / 2;
        DrawTextW(hdc, &mut wide, &mut bounds, format);

        SelectObject(hdc, old_font);
        let _ = DeleteObject(HGDIOBJ(font.0));
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in an `AppError`.
///
/// Call immediately after a Win32 function that signals failure: `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> AppError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    AppError::Win32 {
        function,
        code: code.0,
    }
}
