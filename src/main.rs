// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 / COM
// FFI).  Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that the stdout log is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod convert;
mod drop_surface;
mod error;
mod launch;
mod logging;
mod platform;

fn main() {
    logging::init();
    tracing::info!("Starting MarkDrop application");

    let launch_payload = launch::payload_from_args();
    std::process::exit(run(launch_payload));
}

#[cfg(windows)]
fn run(launch_payload: Option<drop_surface::DragPayload>) -> i32 {
    use platform::win32::window;

    // Files dropped onto the executable are converted before the window
    // opens; the outcome becomes the surface's first status text.
    let initial_text = launch_payload
        .as_ref()
        .and_then(|payload| {
            launch::drop_files(payload, &convert::MarkdownConverter, &logging::TracingLog)
        })
        .map(|report| report.status_text());

    match window::run(initial_text) {
        Ok(code) => code,
        Err(e) => {
            // Startup failed before or during the message loop.
            // Show a modal error dialog; the log may have no console.
            tracing::error!("Startup failed: {e}");
            window::show_error_dialog(&e.to_string());
            1
        }
    }
}

#[cfg(not(windows))]
fn run(launch_payload: Option<drop_surface::DragPayload>) -> i32 {
    let Some(payload) = launch_payload else {
        tracing::error!("The drop window is only available on Windows; pass files as arguments");
        return 2;
    };

    match launch::drop_files(&payload, &convert::MarkdownConverter, &logging::TracingLog) {
        Some(report) if report.failure_count() == 0 => 0,
        _ => 1,
    }
}
