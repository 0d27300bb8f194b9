// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in MarkDrop return `error::Result<T>`.  Per-file
// conversion errors are caught by the drop loop and recorded as outcomes;
// only startup errors reach `main`, which shows them in a dialog.

use thiserror::Error;

/// Every error that MarkDrop can produce.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    /// A Win32 API call returned a failure code.
    #[cfg_attr(not(windows), allow(dead_code))]
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// Reading input metadata or writing the Markdown output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The temporary output could not be renamed over the target.
    #[error("could not replace output file: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// The document converter rejected the file.  Displayed as-is so the
    /// recorded failure message is the converter's own text.
    #[error(transparent)]
    Convert(#[from] anyhow::Error),
}

// Convert a windows-crate error (HRESULT) directly into an AppError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for AppError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub(crate) type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_error_displays_converter_message_verbatim() {
        let err = AppError::from(anyhow::anyhow!("corrupt file"));
        assert_eq!(err.to_string(), "corrupt file");
    }

    #[test]
    fn convert_error_alternate_shows_context_chain() {
        let err = AppError::from(anyhow::anyhow!("bad xref").context("Failed to read PDF"));
        assert_eq!(format!("{err:#}"), "Failed to read PDF: bad xref");
    }

    #[test]
    fn win32_error_formats_code_as_hex() {
        let err = AppError::Win32 {
            function: "CreateWindowExW",
            code: 0x8007_0005,
        };
        assert_eq!(err.to_string(), "CreateWindowExW failed (error 0x80070005)");
    }
}
