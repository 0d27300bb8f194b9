// ── Document → Markdown conversion ────────────────────────────────────────────
//
// `convert_file` is the boundary around the text extractors: it derives the
// output path, asks a `DocumentConverter` for Markdown, and replaces the
// sibling `.md` file atomically.  It never re-checks the input extension;
// the drop surface only hands it accepted files.
//
// No `unsafe`: pure safe Rust.

pub(crate) mod markdown;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::{error::Result, logging::Log};

pub(crate) use markdown::MarkdownConverter;

// ── Accepted document kinds ───────────────────────────────────────────────────

/// The document formats MarkDrop converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
}

impl DocumentKind {
    pub(crate) const ALL: [Self; 3] = [Self::Pdf, Self::Docx, Self::Pptx];

    /// File-name suffix, including the leading dot.
    pub(crate) fn suffix(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
            Self::Pptx => ".pptx",
        }
    }

    /// Classify `path` by a case-insensitive suffix test on its full text.
    ///
    /// This is deliberately a string test, not `Path::extension`: a file
    /// literally named `.pdf` still qualifies.
    pub(crate) fn detect(path: &Path) -> Option<Self> {
        let lowered = path.to_string_lossy().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| lowered.ends_with(kind.suffix()))
    }
}

// ── Converter seam ────────────────────────────────────────────────────────────

/// Text produced from one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Document {
    /// Markdown rendering of the document's text.
    pub(crate) text_content: String,
}

/// Anything that can turn a document on disk into Markdown text.
pub(crate) trait DocumentConverter {
    fn convert(&self, path: &Path) -> anyhow::Result<Document>;
}

// ── Output path ───────────────────────────────────────────────────────────────

/// Sibling path with the extension replaced by `.md`.
///
/// `report.PDF` → `report.md`, `notes.v2.docx` → `notes.v2.md`.
pub(crate) fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension("md")
}

// ── Conversion routine ────────────────────────────────────────────────────────

/// Convert `input` to Markdown and write it next to the input.
///
/// Returns the output path.  A missing output after a successful write is
/// reported as a warning only.  Every failure is logged here and then
/// returned so the caller can record it.
pub(crate) fn convert_file(
    input: &Path,
    converter: &dyn DocumentConverter,
    log: &dyn Log,
) -> Result<PathBuf> {
    convert_file_with(input, converter, log, &write_atomically)
}

/// Writes the Markdown text for one output path.
type WriteOutput = dyn Fn(&Path, &str) -> Result<()>;

fn convert_file_with(
    input: &Path,
    converter: &dyn DocumentConverter,
    log: &dyn Log,
    write: &WriteOutput,
) -> Result<PathBuf> {
    let output = output_path_for(input);

    match convert_and_write(input, &output, converter, log, write) {
        Ok(()) => Ok(output),
        Err(e) => {
            log.error(&format!(
                "Error during conversion of {}: {e:#}",
                input.display()
            ));
            Err(e)
        }
    }
}

fn convert_and_write(
    input: &Path,
    output: &Path,
    converter: &dyn DocumentConverter,
    log: &dyn Log,
    write: &WriteOutput,
) -> Result<()> {
    let input_mb = fs::metadata(input)?.len() as f64 / (1024.0 * 1024.0);
    log.info(&format!(
        "Starting conversion: {} ({input_mb:.2} MB)",
        input.display()
    ));

    let document = converter.convert(input)?;
    write(output, &document.text_content)?;

    match fs::metadata(output) {
        Ok(meta) => {
            let output_kb = meta.len() as f64 / 1024.0;
            log.info(&format!(
                "Conversion complete: {} → {} ({output_kb:.2} KB)",
                input.display(),
                output.display()
            ));
        }
        Err(e) => {
            log.warn(&format!(
                "Output file not found after conversion: {} ({e})",
                output.display()
            ));
        }
    }

    Ok(())
}

/// Write `text` as UTF-8 to a temporary file beside `target`, then rename it
/// over `target`.  An existing `target` is replaced and keeps its
/// permissions; a new one gets the permissions of any freshly created file.
/// On any failure the temporary file is removed and `target` is left as it
/// was.
fn write_atomically(target: &Path, text: &str) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".markdrop-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Same mode `fs::write` would give a new file: 0o666 less the umask.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;

    // A replaced output keeps its mode.
    #[cfg(unix)]
    if let Ok(existing) = fs::metadata(target) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }

    tmp.write_all(text.as_bytes())?;
    tmp.flush()?;
    tmp.persist(target)?;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
