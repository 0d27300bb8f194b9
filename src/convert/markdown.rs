// ── Text extractors ───────────────────────────────────────────────────────────
//
// Production `DocumentConverter`.  Each format is handed to a pure-Rust
// extractor crate; this file only shapes their output into Markdown
// paragraphs.

use std::path::Path;

use anyhow::{bail, Context, Result};
use pptx_to_md::{ParserConfig, PptxContainer};

use super::{Document, DocumentConverter, DocumentKind};

/// Converts PDF, DOCX and PPTX files by dispatching on the file suffix.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MarkdownConverter;

impl DocumentConverter for MarkdownConverter {
    fn convert(&self, path: &Path) -> Result<Document> {
        let text_content = match DocumentKind::detect(path) {
            Some(DocumentKind::Pdf) => pdf_to_markdown(path)?,
            Some(DocumentKind::Docx) => docx_to_markdown(path)?,
            Some(DocumentKind::Pptx) => pptx_to_markdown(path)?,
            None => bail!("Unsupported document format: {}", path.display()),
        };
        Ok(Document { text_content })
    }
}

fn pdf_to_markdown(path: &Path) -> Result<String> {
    // pdf_extract panics on some malformed files; keep that to this file.
    let extracted =
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| pdf_extract::extract_text(path)));

    let raw = match extracted {
        Ok(result) => result
            .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?,
        Err(_) => bail!("PDF extraction panicked (malformed PDF): {}", path.display()),
    };
    Ok(collapse_blank_runs(&raw))
}

fn docx_to_markdown(path: &Path) -> Result<String> {
    let raw = docx_lite::extract_text(path)
        .with_context(|| format!("Failed to extract text from DOCX: {}", path.display()))?;
    Ok(lines_to_paragraphs(&raw))
}

/// One Markdown block per slide, each preceded by a slide-number comment.
fn pptx_to_markdown(path: &Path) -> Result<String> {
    let config = ParserConfig::builder()
        .extract_images(false)
        .include_slide_comment(true)
        .build();

    let mut container = PptxContainer::open(path, config)
        .with_context(|| format!("Failed to open PPTX: {}", path.display()))?;

    let slides = container
        .parse_all()
        .with_context(|| format!("Failed to parse PPTX slides: {}", path.display()))?;

    let blocks: Vec<String> = slides
        .into_iter()
        .filter_map(|slide| slide.convert_to_md())
        .map(|md| md.trim_end().to_owned())
        .filter(|md| !md.is_empty())
        .collect();

    Ok(finish(blocks.join("\n\n")))
}

// ── Shaping ───────────────────────────────────────────────────────────────────

/// PDF text keeps its line breaks (they are mostly wrapped lines), but runs
/// of blank lines and page breaks collapse into a single paragraph gap.
fn collapse_blank_runs(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_gap = false;

    for line in raw.lines() {
        if line.trim().is_empty() {
            in_gap = !out.is_empty();
            continue;
        }
        if in_gap {
            out.push('\n');
            in_gap = false;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    finish(out)
}

/// Word paragraphs arrive one per line; Markdown needs a blank line between
/// them.
fn lines_to_paragraphs(raw: &str) -> String {
    let paragraphs: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    finish(paragraphs.join("\n\n"))
}

/// Trim trailing whitespace and end non-empty output with one newline.
fn finish(text: String) -> String {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}
