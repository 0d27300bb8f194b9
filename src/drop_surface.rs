// ── Drop surface ──────────────────────────────────────────────────────────────
//
// The two things a drop target decides, written as plain functions over an
// explicit payload so they run without any window attached:
//   • `on_drag_enter` – accept or reject a drag as it enters the surface.
//   • `on_drop`       – convert every accepted file, one at a time.
//
// The Win32 `IDropTarget` in `platform::win32::drop_target` only translates
// OLE data objects into `DragPayload` values and calls these.
//
// No `unsafe`: pure safe Rust.

use std::path::{Path, PathBuf};

use url::Url;

use crate::{
    convert::{self, DocumentConverter, DocumentKind},
    logging::Log,
};

// ── Payload ───────────────────────────────────────────────────────────────────

/// Candidate file paths offered by one drag operation, in the order the
/// source listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DragPayload {
    paths: Vec<PathBuf>,
}

impl DragPayload {
    pub(crate) fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a payload from raw sources that may be plain paths or URIs.
    ///
    /// `file:` URIs become local paths; `scheme://` URIs, and `file:` URIs
    /// with no local equivalent, are left out.  Everything else is a path,
    /// colons included (`C:\…`, `notes:v2.pdf`).
    pub(crate) fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = sources
            .into_iter()
            .filter_map(|source| local_path(source.as_ref()))
            .collect();
        Self { paths }
    }

    #[cfg(test)]
    pub(crate) fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// The accepted file set: paths with a convertible suffix, payload order.
    pub(crate) fn accepted_files(&self) -> Vec<&Path> {
        self.paths
            .iter()
            .map(PathBuf::as_path)
            .filter(|path| DocumentKind::detect(path).is_some())
            .collect()
    }
}

fn local_path(source: &str) -> Option<PathBuf> {
    if source.is_empty() {
        return None;
    }
    if !looks_like_uri(source) {
        return Some(PathBuf::from(source));
    }
    match Url::parse(source) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        Ok(_) => None,
        Err(_) => Some(PathBuf::from(source)),
    }
}

/// `file:` sources and anything with an authority (`scheme://`).  Other
/// colons belong to drive letters or file names such as `notes:v2.pdf`.
fn looks_like_uri(source: &str) -> bool {
    source
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("file:"))
        || source.contains("://")
}

// ── Drag enter ────────────────────────────────────────────────────────────────

/// Whether the surface takes the drag that just entered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DragDecision {
    Accept,
    Reject,
}

impl DragDecision {
    pub(crate) fn is_accept(self) -> bool {
        self == Self::Accept
    }
}

/// Accept iff at least one payload path has a convertible suffix.
pub(crate) fn on_drag_enter(payload: &DragPayload, log: &dyn Log) -> DragDecision {
    match payload.accepted_files().first() {
        Some(path) => {
            log.info(&format!("Valid file detected: {}", path.display()));
            DragDecision::Accept
        }
        None => {
            log.warn("Dragged content contains no valid files");
            DragDecision::Reject
        }
    }
}

// ── Drop ──────────────────────────────────────────────────────────────────────

/// Result of attempting one accepted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConversionOutcome {
    Success { input: PathBuf, output: PathBuf },
    Failure { input: PathBuf, message: String },
}

/// Every outcome of one drop, in payload order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DropReport {
    pub(crate) outcomes: Vec<ConversionOutcome>,
}

impl DropReport {
    pub(crate) fn successes(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.outcomes.iter().filter_map(|o| match o {
            ConversionOutcome::Success { input, output } => Some((input.as_path(), output.as_path())),
            ConversionOutcome::Failure { .. } => None,
        })
    }

    pub(crate) fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            ConversionOutcome::Failure { input, message } => Some((input.as_path(), message.as_str())),
            ConversionOutcome::Success { .. } => None,
        })
    }

    pub(crate) fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub(crate) fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Multi-line text for the drop surface: a count line, then one line per
    /// failed file.
    #[cfg_attr(not(windows), allow(dead_code))]
    pub(crate) fn status_text(&self) -> String {
        if self.outcomes.is_empty() {
            return "No PDF, Word (docx), or PowerPoint (pptx) files were dropped".to_owned();
        }

        let mut text = format!(
            "Converted {} of {} file{}",
            self.success_count(),
            self.outcomes.len(),
            if self.outcomes.len() == 1 { "" } else { "s" },
        );
        for (input, message) in self.failures() {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| input.to_string_lossy());
            text.push_str(&format!("\nFailed: {name}: {message}"));
        }
        text
    }
}

/// Convert every accepted file in `payload`, in order.  One file failing
/// never stops the rest.
pub(crate) fn on_drop(
    payload: &DragPayload,
    converter: &dyn DocumentConverter,
    log: &dyn Log,
) -> DropReport {
    let files = payload.accepted_files();
    log.info(&format!("Files to convert: {}", files.len()));

    let mut report = DropReport::default();
    if files.is_empty() {
        return report;
    }

    for input in files {
        log.info(&format!("Processing file: {}", input.display()));
        let outcome = match convert::convert_file(input, converter, log) {
            Ok(output) => ConversionOutcome::Success {
                input: input.to_path_buf(),
                output,
            },
            Err(e) => {
                log.error(&format!("Conversion failed for {}: {e:#}", input.display()));
                ConversionOutcome::Failure {
                    input: input.to_path_buf(),
                    message: format!("{e:#}"),
                }
            }
        };
        report.outcomes.push(outcome);
    }

    log.info(&format!(
        "Conversion summary: {} successful, {} failed",
        report.success_count(),
        report.failure_count()
    ));
    report
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        convert::tests::FakeConverter,
        logging::capture::{CaptureLog, Severity},
    };

    fn fixture(dir: &Path, names: &[&str]) -> DragPayload {
        for name in names {
            fs::write(dir.join(name), b"fixture").expect("write fixture");
        }
        DragPayload::from_paths(names.iter().map(|n| dir.join(n)))
    }

    // ── payload ───────────────────────────────────────────────────────────────

    #[test]
    fn accepted_files_keep_payload_order() {
        let payload = DragPayload::from_paths(["b.pptx", "x.png", "a.PDF", "c.docx"]);
        let accepted: Vec<_> = payload.accepted_files().into_iter().map(Path::to_path_buf).collect();
        assert_eq!(
            accepted,
            [PathBuf::from("b.pptx"), PathBuf::from("a.PDF"), PathBuf::from("c.docx")]
        );
    }

    #[test]
    fn sources_drop_non_file_uris_and_keep_plain_paths() {
        let payload = DragPayload::from_sources([
            "https://example.com/report.pdf",
            "ftp://example.com/slides.pptx",
            "relative/doc.docx",
            "",
        ]);
        assert_eq!(payload.paths(), [PathBuf::from("relative/doc.docx")]);
    }

    #[test]
    fn colons_in_plain_paths_do_not_make_them_uris() {
        let payload = DragPayload::from_sources(["notes:v2.pdf", "report 2024:final.docx"]);
        assert_eq!(
            payload.paths(),
            [PathBuf::from("notes:v2.pdf"), PathBuf::from("report 2024:final.docx")]
        );
        assert!(on_drag_enter(&payload, &CaptureLog::default()).is_accept());
    }

    #[cfg(unix)]
    #[test]
    fn file_uris_become_decoded_local_paths() {
        let payload = DragPayload::from_sources(["file:///tmp/My%20Slides.pptx", "/srv/a.pdf"]);
        assert_eq!(
            payload.paths(),
            [PathBuf::from("/tmp/My Slides.pptx"), PathBuf::from("/srv/a.pdf")]
        );
    }

    #[cfg(windows)]
    #[test]
    fn drive_letter_paths_are_not_mistaken_for_uris() {
        let payload = DragPayload::from_sources([r"C:\Users\me\doc.pdf"]);
        assert_eq!(payload.paths(), [PathBuf::from(r"C:\Users\me\doc.pdf")]);
    }

    // ── drag enter ────────────────────────────────────────────────────────────

    #[test]
    fn drag_enter_accepts_when_any_file_qualifies() {
        let log = CaptureLog::default();
        let payload = DragPayload::from_paths(["doc.pdf", "image.png"]);

        assert_eq!(on_drag_enter(&payload, &log), DragDecision::Accept);
        assert_eq!(log.messages(Severity::Info), ["Valid file detected: doc.pdf"]);
    }

    #[test]
    fn drag_enter_accepts_uppercase_extension() {
        let payload = DragPayload::from_paths(["image.png", "DECK.PPTX"]);
        assert!(on_drag_enter(&payload, &CaptureLog::default()).is_accept());
    }

    #[test]
    fn drag_enter_rejects_unsupported_files_with_warning() {
        let log = CaptureLog::default();
        let payload = DragPayload::from_paths(["readme.txt"]);

        assert_eq!(on_drag_enter(&payload, &log), DragDecision::Reject);
        assert_eq!(
            log.messages(Severity::Warn),
            ["Dragged content contains no valid files"]
        );
    }

    #[test]
    fn drag_enter_rejects_empty_payload() {
        let payload = DragPayload::default();
        assert!(payload.paths().is_empty());
        assert_eq!(on_drag_enter(&payload, &CaptureLog::default()), DragDecision::Reject);
    }

    #[test]
    fn drag_enter_rejects_web_links_to_documents() {
        let payload = DragPayload::from_sources(["https://example.com/paper.pdf"]);
        assert_eq!(on_drag_enter(&payload, &CaptureLog::default()), DragDecision::Reject);
    }

    // ── drop ──────────────────────────────────────────────────────────────────

    #[test]
    fn drop_converts_only_accepted_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = fixture(dir.path(), &["doc.pdf", "image.png"]);
        let log = CaptureLog::default();

        let report = on_drop(&payload, &FakeConverter::default(), &log);

        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failure_count(), 0);
        assert!(dir.path().join("doc.md").exists());
        assert!(!dir.path().join("image.md").exists());
        let info = log.messages(Severity::Info);
        assert_eq!(info.first().map(String::as_str), Some("Files to convert: 1"));
        assert_eq!(
            info.last().map(String::as_str),
            Some("Conversion summary: 1 successful, 0 failed")
        );
    }

    #[test]
    fn drop_records_failure_and_keeps_going() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = fixture(dir.path(), &["a.docx", "b.pptx"]);
        let converter = FakeConverter::default().failing_on("b.pptx", "corrupt file");
        let log = CaptureLog::default();

        let report = on_drop(&payload, &converter, &log);

        assert_eq!(
            report.outcomes,
            [
                ConversionOutcome::Success {
                    input: dir.path().join("a.docx"),
                    output: dir.path().join("a.md"),
                },
                ConversionOutcome::Failure {
                    input: dir.path().join("b.pptx"),
                    message: "corrupt file".to_owned(),
                },
            ]
        );
        assert!(dir.path().join("a.md").exists());
        assert!(!dir.path().join("b.md").exists());

        let errors = log.messages(Severity::Error);
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors[1].starts_with("Conversion failed for "));
        assert!(errors[1].ends_with("b.pptx: corrupt file"));
    }

    #[test]
    fn failing_file_in_any_position_is_isolated() {
        let names = ["one.pdf", "two.docx", "three.pptx", "four.pdf"];
        for k in 0..names.len() {
            let dir = tempfile::tempdir().expect("tempdir");
            let payload = fixture(dir.path(), &names);
            let converter = FakeConverter::default().failing_on(names[k], "boom");

            let report = on_drop(&payload, &converter, &CaptureLog::default());

            assert_eq!(report.outcomes.len(), names.len());
            assert_eq!(report.success_count(), names.len() - 1, "k = {k}");
            let failed: Vec<_> = report.failures().map(|(p, _)| p.to_path_buf()).collect();
            assert_eq!(failed, [dir.path().join(names[k])]);
            for (i, name) in names.iter().enumerate() {
                let md = dir.path().join(name).with_extension("md");
                assert_eq!(md.exists(), i != k, "{name} with k = {k}");
            }
        }
    }

    #[test]
    fn drop_with_nothing_accepted_converts_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = fixture(dir.path(), &["readme.txt"]);
        let log = CaptureLog::default();

        let report = on_drop(&payload, &FakeConverter::default(), &log);

        assert!(report.outcomes.is_empty());
        assert_eq!(log.messages(Severity::Info), ["Files to convert: 0"]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn dropping_the_same_file_twice_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = fixture(dir.path(), &["doc.pdf"]);

        let first = on_drop(&payload, &FakeConverter::default(), &CaptureLog::default());
        let second = on_drop(&payload, &FakeConverter::default(), &CaptureLog::default());

        assert_eq!(first, second);
        assert_eq!(second.failure_count(), 0);
    }

    #[test]
    fn log_lines_follow_processing_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let payload = fixture(dir.path(), &["x.pdf"]);
        let log = CaptureLog::default();

        on_drop(&payload, &FakeConverter::default(), &log);

        let severities: Vec<Severity> = log.entries().into_iter().map(|(s, _)| s).collect();
        assert_eq!(severities, [Severity::Info; 5]);
        let messages: Vec<String> = log.entries().into_iter().map(|(_, m)| m).collect();
        assert!(messages[1].starts_with("Processing file: "));
        assert!(messages[2].starts_with("Starting conversion: "));
        assert!(messages[3].starts_with("Conversion complete: "));
    }

    // ── report text ───────────────────────────────────────────────────────────

    #[test]
    fn status_text_lists_failed_file_names() {
        let report = DropReport {
            outcomes: vec![
                ConversionOutcome::Success {
                    input: PathBuf::from("dir/a.docx"),
                    output: PathBuf::from("dir/a.md"),
                },
                ConversionOutcome::Failure {
                    input: PathBuf::from("dir/b.pptx"),
                    message: "corrupt file".to_owned(),
                },
            ],
        };
        assert_eq!(
            report.status_text(),
            "Converted 1 of 2 files\nFailed: b.pptx: corrupt file"
        );
    }

    #[test]
    fn status_text_for_single_success() {
        let report = DropReport {
            outcomes: vec![ConversionOutcome::Success {
                input: PathBuf::from("doc.pdf"),
                output: PathBuf::from("doc.md"),
            }],
        };
        assert_eq!(report.status_text(), "Converted 1 of 1 file");
    }
}
