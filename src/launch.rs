// ── Files passed at launch ────────────────────────────────────────────────────
//
// Dropping files onto the executable starts it with their paths as
// arguments.  Those arguments form one drag payload and go through exactly
// the same accept → convert steps as a drop on the window.

use crate::{
    convert::DocumentConverter,
    drop_surface::{self, DragPayload, DropReport},
    logging::Log,
};

/// Payload built from the process arguments, or `None` when there are none.
pub(crate) fn payload_from_args() -> Option<DragPayload> {
    payload_from(std::env::args().skip(1))
}

fn payload_from<I>(args: I) -> Option<DragPayload>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    if args.is_empty() {
        None
    } else {
        Some(DragPayload::from_sources(args))
    }
}

/// Treat `payload` as a drag that entered and was dropped.  Returns `None`
/// when the drag is rejected, as the window would never see the drop.
pub(crate) fn drop_files(
    payload: &DragPayload,
    converter: &dyn DocumentConverter,
    log: &dyn Log,
) -> Option<DropReport> {
    drop_surface::on_drag_enter(payload, log)
        .is_accept()
        .then(|| drop_surface::on_drop(payload, converter, log))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        convert::tests::FakeConverter,
        logging::capture::{CaptureLog, Severity},
    };

    #[test]
    fn no_arguments_means_no_payload() {
        assert_eq!(payload_from(Vec::new()), None);
    }

    #[test]
    fn arguments_keep_their_order() {
        let payload = payload_from(vec!["b.pdf".to_owned(), "a.docx".to_owned()]).unwrap();
        let names: Vec<_> = payload.paths().iter().map(|p| p.display().to_string()).collect();
        assert_eq!(names, ["b.pdf", "a.docx"]);
    }

    #[test]
    fn rejected_launch_payload_converts_nothing() {
        let log = CaptureLog::default();
        let payload = DragPayload::from_paths(["readme.txt"]);

        assert_eq!(drop_files(&payload, &FakeConverter::default(), &log), None);
        assert_eq!(log.messages(Severity::Warn).len(), 1);
        assert!(log.messages(Severity::Info).is_empty());
    }

    #[test]
    fn accepted_launch_payload_is_converted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("doc.pdf");
        fs::write(&input, b"fixture").unwrap();
        let payload = DragPayload::from_paths([input, dir.path().join("image.png")]);

        let report = drop_files(&payload, &FakeConverter::default(), &CaptureLog::default())
            .expect("accepted");

        assert_eq!(report.success_count(), 1);
        assert!(dir.path().join("doc.md").exists());
    }
}
