// ── Logging ───────────────────────────────────────────────────────────────────
//
// One global `tracing` subscriber writes single-line, timestamped, leveled
// records to stdout.  The conversion core does not call `tracing` directly:
// it receives a `&dyn Log`, so tests can capture exactly what was reported.

use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Timestamp layout of every record, e.g. `2025-03-14 09:26:53`.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install the stdout subscriber.  Call once, first thing in `main`.
pub(crate) fn init() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_owned()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .with_writer(std::io::stdout)
        .finish();

    // A second install attempt is harmless; keep the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Sink for the messages emitted while accepting and converting files.
pub(crate) trait Log {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Production sink: forwards to the global `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TracingLog;

impl Log for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

// ── Test double ───────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod capture {
    use std::cell::RefCell;

    use super::Log;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum Severity {
        Info,
        Warn,
        Error,
    }

    /// Records every message in emission order.
    #[derive(Default)]
    pub(crate) struct CaptureLog {
        entries: RefCell<Vec<(Severity, String)>>,
    }

    impl CaptureLog {
        pub(crate) fn entries(&self) -> Vec<(Severity, String)> {
            self.entries.borrow().clone()
        }

        pub(crate) fn messages(&self, severity: Severity) -> Vec<String> {
            self.entries
                .borrow()
                .iter()
                .filter(|(s, _)| *s == severity)
                .map(|(_, m)| m.clone())
                .collect()
        }

        fn push(&self, severity: Severity, message: &str) {
            self.entries.borrow_mut().push((severity, message.to_owned()));
        }
    }

    impl Log for CaptureLog {
        fn info(&self, message: &str) {
            self.push(Severity::Info, message);
        }

        fn warn(&self, message: &str) {
            self.push(Severity::Warn, message);
        }

        fn error(&self, message: &str) {
            self.push(Severity::Error, message);
        }
    }
}
