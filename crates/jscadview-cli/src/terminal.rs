//! Host collaborators backed by the terminal

use jscadview_core::host::{Notifier, OutputChannel};

/// Export log written straight to stderr
pub struct StderrChannel;

impl OutputChannel for StderrChannel {
    fn append_line(&self, line: &str) {
        eprintln!("{}", line);
    }

    fn show(&self, _preserve_focus: bool) {}
}

/// Notifications become log records
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}
