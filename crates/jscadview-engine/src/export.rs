//! STL export through an external command-line tool
//!
//! The exporter runs the configured program with the document path and
//! copies its output into a log channel. Failures are reported through the
//! channel and a notification, never returned as errors.

use jscadview_core::config::ExportToolConfig;
use jscadview_core::host::{Notifier, OutputChannel};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

/// Final line written to the log channel when an export fails
pub const FAILURE_LINE: &str = "Export as STL failed.";

/// Outcome of one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Document that was exported
    pub document: PathBuf,

    /// Whether the tool ran and exited successfully
    pub success: bool,

    /// Exit code, if the tool ran to completion
    pub exit_code: Option<i32>,

    pub stdout: String,
    pub stderr: String,
}

impl std::fmt::Display for ExportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.success {
            write!(f, "Exported {} as STL", self.document.display())
        } else {
            match self.exit_code {
                Some(code) => write!(
                    f,
                    "Export of {} failed (exit code {})",
                    self.document.display(),
                    code
                ),
                None => write!(f, "Export of {} failed", self.document.display()),
            }
        }
    }
}

/// Runs the export tool and reports its output
pub struct StlExporter {
    tool: ExportToolConfig,
    channel: Arc<dyn OutputChannel>,
    notifier: Arc<dyn Notifier>,
}

impl StlExporter {
    pub fn new(
        tool: ExportToolConfig,
        channel: Arc<dyn OutputChannel>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tool,
            channel,
            notifier,
        }
    }

    /// Export `document` and report what happened
    pub async fn export(&self, document: &Path) -> ExportReport {
        let args = self.tool.args_for(document);
        let working_dir = self
            .tool
            .working_dir
            .clone()
            .or_else(|| document.parent().map(Path::to_path_buf))
            .filter(|dir| !dir.as_os_str().is_empty());

        tracing::info!("Exporting {}: {} {}", document.display(), self.tool.program, args.join(" "));

        let mut command = Command::new(&self.tool.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &working_dir {
            command.current_dir(dir);
        }

        let mut report = ExportReport {
            document: document.to_path_buf(),
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };

        match command.output().await {
            Ok(output) => {
                report.exit_code = output.status.code();
                report.success = output.status.success();
                report.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                report.stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            }
            Err(e) => {
                report.stderr = format!("Failed to run {}: {}", self.tool.program, e);
            }
        }

        self.log(&report);
        report
    }

    fn log(&self, report: &ExportReport) {
        let stderr = report.stderr.trim_end();
        let stdout = report.stdout.trim_end();

        if report.success {
            if !stderr.is_empty() {
                self.channel.append_line(stderr);
                self.channel.show(true);
            }
            if !stdout.is_empty() {
                tracing::debug!("Export output: {}", stdout);
            }
            tracing::info!("{}", report);
            return;
        }

        if !stderr.is_empty() {
            self.channel.append_line(stderr);
        }
        if !stdout.is_empty() {
            self.channel.append_line(stdout);
        }
        self.channel.append_line(FAILURE_LINE);
        self.channel.show(true);

        tracing::error!("{}", report);
        self.notifier.error(&report.to_string());
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<String>>,
        shown: Mutex<usize>,
        errors: Mutex<Vec<String>>,
    }

    impl OutputChannel for Recorder {
        fn append_line(&self, line: &str) {
            self.lines.lock().push(line.to_string());
        }

        fn show(&self, _preserve_focus: bool) {
            *self.shown.lock() += 1;
        }
    }

    impl Notifier for Recorder {
        fn info(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn error(&self, message: &str) {
            self.errors.lock().push(message.to_string());
        }
    }

    fn exporter(script: &str) -> (StlExporter, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let tool = ExportToolConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string(), "sh".to_string(), "{file}".to_string()],
            working_dir: None,
        };
        let exporter = StlExporter::new(
            tool,
            Arc::clone(&recorder) as Arc<dyn OutputChannel>,
            Arc::clone(&recorder) as Arc<dyn Notifier>,
        );
        (exporter, recorder)
    }

    #[tokio::test]
    async fn test_success_with_quiet_tool() {
        let (exporter, recorder) = exporter("echo \"wrote $1\"");
        let report = exporter.export(Path::new("/tmp/gear.jscad")).await;

        assert!(report.success);
        assert_eq!(report.stdout.trim(), "wrote /tmp/gear.jscad");
        assert!(recorder.lines.lock().is_empty());
        assert_eq!(*recorder.shown.lock(), 0);
        assert!(recorder.errors.lock().is_empty());
    }

    #[tokio::test]
    async fn test_success_shows_stderr() {
        let (exporter, recorder) = exporter("echo deprecated >&2");
        let report = exporter.export(Path::new("/tmp/gear.jscad")).await;

        assert!(report.success);
        assert_eq!(*recorder.lines.lock(), vec!["deprecated"]);
        assert_eq!(*recorder.shown.lock(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_logged_not_raised() {
        let (exporter, recorder) = exporter("echo out; echo boom >&2; exit 3");
        let report = exporter.export(Path::new("/tmp/gear.jscad")).await;

        assert!(!report.success);
        assert_eq!(report.exit_code, Some(3));
        assert_eq!(*recorder.lines.lock(), vec!["boom", "out", FAILURE_LINE]);
        assert_eq!(*recorder.shown.lock(), 1);
        assert_eq!(recorder.errors.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let recorder = Arc::new(Recorder::default());
        let tool = ExportToolConfig {
            program: "/nonexistent/openjscad".to_string(),
            ..ExportToolConfig::default()
        };
        let exporter = StlExporter::new(
            tool,
            Arc::clone(&recorder) as Arc<dyn OutputChannel>,
            Arc::clone(&recorder) as Arc<dyn Notifier>,
        );

        let report = exporter.export(Path::new("/tmp/gear.jscad")).await;
        assert!(!report.success);
        assert_eq!(report.exit_code, None);
        assert_eq!(recorder.lines.lock().last().unwrap(), FAILURE_LINE);
    }
}
