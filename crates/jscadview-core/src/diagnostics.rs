//! Host diagnostics and the policy deciding whether they block a preview

/// Severity of a host-reported diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Hint,
    Information,
    Warning,
    Error,
}

/// A single static-analysis finding attached to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious the finding is
    pub severity: Severity,
    /// Tool that produced the finding (e.g. a linter name)
    pub source: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic without a source
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            source: None,
            message: message.into(),
        }
    }

    /// Attach the producing tool's name
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Whether this diagnostic has error severity
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Decides whether a document's diagnostics prevent a preview update
pub trait DiagnosticPolicy: Send + Sync {
    /// `true` if the preview must not be updated with this document
    fn blocks_preview(&self, diagnostics: &[Diagnostic]) -> bool;
}

impl<F> DiagnosticPolicy for F
where
    F: Fn(&[Diagnostic]) -> bool + Send + Sync,
{
    fn blocks_preview(&self, diagnostics: &[Diagnostic]) -> bool {
        self(diagnostics)
    }
}

/// Blocks on any error-severity diagnostic, except a lone error from one
/// tolerated source
///
/// The tolerated source covers a linter known to report a single spurious
/// error on valid scripts. Two or more errors always block, even if one of
/// them comes from the tolerated source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSeverityPolicy {
    tolerated_source: Option<String>,
}

impl ErrorSeverityPolicy {
    /// Block on every error
    pub fn strict() -> Self {
        Self::default()
    }

    /// Block on every error except a single one from `source`
    pub fn tolerating(source: impl Into<String>) -> Self {
        Self {
            tolerated_source: Some(source.into()),
        }
    }

    /// The tolerated source, if any
    pub fn tolerated_source(&self) -> Option<&str> {
        self.tolerated_source.as_deref()
    }
}

impl DiagnosticPolicy for ErrorSeverityPolicy {
    fn blocks_preview(&self, diagnostics: &[Diagnostic]) -> bool {
        let errors: Vec<&Diagnostic> = diagnostics.iter().filter(|d| d.is_error()).collect();

        if let ([lone], Some(tolerated)) = (errors.as_slice(), &self.tolerated_source)
            && lone.source.as_deref() == Some(tolerated.as_str())
        {
            return false;
        }

        !errors.is_empty()
    }
}
