//! Edit-to-preview synchronization
//!
//! Every relevant editor event restarts a quiet-period timer. When the timer
//! fires the synchronizer looks at the editor state *at that moment*, decides
//! whether the document may be previewed, and hands its text to the live
//! panel. Bursts of events therefore produce a single push carrying the last
//! state.

use crate::debounce::Debouncer;
use crate::panel::{PanelError, PanelSlot};
use jscadview_core::diagnostics::DiagnosticPolicy;
use jscadview_core::document::{DocumentFilter, DocumentId};
use jscadview_core::host::{Notifier, TextEditor, Workspace};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;

/// Warning shown when diagnostics block a preview update
pub const BLOCKED_MESSAGE: &str = "Not updating preview because of code errors";

/// Host events that can change what the preview should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Cursor or selection moved (also fires on every edit)
    SelectionChanged,
    /// Focus moved to another editor, or to none
    ActiveEditorChanged,
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectionChanged => write!(f, "selection changed"),
            Self::ActiveEditorChanged => write!(f, "active editor changed"),
        }
    }
}

/// What a flush did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Source was sent to the panel
    Pushed(DocumentId),
    /// No live panel to update
    NoPanel,
    /// No active editor and nothing tracked to fall back to
    NoDocument,
    /// Document is not a previewable file type
    Ineligible(DocumentId),
    /// Diagnostics report errors
    Blocked(DocumentId),
    /// The panel refused the update
    Failed(String),
}

impl SyncOutcome {
    pub fn is_pushed(&self) -> bool {
        matches!(self, Self::Pushed(_))
    }
}

struct SyncShared {
    workspace: Arc<dyn Workspace>,
    notifier: Arc<dyn Notifier>,
    panels: Arc<PanelSlot>,
    filter: DocumentFilter,
    policy: Arc<dyn DiagnosticPolicy>,
    debouncer: Debouncer,
    /// Most recent editor holding an eligible document
    tracked: Mutex<Option<Arc<dyn TextEditor>>>,
}

/// Feeds editor content into the live preview panel
pub struct PreviewSynchronizer {
    shared: Arc<SyncShared>,
}

impl PreviewSynchronizer {
    pub fn new(
        runtime: Handle,
        quiet: Duration,
        workspace: Arc<dyn Workspace>,
        notifier: Arc<dyn Notifier>,
        panels: Arc<PanelSlot>,
        filter: DocumentFilter,
        policy: Arc<dyn DiagnosticPolicy>,
    ) -> Self {
        Self {
            shared: Arc::new(SyncShared {
                workspace,
                notifier,
                panels,
                filter,
                policy,
                debouncer: Debouncer::new(quiet, runtime),
                tracked: Mutex::new(None),
            }),
        }
    }

    /// React to a host event by scheduling a debounced flush
    pub fn on_event(&self, trigger: SyncTrigger) {
        tracing::debug!("Sync trigger: {}", trigger);
        self.shared.track_active();

        let weak: Weak<SyncShared> = Arc::downgrade(&self.shared);
        self.shared.debouncer.schedule(move || {
            if let Some(shared) = weak.upgrade() {
                shared.flush();
            }
        });
    }

    pub fn on_selection_changed(&self) {
        self.on_event(SyncTrigger::SelectionChanged);
    }

    pub fn on_active_editor_changed(&self) {
        self.on_event(SyncTrigger::ActiveEditorChanged);
    }

    /// Push immediately, dropping any pending debounced push
    pub fn push_now(&self) -> SyncOutcome {
        self.shared.debouncer.cancel();
        self.shared.flush()
    }

    /// Drop the pending push, if any
    pub fn cancel_pending(&self) {
        self.shared.debouncer.cancel();
    }

    pub fn has_pending(&self) -> bool {
        self.shared.debouncer.is_pending()
    }

    /// Document the synchronizer falls back to when no editor is active
    pub fn tracked_document(&self) -> Option<DocumentId> {
        self.shared
            .tracked
            .lock()
            .as_ref()
            .map(|editor| editor.document_id())
    }
}

impl Drop for PreviewSynchronizer {
    fn drop(&mut self) {
        self.shared.debouncer.cancel();
    }
}

impl SyncShared {
    /// Remember the active editor if it holds an eligible document
    fn track_active(&self) -> Option<Arc<dyn TextEditor>> {
        let active = self.workspace.active_editor()?;
        if self.filter.matches(&active.document_id()) {
            *self.tracked.lock() = Some(Arc::clone(&active));
        }
        Some(active)
    }

    fn flush(&self) -> SyncOutcome {
        let outcome = self.try_flush();
        match &outcome {
            SyncOutcome::Pushed(document) => tracing::debug!("Preview updated with {}", document),
            SyncOutcome::Blocked(document) => {
                tracing::warn!("Not updating preview of {}: diagnostics report errors", document);
            }
            SyncOutcome::Failed(reason) => tracing::error!("Preview update failed: {}", reason),
            other => tracing::trace!("Preview not updated: {:?}", other),
        }
        outcome
    }

    fn try_flush(&self) -> SyncOutcome {
        let Some(panel) = self.panels.current() else {
            return SyncOutcome::NoPanel;
        };

        let editor = match self.track_active() {
            Some(editor) => editor,
            None => match self.tracked.lock().clone() {
                Some(editor) => editor,
                None => return SyncOutcome::NoDocument,
            },
        };

        let document = editor.document_id();
        if !self.filter.matches(&document) {
            return SyncOutcome::Ineligible(document);
        }

        let diagnostics = self.workspace.diagnostics(&document);
        if self.policy.blocks_preview(&diagnostics) {
            self.notifier.warn(BLOCKED_MESSAGE);
            return SyncOutcome::Blocked(document);
        }

        match panel.set_data(editor.text(), document.clone()) {
            Ok(()) => SyncOutcome::Pushed(document),
            // Closed between lookup and send
            Err(PanelError::Disposed) => SyncOutcome::NoPanel,
            Err(e) => {
                let reason = e.to_string();
                self.notifier.error(&reason);
                SyncOutcome::Failed(reason)
            }
        }
    }
}
