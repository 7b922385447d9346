//! Host collaborator interfaces
//!
//! The editor, its notifications, per-panel storage and the sandboxed
//! rendering surface all belong to the host application. The preview
//! pipeline only talks to them through these traits, so it can run inside
//! any editor integration (or against in-memory fakes in tests).

use crate::diagnostics::Diagnostic;
use crate::document::DocumentId;
use crate::error::Result;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An open text editor in the host
pub trait TextEditor: Send + Sync {
    /// Identity of the document shown in this editor
    fn document_id(&self) -> DocumentId;

    /// Full current text of the document
    fn text(&self) -> String;

    /// Insert a snippet at the cursor
    ///
    /// Snippets use `${n:placeholder}` tab stops and `$0` as the final cursor.
    fn insert_snippet(&self, snippet: &str) -> Result<()>;
}

/// Access to the host's editors and static-analysis results
pub trait Workspace: Send + Sync {
    /// The editor that currently has focus, if any
    fn active_editor(&self) -> Option<Arc<dyn TextEditor>>;

    /// Diagnostics currently reported for a document
    fn diagnostics(&self, document: &DocumentId) -> Vec<Diagnostic>;
}

/// User-visible notifications
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// A status bar item showing the render pipeline phase
pub trait StatusIndicator: Send + Sync {
    /// Show the item with text, hover tooltip and the command run on click
    fn show(&self, text: &str, tooltip: &str, command: &str);

    /// Hide the item without releasing it
    fn hide(&self);

    /// Release the item; it is not shown again afterwards
    fn dispose(&self);
}

/// Durable per-panel state owned by the host
pub trait StateStorage: Send + Sync {
    /// The last saved state blob, if any
    fn load_state(&self) -> Option<Value>;

    /// Replace the saved state blob
    fn save_state(&self, state: Value) -> Result<()>;
}

/// A named log channel shown on demand (used for external tool output)
pub trait OutputChannel: Send + Sync {
    fn append_line(&self, line: &str);

    /// Bring the channel into view; `preserve_focus` keeps the editor focused
    fn show(&self, preserve_focus: bool);
}

/// Lets the user pick a file from disk
pub trait FilePicker: Send + Sync {
    /// Ask for a single file with one of the given extensions
    fn pick_file(&self, title: &str, extensions: &[&str]) -> Option<PathBuf>;
}

/// Control handle of a sandboxed rendering surface
///
/// Content travels over the [`SurfaceConnection`]; this handle only manages
/// the surface's frame.
pub trait RenderSurface: Send + Sync {
    /// Bring the surface to the foreground
    fn reveal(&self);

    /// Change the surface's tab title
    fn set_title(&self, title: &str);

    /// Replace the surface's static markup (reloads the surface)
    fn set_markup(&self, html: &str);

    /// Close the surface
    fn dispose(&self);
}

/// Options for creating a rendering surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceOptions {
    /// Host-side type tag used to revive surfaces after reload
    pub view_type: String,
    /// Initial tab title
    pub title: String,
    /// Whether scripts may run inside the surface
    pub enable_scripts: bool,
}

/// Raw transport to and from a rendering surface
///
/// Messages are JSON strings. Each direction is FIFO.
pub struct SurfaceConnection {
    /// Messages posted to the surface
    pub outbound: UnboundedSender<String>,
    /// Messages posted by the surface; closes when the surface goes away
    pub inbound: UnboundedReceiver<String>,
}

/// A newly created surface together with its transport
pub struct SurfaceHandle {
    pub surface: Arc<dyn RenderSurface>,
    pub connection: SurfaceConnection,
}

/// Creates rendering surfaces and the status items that accompany them
pub trait SurfaceHost: Send + Sync {
    fn create_surface(&self, options: &SurfaceOptions) -> Result<SurfaceHandle>;

    fn create_status_indicator(&self) -> Arc<dyn StatusIndicator>;
}
