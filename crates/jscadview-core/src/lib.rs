//! jscadview core - shared types for the live preview pipeline
//!
//! This crate holds everything the preview orchestration needs that is not
//! tied to a runtime:
//!
//! - Document identity and the eligibility filter
//! - Viewport settings and the per-document [`ViewportStore`]
//! - The typed message protocol spoken with the rendering surface
//! - Diagnostics and the policy that decides whether they block a preview
//! - The host collaborator traits (editor, notifications, storage, surfaces)
//! - User configuration
//!
//! The runtime pieces (bridge, panel, synchronizer) live in `jscadview-engine`.

pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod host;
pub mod protocol;
pub mod viewport;

pub use config::{ConfigError, ExportToolConfig, PreviewConfig, ViewerConfig};
pub use diagnostics::{Diagnostic, DiagnosticPolicy, ErrorSeverityPolicy, Severity};
pub use document::{DocumentFilter, DocumentId};
pub use error::{Error, Result};
pub use host::{
    FilePicker, Notifier, OutputChannel, RenderSurface, StateStorage, StatusIndicator,
    SurfaceConnection, SurfaceHandle, SurfaceHost, SurfaceOptions, TextEditor, Workspace,
};
pub use protocol::{
    HostMessage, InboundDecoder, PayloadDecoder, ProtocolError, SetDataPayload, SurfaceMessage,
};
pub use viewport::{ViewportPreset, ViewportSettings, ViewportStore};
