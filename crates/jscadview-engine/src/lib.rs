//! jscadview engine - live preview orchestration
//!
//! Keeps a sandboxed 3D viewer in sync with the script being edited:
//!
//! ```text
//! editor events -> PreviewSynchronizer (debounce, filters)
//!               -> PreviewPanel (viewport save/restore)
//!               -> SurfaceBridge -> rendering surface
//! ```
//!
//! Status, alert and viewport reports flow back along the same path.
//!
//! ## Example
//!
//! ```ignore
//! use jscadview_engine::{Command, Extension, HostServices};
//! use jscadview_core::PreviewConfig;
//!
//! let extension = Extension::activate(
//!     tokio::runtime::Handle::current(),
//!     PreviewConfig::load_or_default(None),
//!     services,
//! );
//!
//! extension.execute(Command::OpenPreview).await?;
//! extension.on_selection_changed();
//! ```

pub mod bridge;
pub mod commands;
pub mod debounce;
pub mod export;
pub mod extension;
pub mod markup;
pub mod panel;
pub mod sync;

pub use bridge::{BridgeError, BridgeEvent, SurfaceBridge};
pub use commands::Command;
pub use debounce::Debouncer;
pub use export::{ExportReport, StlExporter};
pub use extension::{Extension, HostServices};
pub use panel::{OpenedPanel, PanelContext, PanelError, PanelOptions, PanelSlot, PanelState, PreviewPanel};
pub use sync::{PreviewSynchronizer, SyncOutcome, SyncTrigger};
