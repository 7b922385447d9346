//! Composition root wiring the preview pipeline to a host
//!
//! The host creates one [`Extension`] at activation, forwards editor events
//! to it, routes palette commands through [`Extension::execute`], and calls
//! [`Extension::deactivate`] on shutdown.

use crate::commands::Command;
use crate::export::{ExportReport, StlExporter};
use crate::panel::{PanelContext, PanelOptions, PanelSlot, PreviewPanel};
use crate::sync::{PreviewSynchronizer, SyncOutcome};
use anyhow::{Context, Result};
use jscadview_authoring::{CompletionProvider, import_polygon};
use jscadview_core::config::PreviewConfig;
use jscadview_core::host::{
    FilePicker, Notifier, OutputChannel, StateStorage, SurfaceHandle, SurfaceHost, Workspace,
};
use jscadview_core::viewport::ViewportPreset;
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;

/// Notification shown when a newly opened viewer reports it is ready
pub const INITIALIZED_MESSAGE: &str = "JSCAD Viewer initialized!";

/// Everything the host provides to the extension
#[derive(Clone)]
pub struct HostServices {
    pub workspace: Arc<dyn Workspace>,
    pub notifier: Arc<dyn Notifier>,
    pub surfaces: Arc<dyn SurfaceHost>,
    /// Per-panel durable state
    pub storage: Arc<dyn StateStorage>,
    /// Log channel for export tool output
    pub export_log: Arc<dyn OutputChannel>,
    pub file_picker: Arc<dyn FilePicker>,
}

/// The running extension
pub struct Extension {
    services: HostServices,
    panels: Arc<PanelSlot>,
    synchronizer: Arc<PreviewSynchronizer>,
    exporter: StlExporter,
    completions: CompletionProvider,
}

impl Extension {
    /// Wire up the pipeline; timers and surface pumps run on `runtime`
    pub fn activate(runtime: Handle, config: PreviewConfig, services: HostServices) -> Self {
        let panels = Arc::new(PanelSlot::new(PanelContext {
            runtime: runtime.clone(),
            surfaces: Arc::clone(&services.surfaces),
            workspace: Arc::clone(&services.workspace),
            notifier: Arc::clone(&services.notifier),
            storage: Arc::clone(&services.storage),
            options: PanelOptions::from_config(&config),
        }));

        let synchronizer = Arc::new(PreviewSynchronizer::new(
            runtime,
            config.debounce(),
            Arc::clone(&services.workspace),
            Arc::clone(&services.notifier),
            Arc::clone(&panels),
            config.document_filter(),
            Arc::new(config.diagnostic_policy()),
        ));

        let exporter = StlExporter::new(
            config.export.clone(),
            Arc::clone(&services.export_log),
            Arc::clone(&services.notifier),
        );

        tracing::info!(
            "jscadview active (extensions: {}, quiet period: {}ms)",
            config.extensions.join(", "),
            config.debounce_ms
        );

        Self {
            services,
            panels,
            synchronizer,
            exporter,
            completions: CompletionProvider::standard(),
        }
    }

    /// Run a palette command
    ///
    /// Failures are shown to the user and also returned.
    pub async fn execute(&self, command: Command) -> Result<()> {
        tracing::debug!("Executing {}", command);
        let result = match command {
            Command::OpenPreview => self.open_preview().map(|_| ()),
            Command::ExportAsStl => self.export_active().await.map(|_| ()),
            Command::ImportPathFromSvg => self.import_svg(),
        };

        if let Err(e) = &result {
            tracing::error!("{} failed: {:#}", command, e);
            self.services.notifier.error(&format!("{:#}", e));
        }
        result
    }

    /// Open the preview panel, or reveal it if it is already open
    ///
    /// A newly created panel pushes the active document as soon as its
    /// viewer is ready.
    pub fn open_preview(&self) -> Result<PreviewPanel> {
        let notifier = Arc::clone(&self.services.notifier);
        let synchronizer: Weak<PreviewSynchronizer> = Arc::downgrade(&self.synchronizer);
        let opened = self
            .panels
            .create_or_show_with(move || {
                notifier.info(INITIALIZED_MESSAGE);
                if let Some(synchronizer) = synchronizer.upgrade() {
                    synchronizer.push_now();
                }
            })
            .context("Failed to open preview")?;

        if !opened.created {
            tracing::debug!("Preview already open; revealed");
        }
        Ok(opened.panel)
    }

    /// Rebuild the panel from a surface the host restored
    pub fn revive(&self, handle: SurfaceHandle) -> PreviewPanel {
        self.panels.revive(handle)
    }

    /// Export the active document with the external tool
    ///
    /// Returns `None` when there is no active editor. Tool failures are
    /// reported through the log channel and are not errors.
    pub async fn export_active(&self) -> Result<Option<ExportReport>> {
        let Some(editor) = self.services.workspace.active_editor() else {
            self.services.notifier.warn("No active document to export");
            return Ok(None);
        };

        let path = PathBuf::from(editor.document_id().as_str());
        Ok(Some(self.exporter.export(&path).await))
    }

    /// Ask for an SVG file and insert its first polygon at the cursor
    ///
    /// Cancelling the picker is not an error. Nothing is inserted if the
    /// file cannot be converted.
    pub fn import_svg(&self) -> Result<()> {
        let editor = self
            .services
            .workspace
            .active_editor()
            .context("Open a document to import an SVG path into")?;

        let Some(path) = self
            .services
            .file_picker
            .pick_file("Import path from SVG", &["svg"])
        else {
            tracing::debug!("SVG import cancelled");
            return Ok(());
        };

        let snippet = import_polygon(&path)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        editor
            .insert_snippet(&snippet)
            .context("Failed to insert polygon")?;

        tracing::info!("Imported polygon from {}", path.display());
        Ok(())
    }

    /// Point the live panel's viewer at a preset direction
    pub fn set_viewport(&self, preset: ViewportPreset) -> Result<()> {
        let panel = self.panels.current().context("Preview is not open")?;
        panel
            .set_viewport_preset(preset)
            .with_context(|| format!("Failed to switch to {} view", preset))
    }

    /// Forward a selection change from the host
    pub fn on_selection_changed(&self) {
        self.synchronizer.on_selection_changed();
    }

    /// Forward an active editor change from the host
    pub fn on_active_editor_changed(&self) {
        self.synchronizer.on_active_editor_changed();
    }

    /// Push the active document now, skipping the quiet period
    pub fn refresh(&self) -> SyncOutcome {
        self.synchronizer.push_now()
    }

    /// The live panel, if any
    pub fn panel(&self) -> Option<PreviewPanel> {
        self.panels.current()
    }

    pub fn synchronizer(&self) -> &PreviewSynchronizer {
        &self.synchronizer
    }

    pub fn completions(&self) -> &CompletionProvider {
        &self.completions
    }

    /// Stop pending work and close the panel
    pub fn deactivate(&self) {
        self.synchronizer.cancel_pending();
        self.panels.dispose();
        tracing::info!("jscadview deactivated");
    }
}
