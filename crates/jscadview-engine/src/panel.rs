//! Preview panel lifecycle
//!
//! A [`PreviewPanel`] wraps one rendering surface, its bridge and its status
//! item. The [`PanelSlot`] owns "the current panel" and enforces that at most
//! one live panel exists: opening reveals the existing panel instead of
//! building another, and a disposed panel is dropped from the slot so the
//! next open builds a fresh one.
//!
//! ```text
//! Absent --create--> Created --initialized--> Initialized
//!                       |                          |
//!                       +--------dispose-----------+--> Disposed
//! ```

use crate::bridge::{BridgeError, BridgeEvent, SurfaceBridge};
use crate::markup;
use jscadview_core::config::{PreviewConfig, ViewerConfig};
use jscadview_core::document::{DocumentFilter, DocumentId};
use jscadview_core::host::{
    Notifier, RenderSurface, StateStorage, StatusIndicator, SurfaceHandle, SurfaceHost,
    SurfaceOptions, Workspace,
};
use jscadview_core::protocol::{HostMessage, InboundDecoder, SetDataPayload, SurfaceMessage};
use jscadview_core::viewport::{ViewportPreset, ViewportSettings, ViewportStore};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::runtime::Handle;

/// Command that reveals the preview, run when the status item is clicked
pub const OPEN_PREVIEW_COMMAND: &str = "jscadEditor.openPreview";

/// Errors raised by panel operations
#[derive(Error, Debug)]
pub enum PanelError {
    /// The panel was closed
    #[error("Preview panel has been disposed")]
    Disposed,

    /// The host could not create a surface
    #[error("Failed to create preview surface: {0}")]
    Surface(#[from] jscadview_core::Error),

    /// A message could not be delivered
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Lifecycle state of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Surface exists, viewer not ready yet
    Created,
    /// Viewer signaled readiness
    Initialized,
    /// Closed; never leaves this state
    Disposed,
}

/// Presentation settings shared by every panel
#[derive(Debug, Clone)]
pub struct PanelOptions {
    pub view_type: String,
    pub title: String,
    pub status_prefix: String,
    pub filter: DocumentFilter,
    pub viewer: ViewerConfig,
}

impl PanelOptions {
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self {
            view_type: config.view_type.clone(),
            title: config.panel_title.clone(),
            status_prefix: config.status_prefix.clone(),
            filter: config.document_filter(),
            viewer: config.viewer.clone(),
        }
    }
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self::from_config(&PreviewConfig::default())
    }
}

/// Host services a panel needs for its whole lifetime
#[derive(Clone)]
pub struct PanelContext {
    pub runtime: Handle,
    pub surfaces: Arc<dyn SurfaceHost>,
    pub workspace: Arc<dyn Workspace>,
    pub notifier: Arc<dyn Notifier>,
    pub storage: Arc<dyn StateStorage>,
    pub options: PanelOptions,
}

type InitListener = Box<dyn FnOnce() + Send>;

/// Mutable part of a panel, always updated under one lock
struct PanelSession {
    state: PanelState,
    current_document: Option<DocumentId>,
    /// Last camera the surface reported for the current document
    reported_viewport: Option<ViewportSettings>,
    viewports: ViewportStore,
    listeners: Vec<InitListener>,
}

struct PanelShared {
    surface: Arc<dyn RenderSurface>,
    bridge: SurfaceBridge,
    status: Arc<dyn StatusIndicator>,
    workspace: Arc<dyn Workspace>,
    notifier: Arc<dyn Notifier>,
    storage: Arc<dyn StateStorage>,
    options: PanelOptions,
    session: Mutex<PanelSession>,
}

/// Handle to one preview surface; clones share the same panel
#[derive(Clone)]
pub struct PreviewPanel {
    shared: Arc<PanelShared>,
}

impl PreviewPanel {
    /// Ask the host for a new surface and set it up
    pub fn create(context: &PanelContext) -> Result<Self, PanelError> {
        Self::create_with(context, Vec::new())
    }

    /// Build a panel around a surface the host already has (e.g. restored
    /// after a reload)
    pub fn attach(context: &PanelContext, handle: SurfaceHandle) -> Self {
        Self::attach_with(context, handle, Vec::new())
    }

    fn create_with(
        context: &PanelContext,
        listeners: Vec<InitListener>,
    ) -> Result<Self, PanelError> {
        let options = SurfaceOptions {
            view_type: context.options.view_type.clone(),
            title: context.options.title.clone(),
            enable_scripts: true,
        };
        let handle = context.surfaces.create_surface(&options)?;
        Ok(Self::attach_with(context, handle, listeners))
    }

    /// `listeners` are in place before the surface's first message is read
    fn attach_with(
        context: &PanelContext,
        handle: SurfaceHandle,
        listeners: Vec<InitListener>,
    ) -> Self {
        let SurfaceHandle { surface, connection } = handle;

        let viewports = ViewportStore::restore(context.storage.as_ref()).unwrap_or_else(|e| {
            tracing::warn!("Ignoring stored viewport settings: {}", e);
            ViewportStore::new()
        });

        surface.set_markup(&markup::render(&context.options.title, &context.options.viewer));

        let shared = Arc::new(PanelShared {
            surface,
            bridge: SurfaceBridge::new(connection.outbound, InboundDecoder::default()),
            status: context.surfaces.create_status_indicator(),
            workspace: Arc::clone(&context.workspace),
            notifier: Arc::clone(&context.notifier),
            storage: Arc::clone(&context.storage),
            options: context.options.clone(),
            session: Mutex::new(PanelSession {
                state: PanelState::Created,
                current_document: None,
                reported_viewport: None,
                viewports,
                listeners,
            }),
        });

        let weak: Weak<PanelShared> = Arc::downgrade(&shared);
        shared
            .bridge
            .listen(&context.runtime, connection.inbound, move |event| {
                if let Some(shared) = weak.upgrade() {
                    PreviewPanel { shared }.handle_event(event);
                }
            });

        tracing::info!("Preview panel created");
        Self { shared }
    }

    /// Current lifecycle state
    pub fn state(&self) -> PanelState {
        self.shared.session.lock().state
    }

    pub fn is_disposed(&self) -> bool {
        self.state() == PanelState::Disposed
    }

    /// Document whose source was last sent to the surface
    pub fn current_document(&self) -> Option<DocumentId> {
        self.shared.session.lock().current_document.clone()
    }

    /// Camera settings stored for a document
    pub fn stored_viewport(&self, document: &DocumentId) -> Option<ViewportSettings> {
        self.shared.session.lock().viewports.load(document)
    }

    /// Whether two handles refer to the same panel
    pub fn same_panel(&self, other: &PreviewPanel) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Bring the surface to the foreground without reloading it
    pub fn reveal(&self) {
        if !self.is_disposed() {
            self.shared.surface.reveal();
        }
    }

    /// Run `listener` once, when the surface reports it is ready
    ///
    /// Listeners registered after initialization never fire. Disposal drops
    /// listeners that have not fired. The surface may report readiness as
    /// soon as it exists; [`PanelSlot::create_or_show_with`] registers before
    /// that can happen.
    pub fn on_initialized<F>(&self, listener: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut session = self.shared.session.lock();
        if session.state == PanelState::Created {
            session.listeners.push(Box::new(listener));
        }
    }

    /// Send a document's source to the surface
    ///
    /// Before switching, the camera last reported for the previous document
    /// is saved under its identity, and the camera stored for `document` (if
    /// any) travels with the new source. Nothing changes unless the message
    /// was handed to the transport.
    pub fn set_data(&self, source: String, document: DocumentId) -> Result<(), PanelError> {
        let mut session = self.shared.session.lock();
        if session.state == PanelState::Disposed {
            return Err(PanelError::Disposed);
        }

        let captured = session
            .current_document
            .clone()
            .zip(session.reported_viewport);
        let restored = match &captured {
            Some((previous, settings)) if *previous == document => Some(*settings),
            _ => session.viewports.load(&document),
        };

        self.shared.bridge.send(&HostMessage::SetData(SetDataPayload {
            data: source,
            file_name: document.to_string(),
            viewport: restored,
        }))?;

        if let Some((previous, settings)) = captured {
            session.viewports.save(previous, settings);
            if let Err(e) = session.viewports.persist(self.shared.storage.as_ref()) {
                tracing::warn!("Failed to persist viewport settings: {}", e);
            }
        }
        session.current_document = Some(document.clone());
        session.reported_viewport = restored;
        drop(session);

        let title = match document.display_name() {
            "" => "Preview".to_string(),
            name => format!("Preview of {}", name),
        };
        self.shared.surface.set_title(&title);
        Ok(())
    }

    /// Point the viewer at a fixed direction
    pub fn set_viewport_preset(&self, preset: ViewportPreset) -> Result<(), PanelError> {
        if self.is_disposed() {
            return Err(PanelError::Disposed);
        }
        self.shared.bridge.send(&HostMessage::SetViewport(preset))?;
        Ok(())
    }

    /// Show or hide the status item for a pipeline phase
    ///
    /// The item is only visible while the active editor holds a previewable
    /// document.
    pub fn update_status(&self, status: &str) {
        let prefix = &self.shared.options.status_prefix;
        let eligible = self
            .shared
            .workspace
            .active_editor()
            .is_some_and(|editor| self.shared.options.filter.matches(&editor.document_id()));

        if eligible {
            self.shared.status.show(
                &format!("{}: {}", prefix, status),
                &format!("{} processor status", prefix),
                OPEN_PREVIEW_COMMAND,
            );
        } else {
            self.shared.status.hide();
        }
    }

    /// Close the surface and release everything attached to it
    pub fn dispose(&self) {
        {
            let mut session = self.shared.session.lock();
            if session.state == PanelState::Disposed {
                return;
            }
            session.state = PanelState::Disposed;
            session.listeners.clear();
        }

        self.shared.bridge.close();
        self.shared.surface.dispose();
        self.shared.status.dispose();
        tracing::info!("Preview panel disposed");
    }

    fn handle_event(&self, event: BridgeEvent) {
        match event {
            BridgeEvent::Message(SurfaceMessage::Initialized) => self.mark_initialized(),
            BridgeEvent::Message(SurfaceMessage::Status(status)) => {
                if !self.is_disposed() {
                    self.update_status(&status);
                }
            }
            BridgeEvent::Message(SurfaceMessage::Alert(text)) => {
                self.shared.notifier.error(&text);
            }
            BridgeEvent::Message(SurfaceMessage::Viewport(settings)) => {
                let mut session = self.shared.session.lock();
                if session.state != PanelState::Disposed {
                    session.reported_viewport = Some(settings);
                }
            }
            BridgeEvent::Violation(e) => {
                tracing::error!("{}", e);
                self.shared.notifier.error(&e.to_string());
            }
            BridgeEvent::Closed => {
                tracing::debug!("Preview surface closed its channel");
                self.dispose();
            }
        }
    }

    fn mark_initialized(&self) {
        let listeners = {
            let mut session = self.shared.session.lock();
            match session.state {
                PanelState::Created => {
                    session.state = PanelState::Initialized;
                    std::mem::take(&mut session.listeners)
                }
                PanelState::Initialized => {
                    tracing::debug!("Preview surface initialized again; listeners already ran");
                    return;
                }
                PanelState::Disposed => return,
            }
        };

        tracing::info!("Preview surface initialized");
        for listener in listeners {
            listener();
        }
    }
}

/// Outcome of [`PanelSlot::create_or_show`]
pub struct OpenedPanel {
    pub panel: PreviewPanel,
    /// `false` when an existing panel was revealed
    pub created: bool,
}

/// Owner of the single live preview panel
pub struct PanelSlot {
    context: PanelContext,
    current: Mutex<Option<PreviewPanel>>,
}

impl PanelSlot {
    pub fn new(context: PanelContext) -> Self {
        Self {
            context,
            current: Mutex::new(None),
        }
    }

    /// The live panel, if any
    pub fn current(&self) -> Option<PreviewPanel> {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(PreviewPanel::is_disposed) {
            *current = None;
        }
        current.clone()
    }

    /// Reveal the live panel, or create one if there is none
    pub fn create_or_show(&self) -> Result<OpenedPanel, PanelError> {
        self.open(Vec::new())
    }

    /// Like [`create_or_show`](Self::create_or_show), running `on_initialized`
    /// once if a new panel is created
    ///
    /// The listener is registered before the new surface can report
    /// readiness. It is dropped when an existing panel is revealed.
    pub fn create_or_show_with<F>(&self, on_initialized: F) -> Result<OpenedPanel, PanelError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.open(vec![Box::new(on_initialized)])
    }

    fn open(&self, listeners: Vec<InitListener>) -> Result<OpenedPanel, PanelError> {
        let mut current = self.current.lock();

        if let Some(panel) = current.as_ref().filter(|p| !p.is_disposed()) {
            panel.reveal();
            return Ok(OpenedPanel {
                panel: panel.clone(),
                created: false,
            });
        }

        let panel = PreviewPanel::create_with(&self.context, listeners)?;
        *current = Some(panel.clone());
        Ok(OpenedPanel {
            panel,
            created: true,
        })
    }

    /// Adopt a surface restored by the host
    ///
    /// If a live panel already exists the restored surface is closed and the
    /// existing panel is kept.
    pub fn revive(&self, handle: SurfaceHandle) -> PreviewPanel {
        let mut current = self.current.lock();

        if let Some(panel) = current.as_ref().filter(|p| !p.is_disposed()) {
            tracing::warn!("Preview panel already open; closing restored surface");
            handle.surface.dispose();
            return panel.clone();
        }

        let panel = PreviewPanel::attach(&self.context, handle);
        *current = Some(panel.clone());
        panel
    }

    /// Dispose the live panel, if any
    pub fn dispose(&self) {
        let panel = self.current.lock().take();
        if let Some(panel) = panel {
            panel.dispose();
        }
    }
}
