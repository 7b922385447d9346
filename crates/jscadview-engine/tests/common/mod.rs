//! In-memory host collaborators shared by the integration tests

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use jscadview_core::diagnostics::Diagnostic;
use jscadview_core::document::DocumentId;
use jscadview_core::host::{
    FilePicker, Notifier, OutputChannel, RenderSurface, StateStorage, StatusIndicator,
    SurfaceConnection, SurfaceHandle, SurfaceHost, SurfaceOptions, TextEditor, Workspace,
};
use jscadview_core::protocol::{HostMessage, SurfaceMessage};
use jscadview_core::viewport::ViewportSettings;
use jscadview_engine::{HostServices, PanelContext, PanelOptions};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Let spawned tasks (surface pumps, fired timers) run to completion
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub struct FakeEditor {
    id: DocumentId,
    text: Mutex<String>,
    pub snippets: Mutex<Vec<String>>,
}

impl FakeEditor {
    pub fn new(id: &str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            id: DocumentId::new(id),
            text: Mutex::new(text.to_string()),
            snippets: Mutex::new(Vec::new()),
        })
    }

    pub fn set_text(&self, text: &str) {
        *self.text.lock() = text.to_string();
    }
}

impl TextEditor for FakeEditor {
    fn document_id(&self) -> DocumentId {
        self.id.clone()
    }

    fn text(&self) -> String {
        self.text.lock().clone()
    }

    fn insert_snippet(&self, snippet: &str) -> jscadview_core::Result<()> {
        self.snippets.lock().push(snippet.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeWorkspace {
    active: Mutex<Option<Arc<FakeEditor>>>,
    diagnostics: Mutex<HashMap<DocumentId, Vec<Diagnostic>>>,
}

impl FakeWorkspace {
    pub fn focus(&self, editor: Option<&Arc<FakeEditor>>) {
        *self.active.lock() = editor.cloned();
    }

    pub fn set_diagnostics(&self, id: &str, diagnostics: Vec<Diagnostic>) {
        self.diagnostics.lock().insert(DocumentId::new(id), diagnostics);
    }
}

impl Workspace for FakeWorkspace {
    fn active_editor(&self) -> Option<Arc<dyn TextEditor>> {
        self.active
            .lock()
            .clone()
            .map(|editor| editor as Arc<dyn TextEditor>)
    }

    fn diagnostics(&self, document: &DocumentId) -> Vec<Diagnostic> {
        self.diagnostics.lock().get(document).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingNotifier {
    pub fn all(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all(Level::Error)
    }

    pub fn warnings(&self) -> Vec<String> {
        self.all(Level::Warn)
    }

    pub fn infos(&self) -> Vec<String> {
        self.all(Level::Info)
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.messages.lock().push((Level::Info, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.messages.lock().push((Level::Warn, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages.lock().push((Level::Error, message.to_string()));
    }
}

#[derive(Default)]
pub struct FakeStatus {
    /// Text of the item while visible
    pub visible: Mutex<Option<String>>,
    pub command: Mutex<Option<String>>,
    pub disposed: Mutex<bool>,
}

impl StatusIndicator for FakeStatus {
    fn show(&self, text: &str, _tooltip: &str, command: &str) {
        *self.visible.lock() = Some(text.to_string());
        *self.command.lock() = Some(command.to_string());
    }

    fn hide(&self) {
        *self.visible.lock() = None;
    }

    fn dispose(&self) {
        *self.visible.lock() = None;
        *self.disposed.lock() = true;
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    pub state: Mutex<Option<Value>>,
}

impl StateStorage for MemoryStorage {
    fn load_state(&self) -> Option<Value> {
        self.state.lock().clone()
    }

    fn save_state(&self, state: Value) -> jscadview_core::Result<()> {
        *self.state.lock() = Some(state);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSurface {
    pub title: Mutex<String>,
    pub markup: Mutex<String>,
    pub reveals: Mutex<usize>,
    pub disposed: Mutex<bool>,
}

impl RenderSurface for FakeSurface {
    fn reveal(&self) {
        *self.reveals.lock() += 1;
    }

    fn set_title(&self, title: &str) {
        *self.title.lock() = title.to_string();
    }

    fn set_markup(&self, html: &str) {
        *self.markup.lock() = html.to_string();
    }

    fn dispose(&self) {
        *self.disposed.lock() = true;
    }
}

/// The surface side of one connection
pub struct SurfaceEnd {
    pub surface: Arc<FakeSurface>,
    to_host: Mutex<Option<UnboundedSender<String>>>,
    from_host: Mutex<UnboundedReceiver<String>>,
}

impl SurfaceEnd {
    /// Build a detached surface, as a host would when restoring one
    pub fn pair() -> (Arc<SurfaceEnd>, SurfaceHandle) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let surface = Arc::new(FakeSurface::default());

        let end = Arc::new(SurfaceEnd {
            surface: Arc::clone(&surface),
            to_host: Mutex::new(Some(inbound_tx)),
            from_host: Mutex::new(outbound_rx),
        });
        let handle = SurfaceHandle {
            surface,
            connection: SurfaceConnection {
                outbound: outbound_tx,
                inbound: inbound_rx,
            },
        };
        (end, handle)
    }

    pub fn post(&self, message: &SurfaceMessage) {
        self.post_raw(&message.encode().unwrap());
    }

    pub fn post_raw(&self, raw: &str) {
        if let Some(tx) = self.to_host.lock().as_ref() {
            tx.send(raw.to_string()).unwrap();
        }
    }

    pub fn report_viewport(&self, settings: ViewportSettings) {
        self.post(&SurfaceMessage::Viewport(settings));
    }

    /// Refuse further host messages while keeping the inbound side open
    pub fn stop_receiving(&self) {
        self.from_host.lock().close();
    }

    /// Simulate the user closing the surface
    pub fn hang_up(&self) {
        self.to_host.lock().take();
    }

    /// Every message the host sent since the last call
    pub fn drain(&self) -> Vec<HostMessage> {
        let mut rx = self.from_host.lock();
        let mut messages = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            messages.push(serde_json::from_str(&raw).unwrap());
        }
        messages
    }

    /// Sources of the `setData` messages sent since the last call
    pub fn drain_sources(&self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|message| match message {
                HostMessage::SetData(payload) => Some(payload.data),
                HostMessage::SetViewport(_) => None,
            })
            .collect()
    }
}

#[derive(Default)]
pub struct FakeSurfaceHost {
    pub surfaces: Mutex<Vec<Arc<SurfaceEnd>>>,
    pub statuses: Mutex<Vec<Arc<FakeStatus>>>,
    /// New surfaces report `initialized` before `create_surface` returns
    pub ready_on_create: Mutex<bool>,
}

impl FakeSurfaceHost {
    pub fn created(&self) -> usize {
        self.surfaces.lock().len()
    }

    pub fn last(&self) -> Arc<SurfaceEnd> {
        Arc::clone(self.surfaces.lock().last().unwrap())
    }

    pub fn last_status(&self) -> Arc<FakeStatus> {
        Arc::clone(self.statuses.lock().last().unwrap())
    }
}

impl SurfaceHost for FakeSurfaceHost {
    fn create_surface(&self, _options: &SurfaceOptions) -> jscadview_core::Result<SurfaceHandle> {
        let (end, handle) = SurfaceEnd::pair();
        if *self.ready_on_create.lock() {
            end.post(&SurfaceMessage::Initialized);
        }
        self.surfaces.lock().push(end);
        Ok(handle)
    }

    fn create_status_indicator(&self) -> Arc<dyn StatusIndicator> {
        let status = Arc::new(FakeStatus::default());
        self.statuses.lock().push(Arc::clone(&status));
        status
    }
}

#[derive(Default)]
pub struct RecordingChannel {
    pub lines: Mutex<Vec<String>>,
    pub shown: Mutex<usize>,
}

impl OutputChannel for RecordingChannel {
    fn append_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }

    fn show(&self, _preserve_focus: bool) {
        *self.shown.lock() += 1;
    }
}

#[derive(Default)]
pub struct FakePicker {
    pub next: Mutex<Option<PathBuf>>,
}

impl FilePicker for FakePicker {
    fn pick_file(&self, _title: &str, _extensions: &[&str]) -> Option<PathBuf> {
        self.next.lock().take()
    }
}

/// A full set of fakes
#[derive(Default)]
pub struct Host {
    pub workspace: Arc<FakeWorkspace>,
    pub notifier: Arc<RecordingNotifier>,
    pub surfaces: Arc<FakeSurfaceHost>,
    pub storage: Arc<MemoryStorage>,
    pub export_log: Arc<RecordingChannel>,
    pub picker: Arc<FakePicker>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> PanelContext {
        PanelContext {
            runtime: Handle::current(),
            surfaces: Arc::clone(&self.surfaces) as Arc<dyn SurfaceHost>,
            workspace: Arc::clone(&self.workspace) as Arc<dyn Workspace>,
            notifier: Arc::clone(&self.notifier) as Arc<dyn Notifier>,
            storage: Arc::clone(&self.storage) as Arc<dyn StateStorage>,
            options: PanelOptions::default(),
        }
    }

    pub fn services(&self) -> HostServices {
        HostServices {
            workspace: Arc::clone(&self.workspace) as Arc<dyn Workspace>,
            notifier: Arc::clone(&self.notifier) as Arc<dyn Notifier>,
            surfaces: Arc::clone(&self.surfaces) as Arc<dyn SurfaceHost>,
            storage: Arc::clone(&self.storage) as Arc<dyn StateStorage>,
            export_log: Arc::clone(&self.export_log) as Arc<dyn OutputChannel>,
            file_picker: Arc::clone(&self.picker) as Arc<dyn FilePicker>,
        }
    }
}
