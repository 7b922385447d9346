//! Integration tests for palette commands and activation wiring

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

mod common;

use common::{FakeEditor, Host, settle};
use jscadview_core::config::PreviewConfig;
use jscadview_core::protocol::{HostMessage, SurfaceMessage};
use jscadview_core::viewport::ViewportPreset;
use jscadview_engine::extension::INITIALIZED_MESSAGE;
use jscadview_engine::{Command, Extension, PanelState, SyncOutcome};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Handle;

fn activate(host: &Host) -> Extension {
    Extension::activate(Handle::current(), PreviewConfig::default(), host.services())
}

fn temp_svg(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("jscadview-{}-{}.svg", std::process::id(), name));
    std::fs::write(&path, contents).expect("Failed to write temp SVG");
    path
}

#[tokio::test]
async fn open_preview_twice_reveals_existing_panel() {
    let host = Host::new();
    let extension = activate(&host);

    extension.execute(Command::OpenPreview).await.unwrap();
    extension.execute(Command::OpenPreview).await.unwrap();

    assert_eq!(host.surfaces.created(), 1);
    assert_eq!(*host.surfaces.last().surface.reveals.lock(), 1);
}

#[tokio::test]
async fn initialized_viewer_gets_immediate_push() {
    let host = Host::new();
    let editor = FakeEditor::new("/m/gear.jscad", "cube({size: 10})");
    host.workspace.focus(Some(&editor));
    let extension = activate(&host);

    extension.open_preview().unwrap();
    let end = host.surfaces.last();
    end.post(&SurfaceMessage::Initialized);
    settle().await;

    assert_eq!(host.notifier.infos(), vec![INITIALIZED_MESSAGE]);
    assert_eq!(end.drain_sources(), vec!["cube({size: 10})"]);
    assert_eq!(extension.panel().unwrap().state(), PanelState::Initialized);
    assert!(!extension.synchronizer().has_pending());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn viewer_ready_before_open_returns_still_gets_push() {
    let host = Host::new();
    *host.surfaces.ready_on_create.lock() = true;
    let editor = FakeEditor::new("/m/gear.jscad", "sphere()");
    host.workspace.focus(Some(&editor));
    let extension = activate(&host);

    extension.open_preview().unwrap();
    let end = host.surfaces.last();

    let sources = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let sources = end.drain_sources();
            if !sources.is_empty() {
                return sources;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("initial push never arrived");

    assert_eq!(sources, vec!["sphere()"]);
    assert_eq!(host.notifier.infos(), vec![INITIALIZED_MESSAGE]);
    assert_eq!(extension.panel().unwrap().state(), PanelState::Initialized);
}

#[tokio::test]
async fn reopened_panel_fires_initialization_again() {
    let host = Host::new();
    let extension = activate(&host);

    extension.open_preview().unwrap();
    host.surfaces.last().post(&SurfaceMessage::Initialized);
    settle().await;

    extension.deactivate();
    assert!(extension.panel().is_none());

    extension.open_preview().unwrap();
    host.surfaces.last().post(&SurfaceMessage::Initialized);
    settle().await;

    assert_eq!(host.notifier.infos().len(), 2);
}

#[tokio::test]
async fn refresh_pushes_without_waiting() {
    let host = Host::new();
    let editor = FakeEditor::new("/m/gear.jscad", "cube()");
    host.workspace.focus(Some(&editor));
    let extension = activate(&host);

    assert_eq!(extension.refresh(), SyncOutcome::NoPanel);

    extension.open_preview().unwrap();
    let end = host.surfaces.last();
    editor.set_text("cylinder()");
    assert_eq!(extension.refresh(), SyncOutcome::Pushed("/m/gear.jscad".into()));
    assert_eq!(end.drain_sources(), vec!["cylinder()"]);
}

#[tokio::test]
async fn import_svg_inserts_polygon_snippet() {
    let host = Host::new();
    let editor = FakeEditor::new("/m/gear.jscad", "");
    host.workspace.focus(Some(&editor));
    let path = temp_svg(
        "square",
        r#"<svg xmlns="http://www.w3.org/2000/svg"><polygon points="0 0 1 0 1 1 0 1"/></svg>"#,
    );
    *host.picker.next.lock() = Some(path.clone());
    let extension = activate(&host);

    extension.execute(Command::ImportPathFromSvg).await.unwrap();

    let snippets = editor.snippets.lock().clone();
    assert_eq!(snippets.len(), 1);
    assert!(snippets[0].starts_with("let ${1:poly} = polygon(["));
    assert!(snippets[0].contains("\t[1, 1]"));
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn odd_point_count_reports_and_inserts_nothing() {
    let host = Host::new();
    let editor = FakeEditor::new("/m/gear.jscad", "");
    host.workspace.focus(Some(&editor));
    let path = temp_svg("odd", r#"<svg><polygon points="0 0 1 0 1"/></svg>"#);
    *host.picker.next.lock() = Some(path.clone());
    let extension = activate(&host);

    let result = extension.execute(Command::ImportPathFromSvg).await;

    assert!(result.is_err());
    assert!(editor.snippets.lock().is_empty());
    let errors = host.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("odd number of coordinates"));
    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn cancelled_picker_is_not_an_error() {
    let host = Host::new();
    let editor = FakeEditor::new("/m/gear.jscad", "");
    host.workspace.focus(Some(&editor));
    let extension = activate(&host);

    extension.execute(Command::ImportPathFromSvg).await.unwrap();

    assert!(editor.snippets.lock().is_empty());
    assert!(host.notifier.errors().is_empty());
}

#[tokio::test]
async fn export_without_editor_warns() {
    let host = Host::new();
    let extension = activate(&host);

    let report = extension.export_active().await.unwrap();

    assert!(report.is_none());
    assert_eq!(host.notifier.warnings().len(), 1);
    assert!(host.export_log.lines.lock().is_empty());
}

#[tokio::test]
async fn set_viewport_requires_open_panel() {
    let host = Host::new();
    let extension = activate(&host);

    assert!(extension.set_viewport(ViewportPreset::Front).is_err());

    extension.open_preview().unwrap();
    extension.set_viewport(ViewportPreset::Front).unwrap();
    assert_eq!(
        host.surfaces.last().drain(),
        vec![HostMessage::SetViewport(ViewportPreset::Front)]
    );
}

#[tokio::test]
async fn deactivate_closes_panel() {
    let host = Host::new();
    let extension = activate(&host);
    let panel = extension.open_preview().unwrap();

    extension.deactivate();

    assert_eq!(panel.state(), PanelState::Disposed);
    assert!(*host.surfaces.last().surface.disposed.lock());
}

#[tokio::test]
async fn completions_available() {
    let host = Host::new();
    let extension = activate(&host);
    assert!(extension.completions().resolve("translate").is_some());
}
