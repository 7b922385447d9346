//! Static markup loaded into a new preview surface

use jscadview_core::config::ViewerConfig;
use jscadview_core::viewport::ViewportPreset;

const TEMPLATE: &str = include_str!("../assets/preview.html");

/// Script inside the surface that hosts the viewer application
pub const VIEWER_SCRIPT: &str = "media/main.mjs";

const PRESETS: [ViewportPreset; 4] = [
    ViewportPreset::Scene,
    ViewportPreset::Top,
    ViewportPreset::Front,
    ViewportPreset::Left,
];

/// Render the surface's HTML shell with the viewer options injected
pub fn render(title: &str, viewer: &ViewerConfig) -> String {
    // ViewerConfig only holds numbers and bools, so encoding cannot fail
    let config = serde_json::to_string(viewer).unwrap_or_else(|_| "{}".to_string());

    let presets = PRESETS
        .iter()
        .map(|preset| {
            format!(
                "      <div class=\"jscad-viewer-button\" data-action-viewport=\"{0}\" title=\"{1}\">{0}</div>",
                preset.name(),
                preset_tooltip(*preset)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    TEMPLATE
        .replace("{{title}}", &escape_html(title))
        .replace("{{config}}", &config)
        .replace("{{presets}}", &presets)
        .replace("{{script}}", VIEWER_SCRIPT)
}

fn preset_tooltip(preset: ViewportPreset) -> &'static str {
    match preset {
        ViewportPreset::Scene => "Reset to perspective view",
        ViewportPreset::Top => "View from top (look down Z axis)",
        ViewportPreset::Front => "View from front (look along X axis)",
        ViewportPreset::Back => "View from back",
        ViewportPreset::Left => "View from left (look along Y axis)",
        ViewportPreset::Right => "View from right",
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
