//! User configuration for the preview pipeline
//!
//! Settings are stored as JSON in `{config_dir}/jscadview/settings.json`.
//! Every field has a default, so a partial file only overrides what it names.

use crate::diagnostics::ErrorSeverityPolicy;
use crate::document::DocumentFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// How the external export tool is invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportToolConfig {
    /// Executable name or path
    pub program: String,
    /// Arguments; `{file}` is replaced by the document path
    pub args: Vec<String>,
    /// Working directory for the tool (defaults to the document's directory)
    pub working_dir: Option<PathBuf>,
}

impl Default for ExportToolConfig {
    fn default() -> Self {
        Self {
            program: "openjscad".to_string(),
            args: vec!["{file}".to_string(), "-of".to_string(), "stl".to_string()],
            working_dir: None,
        }
    }
}

impl ExportToolConfig {
    /// Placeholder substituted with the document path
    pub const FILE_PLACEHOLDER: &'static str = "{file}";

    /// Arguments with the document path filled in
    pub fn args_for(&self, file: &Path) -> Vec<String> {
        let file = file.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace(Self::FILE_PLACEHOLDER, &file))
            .collect()
    }
}

/// Options injected into the surface's static markup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Background color as RGBA in `0.0..=1.0`
    pub background: [f32; 4],
    /// Size of the ground plate grid
    pub plate_size: u32,
    /// Whether to draw the ground plate
    pub draw_plate: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            background: [0.2, 0.2, 0.2, 1.0],
            plate_size: 200,
            draw_plate: true,
        }
    }
}

/// Settings for the whole preview pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Quiet period after the last editor event before the preview updates
    pub debounce_ms: u64,
    /// File extensions eligible for preview
    pub extensions: Vec<String>,
    /// Diagnostic source whose single error does not block previews
    pub tolerated_diagnostic_source: Option<String>,
    /// Prefix shown in the status indicator
    pub status_prefix: String,
    /// Initial title of the preview panel
    pub panel_title: String,
    /// Host-side type tag of the preview panel
    pub view_type: String,
    /// External export tool
    pub export: ExportToolConfig,
    /// Viewer presentation options
    pub viewer: ViewerConfig,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            extensions: vec!["jscad".to_string()],
            tolerated_diagnostic_source: Some("stylelint".to_string()),
            status_prefix: "JSCAD".to_string(),
            panel_title: "JSCAD: Preview".to_string(),
            view_type: "jscadEditor".to_string(),
            export: ExportToolConfig::default(),
            viewer: ViewerConfig::default(),
        }
    }
}

impl PreviewConfig {
    /// Default location of the settings file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jscadview").join("settings.json"))
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a file; every failure is an error
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents, path)
    }

    /// Load settings from `path` (or the default location), falling back to
    /// defaults when the file is missing or invalid
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "debounce_ms",
                reason: "quiet period must be at least 1ms".to_string(),
            });
        }
        if self.document_filter().extensions().is_empty() {
            return Err(ConfigError::Invalid {
                key: "extensions",
                reason: "at least one file extension is required".to_string(),
            });
        }
        if self.export.program.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "export.program",
                reason: "export program must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Quiet period as a duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Filter for previewable documents
    pub fn document_filter(&self) -> DocumentFilter {
        DocumentFilter::new(&self.extensions)
    }

    /// Diagnostic policy described by these settings
    pub fn diagnostic_policy(&self) -> ErrorSeverityPolicy {
        match &self.tolerated_diagnostic_source {
            Some(source) => ErrorSeverityPolicy::tolerating(source.clone()),
            None => ErrorSeverityPolicy::strict(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PreviewConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert!(config.document_filter().matches(&"a.jscad".into()));
        assert_eq!(config.diagnostic_policy().tolerated_source(), Some("stylelint"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config =
            PreviewConfig::from_json(r#"{ "debounce_ms": 250 }"#, Path::new("s.json")).unwrap();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.status_prefix, "JSCAD");
        assert_eq!(config.export.program, "openjscad");
    }

    #[test]
    fn test_null_disables_tolerated_source() {
        let config = PreviewConfig::from_json(
            r#"{ "tolerated_diagnostic_source": null }"#,
            Path::new("s.json"),
        )
        .unwrap();
        assert_eq!(config.diagnostic_policy(), ErrorSeverityPolicy::strict());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero = PreviewConfig::from_json(r#"{ "debounce_ms": 0 }"#, Path::new("s.json"));
        assert!(matches!(zero, Err(ConfigError::Invalid { key: "debounce_ms", .. })));

        let no_ext = PreviewConfig::from_json(r#"{ "extensions": [] }"#, Path::new("s.json"));
        assert!(matches!(no_ext, Err(ConfigError::Invalid { key: "extensions", .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result = PreviewConfig::from_json("{ nope", Path::new("s.json"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_export_args_substitution() {
        let tool = ExportToolConfig::default();
        assert_eq!(
            tool.args_for(Path::new("/m/gear.jscad")),
            vec!["/m/gear.jscad", "-of", "stl"]
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = PreviewConfig::load_or_default(Some(Path::new("/nonexistent/settings.json")));
        assert_eq!(config, PreviewConfig::default());
    }
}
