//! Document identity and the file-type filter for previewable documents

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Identity of an open source document (usually its file path)
///
/// Used as the key into the viewport cache, so two documents with the same
/// identity share camera state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create an identity from any path or name
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path component, used for display in the panel title
    pub fn display_name(&self) -> &str {
        Path::new(&self.0)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.0)
    }

    /// File extension without the leading dot, if any
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.0).extension().and_then(|e| e.to_str())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&Path> for DocumentId {
    fn from(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Decides which documents are previewable, by file extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    extensions: Vec<String>,
}

impl DocumentFilter {
    /// Create a filter accepting the given extensions (with or without a leading dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Whether the document's name matches one of the accepted extensions
    pub fn matches(&self, document: &DocumentId) -> bool {
        document.extension().is_some_and(|ext| {
            self.extensions
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
    }

    /// Accepted extensions, lowercased and without dots
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self::new(["jscad"])
    }
}
