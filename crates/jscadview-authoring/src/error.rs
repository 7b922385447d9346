//! Error types for authoring aids

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while importing geometry from an SVG file
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid SVG: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("No <{0}> element found in SVG")]
    ElementNotFound(String),

    #[error("<{element}> element has no '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    #[error("Invalid number '{0}' in points list")]
    InvalidNumber(String),

    #[error("Points list has an odd number of coordinates ({0})")]
    OddCoordinateCount(usize),

    #[error("Points list has an odd number of points ({0})")]
    OddPointCount(usize),

    #[error("Points list is empty")]
    EmptyPoints,
}

/// Result type for authoring operations
pub type Result<T> = std::result::Result<T, ImportError>;
