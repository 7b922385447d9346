//! jscadview authoring - editing aids for modeling scripts
//!
//! Both aids are stateless and independent of the preview pipeline:
//!
//! - [`CompletionProvider`]: the built-in API catalogue and signature help
//! - [`import_polygon`]: turn the first `<polygon>` of an SVG file into a
//!   `polygon([...])` snippet

pub mod completion;
pub mod error;
pub mod svg;

pub use completion::{
    CompletionItem, CompletionKind, CompletionProvider, ParameterInfo, SignatureInfo,
};
pub use error::{ImportError, Result};
pub use svg::{SvgElement, import_polygon, parse_points, polygon_snippet, polygon_snippet_from_svg};
