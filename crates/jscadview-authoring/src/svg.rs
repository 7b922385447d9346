//! Import SVG polygons as script snippets
//!
//! The file is parsed into a small element tree, the first element with the
//! requested tag is found depth-first, and its `points` list becomes a
//! `polygon([...])` call with a tab stop on the variable name.

use crate::error::{ImportError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;

/// An SVG element with its attributes and children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SvgElement {
    /// Local tag name (namespace prefix removed)
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<SvgElement>,
}

impl SvgElement {
    /// Parse a document and return its root element
    pub fn parse(source: &str) -> Result<Self> {
        let mut reader = Reader::from_str(source);
        reader.trim_text(true);

        // The bottom of the stack is a synthetic document node
        let mut stack = vec![SvgElement::default()];

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from(&start)?),
                Event::Empty(start) => {
                    let element = element_from(&start)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(element);
                    }
                }
                Event::End(_) => {
                    if stack.len() > 1
                        && let Some(done) = stack.pop()
                        && let Some(parent) = stack.last_mut()
                    {
                        parent.children.push(done);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        // Close anything left open by a truncated file
        while stack.len() > 1 {
            if let Some(done) = stack.pop()
                && let Some(parent) = stack.last_mut()
            {
                parent.children.push(done);
            }
        }

        let document = stack.pop().unwrap_or_default();
        document
            .children
            .into_iter()
            .next()
            .ok_or_else(|| ImportError::ElementNotFound("svg".to_string()))
    }

    /// Value of an attribute, if present
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First element named `tag` in depth-first order, including `self`
    pub fn find_first(&self, tag: &str) -> Option<&SvgElement> {
        if self.name == tag {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_first(tag))
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<SvgElement> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(SvgElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Convert an SVG `points` list into coordinate pairs
///
/// Coordinates may be separated by whitespace, commas or both. The list must
/// hold an even number of coordinates forming an even number of points.
pub fn parse_points(points: &str) -> Result<Vec<[f64; 2]>> {
    let values = points
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| ImportError::InvalidNumber(token.to_string()))
        })
        .collect::<Result<Vec<f64>>>()?;

    if values.is_empty() {
        return Err(ImportError::EmptyPoints);
    }
    if values.len() % 2 != 0 {
        return Err(ImportError::OddCoordinateCount(values.len()));
    }

    let pairs: Vec<[f64; 2]> = values.chunks_exact(2).map(|pair| [pair[0], pair[1]]).collect();
    if pairs.len() % 2 != 0 {
        return Err(ImportError::OddPointCount(pairs.len()));
    }
    Ok(pairs)
}

/// Render coordinate pairs as a polygon snippet
///
/// `${1:poly}` is the variable name tab stop and `$0` the final cursor.
pub fn polygon_snippet(points: &[[f64; 2]]) -> String {
    let rows = points
        .iter()
        .map(|[x, y]| format!("\t[{}, {}]", x, y))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("let ${{1:poly}} = polygon([\n{}\n]);$0", rows)
}

/// Snippet for the first `<polygon>` in an SVG document
pub fn polygon_snippet_from_svg(source: &str) -> Result<String> {
    let root = SvgElement::parse(source)?;
    let polygon = root
        .find_first("polygon")
        .ok_or_else(|| ImportError::ElementNotFound("polygon".to_string()))?;
    let points = polygon
        .attribute("points")
        .ok_or_else(|| ImportError::MissingAttribute {
            element: "polygon".to_string(),
            attribute: "points".to_string(),
        })?;

    let pairs = parse_points(points)?;
    tracing::debug!("Imported polygon with {} points", pairs.len());
    Ok(polygon_snippet(&pairs))
}

/// Read an SVG file and build a snippet for its first `<polygon>`
pub fn import_polygon(path: &Path) -> Result<String> {
    let source = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    polygon_snippet_from_svg(&source)
}
