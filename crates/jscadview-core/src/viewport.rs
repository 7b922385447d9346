//! Per-document camera state for the preview surface
//!
//! The rendering surface reports its camera as six numbers. The
//! [`ViewportStore`] remembers the last report for every document that was
//! previewed, so switching back to a document restores its view instead of
//! resetting to defaults.

use crate::error::{Error, Result};
use crate::document::DocumentId;
use crate::host::StateStorage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Camera settings of the rendering surface
///
/// All six fields are required when decoding, so a stored entry is either
/// complete or rejected as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSettings {
    /// Rotation around the X axis in degrees
    pub angle_x: f64,
    /// Rotation around the Y axis in degrees
    pub angle_y: f64,
    /// Rotation around the Z axis in degrees
    pub angle_z: f64,
    /// Viewpoint offset along X
    pub viewpoint_x: f64,
    /// Viewpoint offset along Y
    pub viewpoint_y: f64,
    /// Viewpoint offset along Z (camera distance)
    pub viewpoint_z: f64,
}

impl ViewportSettings {
    /// Build settings from angle and viewpoint triples
    pub fn new(angle: [f64; 3], viewpoint: [f64; 3]) -> Self {
        Self {
            angle_x: angle[0],
            angle_y: angle[1],
            angle_z: angle[2],
            viewpoint_x: viewpoint[0],
            viewpoint_y: viewpoint[1],
            viewpoint_z: viewpoint[2],
        }
    }

    /// Rotation angles as an `[x, y, z]` array
    pub fn angle(&self) -> [f64; 3] {
        [self.angle_x, self.angle_y, self.angle_z]
    }

    /// Viewpoint offsets as an `[x, y, z]` array
    pub fn viewpoint(&self) -> [f64; 3] {
        [self.viewpoint_x, self.viewpoint_y, self.viewpoint_z]
    }
}

/// Fixed viewing directions offered by the surface's toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportPreset {
    /// Reset to the viewer's default perspective
    #[default]
    Scene,
    /// Look down the Z axis
    Top,
    /// Look along the X axis
    Front,
    /// Opposite of front
    Back,
    /// Look along the Y axis
    Left,
    /// Opposite of left
    Right,
}

impl ViewportPreset {
    /// Distance of the camera for every preset
    const VIEWPOINT: [f64; 3] = [0.0, 0.0, 90.0];

    /// Camera settings for this preset
    ///
    /// `Scene` has no fixed angles; the surface resets its camera instead.
    pub fn settings(&self) -> Option<ViewportSettings> {
        let angle = match self {
            Self::Scene => return None,
            Self::Top => [0.0, 0.0, -90.0],
            Self::Front => [-90.0, 0.0, -90.0],
            Self::Back => [-90.0, 0.0, 90.0],
            Self::Left => [-90.0, 0.0, 0.0],
            Self::Right => [-90.0, 0.0, 180.0],
        };
        Some(ViewportSettings::new(angle, Self::VIEWPOINT))
    }

    /// Parse a preset from its (case-insensitive) name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scene" | "perspective" => Some(Self::Scene),
            "top" => Some(Self::Top),
            "front" => Some(Self::Front),
            "back" => Some(Self::Back),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Name used on the wire and in the surface markup
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Top => "top",
            Self::Front => "front",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Get all available preset names
    pub fn all_names() -> &'static [&'static str] {
        &["scene", "top", "front", "back", "left", "right"]
    }
}

impl std::str::FromStr for ViewportPreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "Unknown viewport preset '{}'. Valid options: {}",
                s,
                Self::all_names().join(", ")
            )
        })
    }
}

impl std::fmt::Display for ViewportPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mapping from document identity to its last captured camera settings
///
/// Entries are never evicted; the store only grows with the number of
/// distinct documents previewed in a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportStore {
    entries: HashMap<DocumentId, ViewportSettings>,
}

impl ViewportStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record settings for a document, replacing any earlier entry
    pub fn save(&mut self, document: DocumentId, settings: ViewportSettings) {
        self.entries.insert(document, settings);
    }

    /// Settings for a document, or `None` when the defaults should be used
    pub fn load(&self, document: &DocumentId) -> Option<ViewportSettings> {
        self.entries.get(document).copied()
    }

    /// Number of documents with stored settings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no settings are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode the whole mapping as a JSON object keyed by document identity
    pub fn to_value(&self) -> Result<Value> {
        let mut map = Map::with_capacity(self.entries.len());
        for (document, settings) in &self.entries {
            map.insert(document.to_string(), serde_json::to_value(settings)?);
        }
        Ok(Value::Object(map))
    }

    /// Decode a mapping previously produced by [`ViewportStore::to_value`]
    ///
    /// Individual entries that are not a complete six-number record are
    /// dropped with a warning; the rest of the mapping is kept.
    pub fn from_value(value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(Error::InvalidState(format!(
                    "expected an object of viewport settings, found {}",
                    json_kind(&other)
                )));
            }
        };

        let mut store = Self::new();
        for (key, entry) in map {
            match serde_json::from_value::<ViewportSettings>(entry) {
                Ok(settings) => store.save(DocumentId::new(key), settings),
                Err(e) => tracing::warn!("Dropping viewport settings for {}: {}", key, e),
            }
        }
        Ok(store)
    }

    /// Write the whole mapping to host storage
    pub fn persist(&self, storage: &dyn StateStorage) -> Result<()> {
        storage.save_state(self.to_value()?)
    }

    /// Read the mapping back from host storage (empty if nothing was stored)
    pub fn restore(storage: &dyn StateStorage) -> Result<Self> {
        match storage.load_state() {
            Some(value) => Self::from_value(value),
            None => Ok(Self::new()),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
