//! Message protocol between the host and the rendering surface
//!
//! Both directions use the same envelope: a `command` tag plus a `data`
//! payload, encoded as JSON. Outbound messages are a closed enum serialized
//! directly. Inbound messages are decoded through a dispatch table keyed by
//! command tag; a tag without an entry is a protocol violation.
//!
//! ```text
//! host -> surface   setData       { data, fileName, viewport? }
//! host -> surface   setViewport   "top" | "front" | ...
//! surface -> host   initialized   (none)
//! surface -> host   status        string
//! surface -> host   alert         string
//! surface -> host   viewport      { angleX, ..., viewpointZ }
//! ```

use crate::viewport::{ViewportPreset, ViewportSettings};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while encoding or decoding surface messages
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The raw message was not a valid envelope
    #[error("Malformed message from preview surface: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The command tag has no registered handler
    #[error("Unknown command from preview surface: {0}")]
    UnknownCommand(String),

    /// The payload does not fit the command
    #[error("Invalid payload for '{command}': {reason}")]
    InvalidPayload { command: String, reason: String },

    /// An outbound message could not be encoded
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Payload of the outbound `setData` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDataPayload {
    /// Full script source to evaluate
    pub data: String,
    /// Identity of the document the source came from
    pub file_name: String,
    /// Camera to apply before rendering; absent means keep the viewer defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportSettings>,
}

/// Messages sent from the host to the surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "data", rename_all = "camelCase")]
pub enum HostMessage {
    /// Replace the rendered script
    SetData(SetDataPayload),
    /// Jump to a fixed viewing direction
    SetViewport(ViewportPreset),
}

impl HostMessage {
    /// The envelope's command tag
    pub fn command(&self) -> &'static str {
        match self {
            Self::SetData(_) => "setData",
            Self::SetViewport(_) => "setViewport",
        }
    }

    /// Encode as a JSON envelope
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

/// Messages posted by the surface to the host
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceMessage {
    /// The viewer application finished loading
    Initialized,
    /// Render pipeline phase, for the status indicator
    Status(String),
    /// Error text to show to the user
    Alert(String),
    /// Current camera of the viewer
    Viewport(ViewportSettings),
}

impl SurfaceMessage {
    /// The envelope's command tag
    pub fn command(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Status(_) => "status",
            Self::Alert(_) => "alert",
            Self::Viewport(_) => "viewport",
        }
    }

    /// Encode as a JSON envelope, the way the surface posts it
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let data = match self {
            Self::Initialized => Value::Null,
            Self::Status(text) | Self::Alert(text) => Value::String(text.clone()),
            Self::Viewport(settings) => {
                serde_json::to_value(settings).map_err(ProtocolError::Encode)?
            }
        };
        serde_json::to_string(&json!({ "command": self.command(), "data": data }))
            .map_err(ProtocolError::Encode)
    }
}

/// Raw inbound envelope
///
/// Older surface builds post their payload under `text` instead of `data`.
#[derive(Debug, Deserialize)]
struct Envelope {
    command: String,
    #[serde(default, alias = "text")]
    data: Value,
}

/// Converts an inbound payload into a typed message
pub type PayloadDecoder = fn(Value) -> Result<SurfaceMessage, ProtocolError>;

/// Dispatch table from inbound command tag to payload decoder
#[derive(Clone)]
pub struct InboundDecoder {
    table: HashMap<&'static str, PayloadDecoder>,
}

impl InboundDecoder {
    /// A decoder with no commands registered
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Register (or replace) the decoder for a command tag
    pub fn register(&mut self, command: &'static str, decoder: PayloadDecoder) -> &mut Self {
        self.table.insert(command, decoder);
        self
    }

    /// Whether a command tag has a decoder
    pub fn handles(&self, command: &str) -> bool {
        self.table.contains_key(command)
    }

    /// Decode a raw JSON envelope
    pub fn decode(&self, raw: &str) -> Result<SurfaceMessage, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(raw).map_err(ProtocolError::Malformed)?;
        match self.table.get(envelope.command.as_str()) {
            Some(decoder) => decoder(envelope.data),
            None => Err(ProtocolError::UnknownCommand(envelope.command)),
        }
    }
}

impl Default for InboundDecoder {
    /// The standard command set: `initialized`, `status`, `alert`, `viewport`
    fn default() -> Self {
        let mut decoder = Self::empty();
        decoder
            .register("initialized", |_| Ok(SurfaceMessage::Initialized))
            .register("status", |data| {
                text_payload("status", data).map(SurfaceMessage::Status)
            })
            .register("alert", |data| text_payload("alert", data).map(SurfaceMessage::Alert))
            .register("viewport", |data| {
                serde_json::from_value(data)
                    .map(SurfaceMessage::Viewport)
                    .map_err(|e| ProtocolError::InvalidPayload {
                        command: "viewport".to_string(),
                        reason: e.to_string(),
                    })
            });
        decoder
    }
}

/// Status and alert payloads are strings; a missing payload is an empty string
fn text_payload(command: &str, data: Value) -> Result<String, ProtocolError> {
    match data {
        Value::String(text) => Ok(text),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ProtocolError::InvalidPayload {
            command: command.to_string(),
            reason: format!("expected a string, got {}", other),
        }),
    }
}
