//! Wire types for runtime ⇄ host messages.
//!
//! This module defines:
//! - Outbound events (runtime → host)
//! - Inbound commands (host → runtime)
//! - The untyped [`Envelope`] every inbound message passes through first
//!
//! Both directions are one JSON object per message, tagged by `type`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// Message from the runtime to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// The view rotation changed (radians).
    #[serde(rename = "WEBVIEW_MAP_ROTATE")]
    MapRotate { rotation: f64 },

    /// A local fault the host should know about.
    #[serde(rename = "WEBVIEW_ERROR")]
    Error { message: String },

    /// The map surface was created.
    #[serde(rename = "WEBVIEW_MAP_READY")]
    MapReady { center: [f64; 2], zoom: f64 },
}

impl OutboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::MapRotate { .. } => "WEBVIEW_MAP_ROTATE",
            OutboundMessage::Error { .. } => "WEBVIEW_ERROR",
            OutboundMessage::MapReady { .. } => "WEBVIEW_MAP_READY",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        OutboundMessage::Error {
            message: message.into(),
        }
    }
}

/// Command from the host to the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundCommand {
    /// Replace the base layers. Entries are provider names or tile URLs.
    SwitchBaseLayers { layers: Vec<String> },

    /// Move the view, optionally changing zoom.
    Recenter {
        center: [f64; 2],
        #[serde(default)]
        zoom: Option<f64>,
    },

    /// Point the view north again.
    ResetRotation,
}

impl InboundCommand {
    pub const KINDS: [&'static str; 3] = ["SWITCH_BASE_LAYERS", "RECENTER", "RESET_ROTATION"];

    /// Decode a typed envelope into a command.
    ///
    /// Returns `Ok(None)` for a `type` this runtime does not know; those are
    /// dropped rather than reported.
    pub fn from_envelope(envelope: &Envelope) -> Result<Option<Self>, BridgeError> {
        if !Self::KINDS.contains(&envelope.kind()) {
            return Ok(None);
        }
        serde_json::from_value(envelope.value().clone())
            .map(Some)
            .map_err(|e| BridgeError::InvalidPayload {
                kind: envelope.kind().to_string(),
                reason: e.to_string(),
            })
    }
}

/// A parsed inbound JSON object known to carry a non-empty string `type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    kind: String,
    value: Value,
}

impl Envelope {
    /// Wrap `value` if it is truthy and typed; otherwise `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        if is_falsy(&value) {
            return None;
        }
        let kind = match value.get("type") {
            Some(Value::String(kind)) if !kind.is_empty() => kind.clone(),
            _ => return None,
        };
        Some(Self { kind, value })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The whole message, including `type`.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn outbound_messages_use_wire_names() {
        let rotate = serde_json::to_value(OutboundMessage::MapRotate { rotation: 1.5 }).unwrap();
        assert_eq!(rotate, json!({"type": "WEBVIEW_MAP_ROTATE", "rotation": 1.5}));

        let err = serde_json::to_value(OutboundMessage::error("bad")).unwrap();
        assert_eq!(err, json!({"type": "WEBVIEW_ERROR", "message": "bad"}));

        let ready = OutboundMessage::MapReady {
            center: [116.0, 39.0],
            zoom: 12.0,
        };
        assert_eq!(serde_json::to_value(&ready).unwrap()["type"], json!(ready.kind()));
    }

    #[test]
    fn envelope_requires_truthy_typed_value() {
        assert!(Envelope::from_value(json!(null)).is_none());
        assert!(Envelope::from_value(json!(false)).is_none());
        assert!(Envelope::from_value(json!(0)).is_none());
        assert!(Envelope::from_value(json!({})).is_none());
        assert!(Envelope::from_value(json!({"type": ""})).is_none());
        assert!(Envelope::from_value(json!({"type": 7})).is_none());
        assert!(Envelope::from_value(json!([1, 2])).is_none());

        let env = Envelope::from_value(json!({"type": "PING", "seq": 1})).unwrap();
        assert_eq!(env.kind(), "PING");
        assert_eq!(env.value()["seq"], json!(1));
    }

    #[test]
    fn decodes_known_commands() {
        let env = Envelope::from_value(json!({
            "type": "SWITCH_BASE_LAYERS",
            "layers": ["tdSatellite", "tdSatelliteLabel"]
        }))
        .unwrap();
        assert_eq!(
            InboundCommand::from_envelope(&env).unwrap(),
            Some(InboundCommand::SwitchBaseLayers {
                layers: vec!["tdSatellite".into(), "tdSatelliteLabel".into()]
            })
        );

        let env = Envelope::from_value(json!({"type": "RECENTER", "center": [1.0, 2.0]})).unwrap();
        assert_eq!(
            InboundCommand::from_envelope(&env).unwrap(),
            Some(InboundCommand::Recenter {
                center: [1.0, 2.0],
                zoom: None
            })
        );

        let env = Envelope::from_value(json!({"type": "RESET_ROTATION"})).unwrap();
        assert_eq!(
            InboundCommand::from_envelope(&env).unwrap(),
            Some(InboundCommand::ResetRotation)
        );
    }

    #[test]
    fn unknown_kind_is_dropped_not_an_error() {
        let env = Envelope::from_value(json!({"type": "OPEN_DRAWER"})).unwrap();
        assert_eq!(InboundCommand::from_envelope(&env), Ok(None));
    }

    #[test]
    fn known_kind_with_bad_payload_is_an_error() {
        let env = Envelope::from_value(json!({"type": "SWITCH_BASE_LAYERS", "layers": 3})).unwrap();
        let err = InboundCommand::from_envelope(&env).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidPayload { ref kind, .. } if kind == "SWITCH_BASE_LAYERS"));
    }
}
