/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Gateway payload model.
//!
//! Inbound frames are decoded into an [`InboundEvent`] whose `data` stays an
//! untyped JSON value until a consumer asks for a typed view ([`Hello`],
//! [`MessageCreate`]). Outbound frames are built fresh per send as an
//! [`OutboundFrame`].

use crate::error::DecodeError;
use crate::types::{Intents, Opcode, Sequence, close_code};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type of a newly created message.
pub const MESSAGE_CREATE: &str = "MESSAGE_CREATE";

/// Event type that completes the handshake.
pub const READY: &str = "READY";

/// A decoded inbound gateway frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    /// Frame opcode.
    pub opcode: Opcode,
    /// Sequence number, present on dispatch events.
    pub sequence: Option<Sequence>,
    /// Event type, present on dispatch events.
    pub event_type: Option<String>,
    /// Raw payload.
    pub data: Value,
}

impl InboundEvent {
    /// Creates a new inbound event.
    #[must_use]
    pub fn new(opcode: Opcode, data: Value) -> Self {
        Self {
            opcode,
            sequence: None,
            event_type: None,
            data,
        }
    }

    /// Creates a dispatch event with its sequence number and type.
    #[must_use]
    pub fn dispatch(sequence: u64, event_type: impl Into<String>, data: Value) -> Self {
        Self {
            opcode: Opcode::DISPATCH,
            sequence: Some(Sequence::new(sequence)),
            event_type: Some(event_type.into()),
            data,
        }
    }

    /// Returns true for opcode 0 frames.
    #[inline]
    #[must_use]
    pub fn is_dispatch(&self) -> bool {
        self.opcode == Opcode::DISPATCH
    }

    /// Returns true if this is a dispatch of the given event type.
    #[must_use]
    pub fn is_event(&self, event_type: &str) -> bool {
        self.is_dispatch() && self.event_type.as_deref() == Some(event_type)
    }

    /// Parses the payload as a Hello.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidPayload` if the payload lacks a usable
    /// heartbeat interval.
    pub fn hello(&self) -> Result<Hello, DecodeError> {
        let hello: Hello =
            serde_json::from_value(self.data.clone()).map_err(|e| DecodeError::InvalidPayload {
                op: self.opcode.value(),
                reason: e.to_string(),
            })?;
        if hello.heartbeat_interval == 0 {
            return Err(DecodeError::InvalidPayload {
                op: self.opcode.value(),
                reason: "heartbeat_interval must be positive".to_string(),
            });
        }
        Ok(hello)
    }

    /// Parses the payload as a created message.
    ///
    /// Returns `None` if this is not a `MESSAGE_CREATE` dispatch or the payload
    /// does not have the message shape.
    #[must_use]
    pub fn message_create(&self) -> Option<MessageCreate> {
        if !self.is_event(MESSAGE_CREATE) {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }
}

/// Payload of the Hello frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    /// Server-mandated heartbeat cadence in milliseconds.
    pub heartbeat_interval: u64,
}

/// Message author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// User snowflake.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub username: String,
    /// Legacy discriminator.
    #[serde(default)]
    pub discriminator: Option<String>,
    /// Whether the author is a bot account.
    #[serde(default)]
    pub bot: bool,
    /// Avatar hash.
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Payload of a `MESSAGE_CREATE` dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreate {
    /// Message snowflake.
    #[serde(default)]
    pub id: String,
    /// Channel the message was posted in.
    #[serde(default)]
    pub channel_id: String,
    /// Guild the message was posted in, if any.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Message author.
    pub author: Author,
    /// Message text.
    #[serde(default)]
    pub content: String,
}

/// Client properties sent with Identify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProperties {
    /// Operating system.
    pub os: String,
    /// Library name.
    pub browser: String,
    /// Library name.
    pub device: String,
}

impl Default for ConnectionProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "herald".to_string(),
            device: "herald".to_string(),
        }
    }
}

/// Payload of the Identify frame.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identify {
    /// Authentication token.
    pub token: String,
    /// Client properties.
    pub properties: ConnectionProperties,
    /// Requested intents.
    pub intents: Intents,
}

impl std::fmt::Debug for Identify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identify")
            .field("token", &"<redacted>")
            .field("properties", &self.properties)
            .field("intents", &self.intents)
            .finish()
    }
}

/// A frame the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Opcode 2 handshake.
    Identify(Identify),
    /// Opcode 1 keep-alive echoing the last seen sequence.
    Heartbeat {
        /// Last observed dispatch sequence, `None` before the first dispatch.
        last_sequence: Option<Sequence>,
    },
    /// WebSocket close frame.
    Close {
        /// Close code.
        code: u16,
        /// Close reason.
        reason: String,
    },
}

impl OutboundFrame {
    /// Creates a heartbeat frame.
    #[must_use]
    pub const fn heartbeat(last_sequence: Option<Sequence>) -> Self {
        Self::Heartbeat { last_sequence }
    }

    /// Creates a normal-closure close frame with an empty reason.
    #[must_use]
    pub const fn normal_close() -> Self {
        Self::Close {
            code: close_code::NORMAL,
            reason: String::new(),
        }
    }

    /// Returns the envelope opcode, `None` for close frames.
    #[must_use]
    pub const fn opcode(&self) -> Option<Opcode> {
        match self {
            Self::Identify(_) => Some(Opcode::IDENTIFY),
            Self::Heartbeat { .. } => Some(Opcode::HEARTBEAT),
            Self::Close { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hello_payload() {
        let event = InboundEvent::new(Opcode::HELLO, json!({"heartbeat_interval": 41250}));
        assert_eq!(event.hello().unwrap().heartbeat_interval, 41250);
    }

    #[test]
    fn test_hello_rejects_missing_interval() {
        let event = InboundEvent::new(Opcode::HELLO, json!({}));
        assert!(matches!(
            event.hello(),
            Err(DecodeError::InvalidPayload { op: 10, .. })
        ));
    }

    #[test]
    fn test_hello_rejects_zero_interval() {
        let event = InboundEvent::new(Opcode::HELLO, json!({"heartbeat_interval": 0}));
        assert!(event.hello().is_err());
    }

    #[test]
    fn test_message_create_view() {
        let event = InboundEvent::dispatch(
            4,
            MESSAGE_CREATE,
            json!({
                "id": "1",
                "channel_id": "305512054478077952",
                "author": {"id": "2", "username": "ann", "bot": false},
                "content": "go ping"
            }),
        );
        let message = event.message_create().unwrap();
        assert_eq!(message.channel_id, "305512054478077952");
        assert_eq!(message.content, "go ping");
        assert!(!message.author.bot);
    }

    #[test]
    fn test_message_create_wrong_type() {
        let event = InboundEvent::dispatch(4, READY, json!({"author": {}}));
        assert!(event.message_create().is_none());
    }

    #[test]
    fn test_identify_debug_redacts_token() {
        let identify = Identify {
            token: "secret".to_string(),
            properties: ConnectionProperties::default(),
            intents: Intents::default(),
        };
        let debug = format!("{:?}", identify);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_outbound_opcodes() {
        assert_eq!(
            OutboundFrame::heartbeat(None).opcode(),
            Some(Opcode::HEARTBEAT)
        );
        assert_eq!(OutboundFrame::normal_close().opcode(), None);
    }
}
