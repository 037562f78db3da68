/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Wire schema of a gateway frame.

use herald_core::payload::InboundEvent;
use herald_core::types::{Opcode, Sequence};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw gateway envelope as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Opcode.
    pub op: Opcode,
    /// Payload. Missing and `null` are treated the same.
    #[serde(default)]
    pub d: Value,
    /// Sequence number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<Sequence>,
    /// Event type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl Envelope {
    /// Creates an envelope without sequence or event type.
    #[must_use]
    pub fn new(op: Opcode, d: Value) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }
}

impl From<Envelope> for InboundEvent {
    fn from(envelope: Envelope) -> Self {
        Self {
            opcode: envelope.op,
            sequence: envelope.s,
            event_type: envelope.t,
            data: envelope.d,
        }
    }
}

impl From<InboundEvent> for Envelope {
    fn from(event: InboundEvent) -> Self {
        Self {
            op: event.opcode,
            d: event.data,
            s: event.sequence,
            t: event.event_type,
        }
    }
}
