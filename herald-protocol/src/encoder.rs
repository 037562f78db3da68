/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Gateway envelope encoder.
//!
//! Turns an [`OutboundFrame`] into the JSON text of its envelope. Close frames
//! are not envelopes; they travel as transport-level close frames and are
//! rejected here.

use crate::envelope::Envelope;
use herald_core::error::EncodeError;
use herald_core::payload::OutboundFrame;
use herald_core::types::Opcode;
use serde_json::Value;

/// Gateway envelope encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder;

impl Encoder {
    /// Creates a new encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the envelope for an outbound frame.
    ///
    /// # Errors
    /// Returns `EncodeError::NotAnEnvelope` for close frames and
    /// `EncodeError::Serialize` if the payload cannot be serialized.
    pub fn envelope(&self, frame: &OutboundFrame) -> Result<Envelope, EncodeError> {
        match frame {
            OutboundFrame::Identify(identify) => Ok(Envelope::new(
                Opcode::IDENTIFY,
                serde_json::to_value(identify)?,
            )),
            OutboundFrame::Heartbeat { last_sequence } => {
                let d = match last_sequence {
                    Some(seq) => Value::from(seq.value()),
                    None => Value::Null,
                };
                Ok(Envelope::new(Opcode::HEARTBEAT, d))
            }
            OutboundFrame::Close { .. } => Err(EncodeError::NotAnEnvelope("close")),
        }
    }

    /// Encodes an outbound frame to envelope JSON text.
    ///
    /// # Errors
    /// See [`Encoder::envelope`].
    pub fn encode(&self, frame: &OutboundFrame) -> Result<String, EncodeError> {
        let envelope = self.envelope(frame)?;
        Ok(serde_json::to_string(&envelope)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::payload::{ConnectionProperties, Identify};
    use herald_core::types::{Intents, Sequence};

    #[test]
    fn test_encode_heartbeat_without_sequence() {
        let text = Encoder::new()
            .encode(&OutboundFrame::heartbeat(None))
            .unwrap();
        assert_eq!(text, r#"{"op":1,"d":null}"#);
    }

    #[test]
    fn test_encode_heartbeat_with_sequence() {
        let text = Encoder::new()
            .encode(&OutboundFrame::heartbeat(Some(Sequence::new(17))))
            .unwrap();
        assert_eq!(text, r#"{"op":1,"d":17}"#);
    }

    #[test]
    fn test_encode_identify() {
        let frame = OutboundFrame::Identify(Identify {
            token: "tok".to_string(),
            properties: ConnectionProperties {
                os: "linux".to_string(),
                browser: "herald".to_string(),
                device: "herald".to_string(),
            },
            intents: Intents::from_bits(512),
        });
        let text = Encoder::new().encode(&frame).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["op"], 2);
        assert_eq!(value["d"]["token"], "tok");
        assert_eq!(value["d"]["properties"]["os"], "linux");
        assert_eq!(value["d"]["intents"], 512);
    }

    #[test]
    fn test_encode_close_is_rejected() {
        let result = Encoder::new().encode(&OutboundFrame::normal_close());
        assert_eq!(result, Err(EncodeError::NotAnEnvelope("close")));
    }
}
