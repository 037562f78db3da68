/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Gateway envelope decoder.
//!
//! Parses the JSON text of a gateway frame into an [`InboundEvent`]. Only the
//! envelope is validated here; payload shapes are checked lazily by the typed
//! views on `InboundEvent`.

use crate::envelope::Envelope;
use herald_core::error::DecodeError;
use herald_core::payload::InboundEvent;

/// Default maximum frame size in bytes.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

/// Gateway envelope decoder.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    /// Maximum accepted frame size in bytes.
    max_frame_size: usize,
}

impl Decoder {
    /// Creates a decoder with the default frame size limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Sets the maximum frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// Returns the maximum frame size.
    #[must_use]
    pub const fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// Decodes one text frame.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidEnvelope` if the frame is oversized, not
    /// JSON, or lacks an opcode.
    pub fn decode(&self, text: &str) -> Result<InboundEvent, DecodeError> {
        if text.len() > self.max_frame_size {
            return Err(DecodeError::InvalidEnvelope(format!(
                "frame of {} bytes exceeds maximum {}",
                text.len(),
                self.max_frame_size
            )));
        }
        let envelope: Envelope = serde_json::from_str(text)?;
        Ok(envelope.into())
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use herald_core::payload::{ConnectionProperties, Identify, OutboundFrame};
    use herald_core::types::{Intents, Opcode, Sequence};
    use serde_json::json;

    #[test]
    fn test_decode_hello() {
        let event = Decoder::new()
            .decode(r#"{"op":10,"d":{"heartbeat_interval":41250},"s":null,"t":null}"#)
            .unwrap();
        assert_eq!(event.opcode, Opcode::HELLO);
        assert_eq!(event.hello().unwrap().heartbeat_interval, 41250);
        assert!(event.sequence.is_none());
    }

    #[test]
    fn test_decode_dispatch() {
        let event = Decoder::new()
            .decode(r#"{"op":0,"s":5,"t":"MESSAGE_CREATE","d":{"author":{"bot":false},"content":"go ping"}}"#)
            .unwrap();
        assert!(event.is_event("MESSAGE_CREATE"));
        assert_eq!(event.sequence, Some(Sequence::new(5)));
        assert_eq!(event.data["content"], "go ping");
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            Decoder::new().decode("not json"),
            Err(DecodeError::InvalidEnvelope(_))
        ));
        assert!(matches!(
            Decoder::new().decode(r#"{"d":{}}"#),
            Err(DecodeError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn test_decode_oversized() {
        let decoder = Decoder::new().with_max_frame_size(8);
        assert!(decoder.decode(r#"{"op":11,"d":null}"#).is_err());
    }

    #[test]
    fn test_outbound_survives_envelope_schema() {
        let identify = OutboundFrame::Identify(Identify {
            token: "tok".to_string(),
            properties: ConnectionProperties::default(),
            intents: Intents::default(),
        });
        let heartbeat = OutboundFrame::heartbeat(Some(Sequence::new(9)));

        for frame in [identify, heartbeat] {
            let encoder = Encoder::new();
            let text = encoder.encode(&frame).unwrap();
            let event = Decoder::new().decode(&text).unwrap();
            let envelope = encoder.envelope(&frame).unwrap();
            assert_eq!(Some(event.opcode), frame.opcode());
            assert_eq!(event.data, envelope.d);
        }
    }

    #[test]
    fn test_heartbeat_null_payload_survives() {
        let text = Encoder::new()
            .encode(&OutboundFrame::heartbeat(None))
            .unwrap();
        let event = Decoder::new().decode(&text).unwrap();
        assert_eq!(event.opcode, Opcode::HEARTBEAT);
        assert_eq!(event.data, json!(null));
    }
}
