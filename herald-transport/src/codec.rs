/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Codec between protocol frames and wire frames.
//!
//! Envelope frames travel as text; the close frame maps onto the transport's
//! own close frame.

use crate::frame::{CloseInfo, WireFrame};
use herald_core::error::{DecodeError, EncodeError};
use herald_core::payload::{InboundEvent, OutboundFrame};
use herald_protocol::{Decoder, Encoder};

/// Converts [`OutboundFrame`] to [`WireFrame`] and back to [`InboundEvent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec {
    encoder: Encoder,
    decoder: Decoder,
}

impl FrameCodec {
    /// Creates a codec with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            encoder: Encoder::new(),
            decoder: Decoder::new(),
        }
    }

    /// Sets the maximum inbound frame size.
    #[must_use]
    pub const fn with_max_frame_size(mut self, size: usize) -> Self {
        self.decoder = self.decoder.with_max_frame_size(size);
        self
    }

    /// Encodes an outbound frame.
    ///
    /// # Errors
    /// Returns `EncodeError` if the envelope cannot be serialized.
    pub fn encode(&self, frame: &OutboundFrame) -> Result<WireFrame, EncodeError> {
        match frame {
            OutboundFrame::Close { code, reason } => {
                Ok(WireFrame::Close(Some(CloseInfo::new(*code, reason.clone()))))
            }
            other => self.encoder.encode(other).map(WireFrame::Text),
        }
    }

    /// Decodes a data frame.
    ///
    /// # Errors
    /// Returns `DecodeError::UnsupportedFrame` for binary and close frames and
    /// `DecodeError::InvalidEnvelope` for malformed text.
    pub fn decode(&self, frame: &WireFrame) -> Result<InboundEvent, DecodeError> {
        match frame {
            WireFrame::Text(text) => self.decoder.decode(text),
            other => Err(DecodeError::UnsupportedFrame(other.kind().to_string())),
        }
    }
}
