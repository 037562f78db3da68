/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Wire frames and the transport traits.
//!
//! A transport is split into a [`FrameSink`] owned by the session controller
//! (the only writer) and a [`FrameSource`] owned by the event reader.

use async_trait::async_trait;
use herald_core::error::TransportError;

/// Payload of a close frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code.
    pub code: u16,
    /// Close reason.
    pub reason: String,
}

impl CloseInfo {
    /// Creates close frame payload.
    #[must_use]
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// A transport-level frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFrame {
    /// UTF-8 text frame carrying one envelope.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
    /// Close frame, payload optional.
    Close(Option<CloseInfo>),
}

impl WireFrame {
    /// Returns a short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
            Self::Close(_) => "close",
        }
    }
}

/// Write half of a transport.
#[async_trait]
pub trait FrameSink: Send {
    /// Sends one frame.
    ///
    /// # Errors
    /// Returns `TransportError` if the frame cannot be written. The connection
    /// should be considered unusable afterwards.
    async fn send(&mut self, frame: WireFrame) -> Result<(), TransportError>;

    /// Releases the write half.
    ///
    /// # Errors
    /// Returns `TransportError` if the underlying connection fails to close.
    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Read half of a transport.
#[async_trait]
pub trait FrameSource: Send {
    /// Receives the next frame.
    ///
    /// Returns `Ok(None)` when the stream ended cleanly.
    ///
    /// # Errors
    /// Returns `TransportError` on read failure.
    async fn recv(&mut self) -> Result<Option<WireFrame>, TransportError>;
}
