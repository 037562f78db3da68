/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Error types for the Herald gateway client.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across all Herald operations.

use thiserror::Error;

/// Result type alias using [`GatewayError`] as the error type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Top-level error type for all Herald operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Error while decoding an inbound frame.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error while encoding an outbound frame.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error from the underlying transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error from a REST collaborator (endpoint lookup, replies).
    #[error("http error: {0}")]
    Http(#[from] HttpError),
}

/// Errors that occur while decoding a gateway envelope.
///
/// Decode errors are scoped to a single frame and never end a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame is not valid JSON or does not match the envelope schema.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Envelope is valid but its payload does not match the opcode.
    #[error("invalid payload for op {op}: {reason}")]
    InvalidPayload {
        /// Opcode of the offending envelope.
        op: u8,
        /// Description of why the payload is invalid.
        reason: String,
    },

    /// Frame kind that carries no envelope (binary, ping, pong).
    #[error("unsupported frame: {0}")]
    UnsupportedFrame(String),
}

/// Errors that occur while encoding an outbound frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// Frame has no envelope representation.
    #[error("frame is not an envelope frame: {0}")]
    NotAnEnvelope(&'static str),
}

/// Errors in session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session is not in the correct state for the operation.
    #[error("invalid session state: expected {expected}, current {current}")]
    InvalidState {
        /// Expected state for the operation.
        expected: String,
        /// Current session state.
        current: String,
    },

    /// A second Identify was requested for the same session.
    #[error("identify already sent for this session")]
    DuplicateIdentify,

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors raised by a frame transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Writing a frame failed.
    #[error("write failed: {0}")]
    Write(String),

    /// Reading a frame failed.
    #[error("read failed: {0}")]
    Read(String),

    /// Transport is already closed.
    #[error("transport closed")]
    Closed,
}

/// Errors from REST collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Request could not be sent.
    #[error("request failed: {0}")]
    Request(String),

    /// Server answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// A URL could not be built or parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidEnvelope(err.to_string())
    }
}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
