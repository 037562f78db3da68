/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # Herald Core
//!
//! Core types, payload model, and error definitions for the Herald gateway client.
//!
//! This crate provides the fundamental building blocks used across all Herald crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Protocol types**: `Opcode`, `Sequence`, `Intents`, close codes
//! - **Payload model**: `InboundEvent`, `OutboundFrame`, `MessageCreate`, `Hello`

pub mod error;
pub mod payload;
pub mod types;

pub use error::{
    DecodeError, EncodeError, GatewayError, HttpError, Result, SessionError, TransportError,
};
pub use payload::{
    Author, ConnectionProperties, Hello, Identify, InboundEvent, MessageCreate, OutboundFrame,
    MESSAGE_CREATE, READY,
};
pub use types::{Intents, Opcode, Sequence, close_code};
