/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # Herald Transport
//!
//! Frame transport layer for the Herald gateway client.
//!
//! This crate provides:
//! - **Frame traits**: `FrameSink` and `FrameSource`, the two halves of a
//!   full-duplex message-oriented connection
//! - **Codec**: Conversion between protocol frames and wire frames
//! - **WebSocket transport**: `tokio-tungstenite` client over TLS
//! - **Memory transport**: Channel-backed pair for local wiring and tests

pub mod codec;
pub mod frame;
pub mod memory;
pub mod websocket;

pub use codec::FrameCodec;
pub use frame::{CloseInfo, FrameSink, FrameSource, WireFrame};
pub use memory::{MemoryPeer, MemorySink, MemorySource};
pub use websocket::{WsSink, WsSource};
