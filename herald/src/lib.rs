/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # Herald
//!
//! A persistent real-time gateway client for chat bots.
//!
//! Herald keeps one WebSocket session to a chat gateway alive: it answers the
//! server's Hello with Identify, heartbeats at the cadence the server asks
//! for, routes user commands to a handler, and closes the connection cleanly
//! when asked to stop.
//!
//! ## Features
//!
//! - **Single event loop**: Inbound events, heartbeat ticks, and shutdown are
//!   serviced from one place, so writes never interleave
//! - **Server-paced heartbeats**: The interval comes from Hello, never a constant
//! - **Bounded close**: Shutdown sends one close frame and waits at most a second
//! - **Pluggable transport**: WebSocket in production, channels in tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! let config = SessionConfigBuilder::new()
//!     .token(std::env::var("HERALD_TOKEN")?)
//!     .command_prefix("go ")
//!     .build()?;
//!
//! let shutdown = CancellationToken::new();
//! let report = ClientBuilder::new(config)
//!     .with_handler(MyHandler)
//!     .run(shutdown.clone())
//!     .await?;
//! println!("session ended: {}", report.outcome);
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Error definitions, protocol constants, and payload model
//! - [`protocol`]: JSON envelope encoding and decoding
//! - [`transport`]: Frame transports (WebSocket and in-memory)
//! - [`session`]: Session state machine, heartbeat, reader, and controller
//! - [`engine`]: Gateway resolution, reply command, and client builder

pub mod core {
    //! Error definitions, protocol constants, and payload model.
    pub use herald_core::*;
}

pub mod protocol {
    //! JSON envelope encoding and decoding.
    pub use herald_protocol::*;
}

pub mod transport {
    //! Frame transports.
    pub use herald_transport::*;
}

pub mod session {
    //! Gateway session layer.
    pub use herald_session::*;
}

pub mod engine {
    //! High-level client facade.
    pub use herald_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use herald_core::{
        Author, ConnectionProperties, GatewayError, HttpError, InboundEvent, Intents,
        MessageCreate, Opcode, OutboundFrame, Result, Sequence, SessionError, TransportError,
    };

    // Protocol
    pub use herald_protocol::{Decoder, Encoder};

    // Transport
    pub use herald_transport::{FrameSink, FrameSource, WireFrame};

    // Session
    pub use herald_session::{
        CommandHandler, Credentials, NoOpHandler, SessionConfig, SessionConfigBuilder,
        SessionController, SessionOutcome, SessionReport, SessionStatus,
    };

    // Engine
    pub use herald_engine::{ClientBuilder, GatewayResolver, ReplyCommand};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _seq = Sequence::new(1);
        let _op = Opcode::HELLO;
        let config = SessionConfigBuilder::new().token("tok").build().unwrap();
        let builder = ClientBuilder::new(config);
        assert_eq!(builder.gateway_version(), 10);
    }

    #[tokio::test]
    async fn test_facade_memory_session() {
        let (sink, source, mut peer) = crate::transport::memory::pair();
        let config = SessionConfig::new(Credentials::new("tok"));
        let controller = SessionController::new(config, sink, source);
        let task = tokio::spawn(controller.run());

        peer.send_text(r#"{"op":10,"d":{"heartbeat_interval":45000}}"#);
        assert!(matches!(peer.recv().await, Some(WireFrame::Text(_))));
        peer.send_close(4000, "unknown error");

        let report = task.await.unwrap();
        assert!(report.outcome.is_connection_lost());
        assert_eq!(report.session.status(), SessionStatus::Closed);
    }
}
