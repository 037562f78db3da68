/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # Herald Session
//!
//! Gateway session layer for the Herald client.
//!
//! This crate provides:
//! - **State machine**: Session status and handshake transitions
//! - **Sequence tracking**: Monotonic last-seen dispatch sequence
//! - **Heartbeat scheduling**: Server-paced keep-alive timer
//! - **Dispatcher**: Pure routing of inbound events to actions
//! - **Event reader**: Background task feeding decoded events to the controller
//! - **Controller**: The merged event loop, including graceful shutdown
//! - **Configuration**: Session configuration options

pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod handler;
pub mod heartbeat;
pub mod reader;
pub mod sequence;
pub mod state;

pub use config::{Credentials, SessionConfig, SessionConfigBuilder};
pub use controller::{SessionController, SessionOutcome, SessionReport};
pub use dispatcher::{Action, Dispatcher};
pub use handler::{CommandHandler, NoOpHandler};
pub use heartbeat::HeartbeatScheduler;
pub use reader::{EventReader, ReaderExit};
pub use sequence::SequenceTracker;
pub use state::{Session, SessionStatus};
