/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # Herald Engine
//!
//! High-level gateway client facade for the Herald gateway client.
//!
//! This crate provides:
//! - **Gateway resolution**: One-shot REST lookup of the gateway URL
//! - **Reply command**: A command handler that answers in the originating channel
//! - **Builder API**: Fluent configuration that resolves, connects, and runs a session

pub mod builder;
pub mod command;
pub mod http;
pub mod resolver;

pub use builder::ClientBuilder;
pub use command::{DEFAULT_REPLY, ReplyCommand};
pub use herald_session::handler::{CommandHandler, NoOpHandler};
pub use http::{DEFAULT_API_BASE, USER_AGENT};
pub use resolver::{GatewayEndpoint, GatewayResolver, SessionStartLimit};
