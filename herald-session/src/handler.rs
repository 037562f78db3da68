/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Command handler callback interface.

use async_trait::async_trait;
use herald_core::payload::MessageCreate;

/// Receives user commands recognized by the dispatcher.
///
/// The controller runs each call on its own task so a slow handler never
/// delays heartbeats. Handlers report their own failures; the session ignores
/// the outcome.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Called for each recognized command message.
    ///
    /// # Arguments
    /// * `message` - The decoded message payload
    async fn on_command(&self, message: MessageCreate);
}

/// Default no-op handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

#[async_trait]
impl CommandHandler for NoOpHandler {
    async fn on_command(&self, _message: MessageCreate) {}
}
