/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Inbound event routing.
//!
//! The dispatcher is pure: it maps an event to an [`Action`] and never touches
//! the transport. The controller executes the action.

use herald_core::payload::{InboundEvent, MessageCreate};
use herald_core::types::Opcode;

/// What the controller should do with an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Hello received, send Identify.
    PerformHandshake,
    /// Record a heartbeat acknowledgement.
    HeartbeatAck,
    /// Forward a user command to the command handler.
    HandleCommand(MessageCreate),
    /// Nothing beyond sequence bookkeeping.
    Ignore,
}

/// Routes inbound events to actions.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    prefixes: Vec<String>,
}

impl Dispatcher {
    /// Creates a dispatcher recognizing the given command prefixes.
    #[must_use]
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the recognized command prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Returns true if `content` starts with a recognized prefix.
    #[must_use]
    pub fn is_command(&self, content: &str) -> bool {
        self.prefixes.iter().any(|p| content.starts_with(p.as_str()))
    }

    /// Routes one event. Rules are checked in order.
    #[must_use]
    pub fn route(&self, event: &InboundEvent) -> Action {
        if event.opcode == Opcode::HELLO {
            return Action::PerformHandshake;
        }
        if event.opcode == Opcode::HEARTBEAT_ACK {
            return Action::HeartbeatAck;
        }
        match event.message_create() {
            Some(message) if !message.author.bot && self.is_command(&message.content) => {
                Action::HandleCommand(message)
            }
            _ => Action::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::payload::MESSAGE_CREATE;
    use serde_json::json;

    fn message(bot: bool, content: &str) -> InboundEvent {
        InboundEvent::dispatch(
            3,
            MESSAGE_CREATE,
            json!({
                "channel_id": "42",
                "author": {"id": "7", "username": "ann", "bot": bot},
                "content": content
            }),
        )
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(["go "])
    }

    #[test]
    fn test_route_hello() {
        let event = InboundEvent::new(Opcode::HELLO, json!({"heartbeat_interval": 1}));
        assert_eq!(dispatcher().route(&event), Action::PerformHandshake);
    }

    #[test]
    fn test_route_heartbeat_ack() {
        let event = InboundEvent::new(Opcode::HEARTBEAT_ACK, json!(null));
        assert_eq!(dispatcher().route(&event), Action::HeartbeatAck);
    }

    #[test]
    fn test_route_user_command() {
        match dispatcher().route(&message(false, "go ping")) {
            Action::HandleCommand(msg) => {
                assert_eq!(msg.content, "go ping");
                assert_eq!(msg.channel_id, "42");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_route_bot_command_ignored() {
        assert_eq!(dispatcher().route(&message(true, "go ping")), Action::Ignore);
    }

    #[test]
    fn test_route_non_command_ignored() {
        assert_eq!(dispatcher().route(&message(false, "gopher")), Action::Ignore);
        assert_eq!(dispatcher().route(&message(false, "hello")), Action::Ignore);
    }

    #[test]
    fn test_route_other_dispatch_ignored() {
        let event = InboundEvent::dispatch(1, "READY", json!({"content": "go ping"}));
        assert_eq!(dispatcher().route(&event), Action::Ignore);
    }

    #[test]
    fn test_route_malformed_message_ignored() {
        let event = InboundEvent::dispatch(1, MESSAGE_CREATE, json!({"content": "go ping"}));
        assert_eq!(dispatcher().route(&event), Action::Ignore);
    }

    #[test]
    fn test_multiple_prefixes() {
        let dispatcher = Dispatcher::new(["go ", "!"]);
        assert!(dispatcher.is_command("!ping"));
        assert!(dispatcher.is_command("go ping"));
        assert!(!dispatcher.is_command("ping"));
        assert_eq!(dispatcher.prefixes().len(), 2);
    }
}
