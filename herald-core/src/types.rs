/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Core types for gateway protocol operations.
//!
//! This module provides fundamental types used throughout the Herald client:
//! - [`Opcode`]: Small integer tagging the purpose of a frame
//! - [`Sequence`]: Dispatch sequence number echoed in heartbeats
//! - [`Intents`]: Gateway intents bitmask sent with Identify
//! - [`close_code`]: WebSocket close codes used by the session

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Gateway opcode.
///
/// Unknown opcodes are representable so that frames the session does not act
/// on still decode and are routed to `Ignore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Opcode(u8);

impl Opcode {
    /// Application event carrying a sequence number and event type.
    pub const DISPATCH: Self = Self(0);
    /// Keep-alive sent by the client.
    pub const HEARTBEAT: Self = Self(1);
    /// Handshake sent by the client after Hello.
    pub const IDENTIFY: Self = Self(2);
    /// Server asks the client to reconnect.
    pub const RECONNECT: Self = Self(7);
    /// Server rejected the session.
    pub const INVALID_SESSION: Self = Self(9);
    /// First server frame, announces the heartbeat interval.
    pub const HELLO: Self = Self(10);
    /// Server acknowledgement of a heartbeat.
    pub const HEARTBEAT_ACK: Self = Self(11);

    /// Creates an opcode from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw opcode value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns a human-readable name for known opcodes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "Dispatch",
            1 => "Heartbeat",
            2 => "Identify",
            7 => "Reconnect",
            9 => "InvalidSession",
            10 => "Hello",
            11 => "HeartbeatAck",
            _ => "Unknown",
        }
    }
}

impl From<u8> for Opcode {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

/// Dispatch sequence number.
///
/// Assigned by the server to every dispatch event and echoed back by the
/// client in its heartbeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Sequence(u64);

impl Sequence {
    /// Creates a new sequence number.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence number value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for Sequence {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Sequence> for u64 {
    fn from(seq: Sequence) -> Self {
        seq.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gateway intents bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Intents(u64);

impl Intents {
    /// Guild lifecycle events.
    pub const GUILDS: Self = Self(1 << 0);
    /// Messages posted in guild channels.
    pub const GUILD_MESSAGES: Self = Self(1 << 9);
    /// Messages posted in direct messages.
    pub const DIRECT_MESSAGES: Self = Self(1 << 12);
    /// Access to message content.
    pub const MESSAGE_CONTENT: Self = Self(1 << 15);

    /// Creates intents from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns true if every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for Intents {
    /// Intents needed to receive and read user commands.
    fn default() -> Self {
        Self::GUILD_MESSAGES | Self::DIRECT_MESSAGES | Self::MESSAGE_CONTENT
    }
}

impl BitOr for Intents {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// WebSocket close codes used by the session.
pub mod close_code {
    /// Normal closure.
    pub const NORMAL: u16 = 1000;
    /// Endpoint going away.
    pub const GOING_AWAY: u16 = 1001;
    /// No status code present in the close frame.
    pub const NO_STATUS: u16 = 1005;
}
