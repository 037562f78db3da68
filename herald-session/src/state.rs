/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session state machine.
//!
//! [`Session`] is the single owner of session state. It performs no I/O: each
//! transition returns the frame the controller has to send, if any.
//!
//! ```text
//! Connecting -> AwaitingHello -> Identifying -> Ready
//!      \             \               \           \
//!       +-------------+---------------+-----------+--> Closing -> Closed
//! ```
//!
//! Any state may also jump straight to `Closed` when the transport fails.

use crate::config::{Credentials, SessionConfig};
use crate::sequence::SequenceTracker;
use herald_core::error::SessionError;
use herald_core::payload::{Hello, Identify, InboundEvent, OutboundFrame, READY};
use herald_core::types::Sequence;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Transport not yet established.
    Connecting,
    /// Transport up, waiting for Hello.
    AwaitingHello,
    /// Identify sent, waiting for Ready.
    Identifying,
    /// Handshake complete.
    Ready,
    /// Close frame sent, waiting for acknowledgement.
    Closing,
    /// Terminal.
    Closed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "Connecting",
            Self::AwaitingHello => "AwaitingHello",
            Self::Identifying => "Identifying",
            Self::Ready => "Ready",
            Self::Closing => "Closing",
            Self::Closed => "Closed",
        };
        f.write_str(name)
    }
}

/// A gateway session.
#[derive(Debug, Clone)]
pub struct Session {
    status: SessionStatus,
    sequence: SequenceTracker,
    heartbeat_interval: Option<Duration>,
    credentials: Credentials,
    identify_sent: bool,
}

impl Session {
    /// Creates a session in the `Connecting` state.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            status: SessionStatus::Connecting,
            sequence: SequenceTracker::new(),
            heartbeat_interval: None,
            credentials,
            identify_sent: false,
        }
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the last observed dispatch sequence.
    #[must_use]
    pub const fn last_sequence(&self) -> Option<Sequence> {
        self.sequence.last()
    }

    /// Returns the server-mandated heartbeat interval, once known.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_interval
    }

    /// Returns true once Identify has been produced.
    #[must_use]
    pub const fn identify_sent(&self) -> bool {
        self.identify_sent
    }

    /// Returns true in the `Ready` state.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready
    }

    /// Returns true in the `Closed` state.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == SessionStatus::Closed
    }

    fn transition(&mut self, to: SessionStatus) {
        debug!(from = %self.status, to = %to, "session transition");
        self.status = to;
    }

    fn invalid_state(&self, expected: SessionStatus) -> SessionError {
        SessionError::InvalidState {
            expected: expected.to_string(),
            current: self.status.to_string(),
        }
    }

    /// Marks the transport as established.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidState` unless the session is `Connecting`.
    pub fn on_connected(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Connecting {
            return Err(self.invalid_state(SessionStatus::Connecting));
        }
        self.transition(SessionStatus::AwaitingHello);
        Ok(())
    }

    /// Handles Hello: adopts the server interval and produces Identify.
    ///
    /// # Errors
    /// Returns `SessionError::DuplicateIdentify` if Identify was already
    /// produced, or `SessionError::InvalidState` outside `AwaitingHello`.
    pub fn on_hello(
        &mut self,
        hello: Hello,
        config: &SessionConfig,
    ) -> Result<OutboundFrame, SessionError> {
        if self.identify_sent {
            return Err(SessionError::DuplicateIdentify);
        }
        if self.status != SessionStatus::AwaitingHello {
            return Err(self.invalid_state(SessionStatus::AwaitingHello));
        }

        let interval = Duration::from_millis(hello.heartbeat_interval);
        self.heartbeat_interval = Some(interval);
        self.identify_sent = true;
        self.transition(SessionStatus::Identifying);
        info!(interval_ms = hello.heartbeat_interval, "hello received, identifying");

        Ok(OutboundFrame::Identify(Identify {
            token: self.credentials.expose().to_string(),
            properties: config.properties.clone(),
            intents: config.intents,
        }))
    }

    /// Records sequence bookkeeping for an inbound event.
    ///
    /// Dispatch events advance the sequence tracker. While `Identifying`, a
    /// `READY` dispatch, or any dispatch at all, completes the handshake.
    /// Returns true if this event made the session ready.
    pub fn observe(&mut self, event: &InboundEvent) -> bool {
        if !event.is_dispatch() {
            return false;
        }
        if let Some(seq) = event.sequence {
            self.sequence.observe(seq);
        }
        if self.status == SessionStatus::Identifying {
            if event.is_event(READY) {
                info!("session ready");
            } else {
                info!(
                    event_type = event.event_type.as_deref().unwrap_or("?"),
                    "dispatch before READY, treating session as ready"
                );
            }
            self.transition(SessionStatus::Ready);
            return true;
        }
        false
    }

    /// Builds a heartbeat echoing the current last sequence.
    #[must_use]
    pub fn heartbeat_frame(&self) -> OutboundFrame {
        OutboundFrame::heartbeat(self.sequence.last())
    }

    /// Starts the close handshake.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidState` if already `Closing` or `Closed`.
    pub fn begin_close(&mut self) -> Result<OutboundFrame, SessionError> {
        if matches!(self.status, SessionStatus::Closing | SessionStatus::Closed) {
            return Err(SessionError::InvalidState {
                expected: "open".to_string(),
                current: self.status.to_string(),
            });
        }
        self.transition(SessionStatus::Closing);
        Ok(OutboundFrame::normal_close())
    }

    /// Enters the terminal state.
    pub fn close(&mut self) {
        if self.status != SessionStatus::Closed {
            self.transition(SessionStatus::Closed);
        }
    }
}
