/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session controller.
//!
//! The controller owns the [`Session`] and the write half of the transport and
//! runs the single event loop of a gateway connection. Each iteration waits on
//! three sources at once and services exactly one of them:
//!
//! 1. the cancellation token, which starts the close handshake,
//! 2. the next event handed off by the [`EventReader`],
//! 3. the next heartbeat tick.
//!
//! All session mutation and every write to the transport happen on this loop,
//! so writes are serialized without locks.

use crate::config::SessionConfig;
use crate::dispatcher::{Action, Dispatcher};
use crate::handler::{CommandHandler, NoOpHandler};
use crate::heartbeat::HeartbeatScheduler;
use crate::reader::{EventReader, ReaderExit};
use crate::state::Session;
use herald_core::error::{GatewayError, TransportError};
use herald_core::payload::{InboundEvent, MessageCreate, OutboundFrame};
use herald_transport::codec::FrameCodec;
use herald_transport::frame::{FrameSink, FrameSource};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Capacity of the reader to controller handoff.
///
/// One slot: the reader blocks until the controller took the previous event.
pub const HANDOFF_CAPACITY: usize = 1;

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Shutdown requested and the server acknowledged the close.
    Graceful,
    /// Shutdown requested and the close wait timed out.
    Cancelled,
    /// The server closed the connection or the stream ended.
    RemoteClosed {
        /// Close code, `None` when the stream ended without a close frame.
        code: Option<u16>,
        /// Close reason.
        reason: String,
    },
    /// Reading or writing the transport failed.
    TransportError(GatewayError),
}

impl SessionOutcome {
    /// Returns true if the session ended without an operator request.
    #[must_use]
    pub const fn is_connection_lost(&self) -> bool {
        matches!(self, Self::RemoteClosed { .. } | Self::TransportError(_))
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graceful => f.write_str("graceful"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::RemoteClosed {
                code: Some(code),
                reason,
            } => write!(f, "remote closed ({code}: {reason})"),
            Self::RemoteClosed { code: None, .. } => f.write_str("remote closed (stream ended)"),
            Self::TransportError(e) => write!(f, "transport error: {e}"),
        }
    }
}

/// Final state handed back by [`SessionController::run`].
#[derive(Debug)]
pub struct SessionReport {
    /// Why the session ended.
    pub outcome: SessionOutcome,
    /// Session state at termination, always `Closed`.
    pub session: Session,
    /// Number of heartbeats written.
    pub heartbeats_sent: u64,
    /// Number of heartbeat acknowledgements received.
    pub heartbeat_acks: u64,
}

/// Drives one gateway session from hello to close.
pub struct SessionController<K, S> {
    core: ControllerCore<K>,
    source: S,
    shutdown: CancellationToken,
}

struct ControllerCore<K> {
    config: SessionConfig,
    session: Session,
    dispatcher: Dispatcher,
    heartbeat: HeartbeatScheduler,
    codec: FrameCodec,
    sink: K,
    handler: Arc<dyn CommandHandler>,
    commands: JoinSet<()>,
    close_reply_pending: bool,
}

impl<K: FrameSink, S: FrameSource + 'static> SessionController<K, S> {
    /// Creates a controller over an established transport.
    ///
    /// # Arguments
    /// * `config` - Session configuration
    /// * `sink` - Write half of the transport
    /// * `source` - Read half of the transport
    #[must_use]
    pub fn new(config: SessionConfig, sink: K, source: S) -> Self {
        let core = ControllerCore {
            session: Session::new(config.credentials.clone()),
            dispatcher: Dispatcher::new(config.command_prefixes.iter().cloned()),
            heartbeat: HeartbeatScheduler::new(),
            codec: FrameCodec::new().with_max_frame_size(config.max_frame_size),
            sink,
            handler: Arc::new(NoOpHandler),
            commands: JoinSet::new(),
            close_reply_pending: false,
            config,
        };
        Self {
            core,
            source,
            shutdown: CancellationToken::new(),
        }
    }

    /// Sets the command handler.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.core.handler = handler;
        self
    }

    /// Uses an external cancellation token as the shutdown signal.
    #[must_use]
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Returns a handle that triggers graceful shutdown when cancelled.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Returns the session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.core.session
    }

    /// Runs the session until it is closed.
    ///
    /// Spawns the event reader, then services events, heartbeats and the
    /// shutdown signal until a terminal condition is reached. The transport
    /// is released, the reader reclaimed, and in-flight command handlers
    /// given up to the configured drain timeout before returning.
    pub async fn run(self) -> SessionReport {
        let Self {
            mut core,
            source,
            shutdown,
        } = self;

        let (tx, mut rx) = mpsc::channel(HANDOFF_CAPACITY);
        let mut reader = EventReader::new(source, core.codec).spawn(tx);

        let outcome = match core.session.on_connected() {
            Ok(()) => core.event_loop(&mut rx, &mut reader, &shutdown).await,
            Err(e) => SessionOutcome::TransportError(e.into()),
        };

        core.teardown(reader).await;
        info!(outcome = %outcome, "session closed");

        SessionReport {
            outcome,
            heartbeats_sent: core.heartbeat.sent_count(),
            heartbeat_acks: core.heartbeat.ack_count(),
            session: core.session,
        }
    }
}

impl<K: FrameSink> ControllerCore<K> {
    async fn event_loop(
        &mut self,
        rx: &mut mpsc::Receiver<InboundEvent>,
        reader: &mut JoinHandle<ReaderExit>,
        shutdown: &CancellationToken,
    ) -> SessionOutcome {
        loop {
            self.reap_commands();
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    info!(status = %self.session.status(), "shutdown requested");
                    return self.close_handshake(rx).await;
                }

                event = rx.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.handle_event(event).await {
                            error!(error = %e, "gateway write failed");
                            return SessionOutcome::TransportError(e);
                        }
                    }
                    None => return self.reader_outcome(reader).await,
                },

                _ = self.heartbeat.tick() => {
                    if let Err(e) = self.send_heartbeat().await {
                        error!(error = %e, "heartbeat write failed");
                        return SessionOutcome::TransportError(e);
                    }
                }
            }
        }
    }

    async fn handle_event(&mut self, event: InboundEvent) -> Result<(), GatewayError> {
        self.session.observe(&event);

        match self.dispatcher.route(&event) {
            Action::PerformHandshake => self.perform_handshake(&event).await?,
            Action::HeartbeatAck => {
                self.heartbeat.on_ack();
                trace!(latency = ?self.heartbeat.last_latency(), "heartbeat acknowledged");
            }
            Action::HandleCommand(message) => self.spawn_command(message),
            Action::Ignore => {}
        }
        Ok(())
    }

    async fn perform_handshake(&mut self, event: &InboundEvent) -> Result<(), GatewayError> {
        let hello = match event.hello() {
            Ok(hello) => hello,
            Err(e) => {
                warn!(error = %e, "ignoring malformed hello");
                return Ok(());
            }
        };
        let frame = match self.session.on_hello(hello, &self.config) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "ignoring hello");
                return Ok(());
            }
        };

        self.write(&frame).await?;
        if let Some(interval) = self.session.heartbeat_interval() {
            self.heartbeat.start(interval);
        }
        Ok(())
    }

    fn spawn_command(&mut self, message: MessageCreate) {
        info!(
            channel_id = %message.channel_id,
            author = %message.author.username,
            in_flight = self.commands.len(),
            "command received"
        );
        let handler = Arc::clone(&self.handler);
        self.commands.spawn(async move {
            handler.on_command(message).await;
        });
    }

    fn reap_commands(&mut self) {
        while let Some(result) = self.commands.try_join_next() {
            if let Err(e) = result {
                warn!(error = %e, "command handler failed");
            }
        }
    }

    /// Waits for in-flight handlers, aborting whatever is left at the deadline.
    async fn drain_commands(&mut self) {
        if self.commands.is_empty() {
            return;
        }
        let pending = self.commands.len();
        let limit = self.config.command_drain_timeout;
        let commands = &mut self.commands;
        let drained = timeout(limit, async {
            while let Some(result) = commands.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "command handler failed");
                }
            }
        })
        .await;
        if drained.is_err() {
            warn!(
                pending,
                remaining = self.commands.len(),
                timeout = ?limit,
                "command handlers still running, aborting"
            );
            self.commands.abort_all();
            while self.commands.join_next().await.is_some() {}
        } else {
            debug!(pending, "command handlers drained");
        }
    }

    async fn send_heartbeat(&mut self) -> Result<(), GatewayError> {
        let frame = self.session.heartbeat_frame();
        debug!(seq = ?self.session.last_sequence(), "sending heartbeat");
        self.write(&frame).await?;
        self.heartbeat.on_sent();
        Ok(())
    }

    /// Sends the close frame, then waits for one more event or the end of the
    /// stream, bounded by the configured close timeout.
    async fn close_handshake(&mut self, rx: &mut mpsc::Receiver<InboundEvent>) -> SessionOutcome {
        let frame = match self.session.begin_close() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "close already in progress");
                return SessionOutcome::Cancelled;
            }
        };
        if let Err(e) = self.write(&frame).await {
            error!(error = %e, "close frame write failed");
            return SessionOutcome::TransportError(e);
        }

        match timeout(self.config.close_timeout, rx.recv()).await {
            Ok(Some(event)) => {
                debug!(op = event.opcode.value(), "close acknowledged");
                SessionOutcome::Graceful
            }
            Ok(None) => {
                debug!("stream ended after close");
                SessionOutcome::Graceful
            }
            Err(_) => {
                warn!(
                    timeout = ?self.config.close_timeout,
                    "close not acknowledged, forcing closure"
                );
                SessionOutcome::Cancelled
            }
        }
    }

    async fn write(&mut self, frame: &OutboundFrame) -> Result<(), GatewayError> {
        let wire = self.codec.encode(frame)?;
        trace!(kind = wire.kind(), op = ?frame.opcode(), "frame sent");
        self.sink.send(wire).await?;
        Ok(())
    }

    async fn teardown(&mut self, reader: JoinHandle<ReaderExit>) {
        self.heartbeat.stop();
        self.session.close();
        // After a read failure or a bare end of stream the sink stays untouched.
        // A received close frame still needs its reply flushed.
        if !reader.is_finished() || self.close_reply_pending {
            if let Err(e) = self.sink.close().await {
                debug!(error = %e, "transport close failed");
            }
        }
        reader.abort();
        self.drain_commands().await;
    }

    async fn reader_outcome(&mut self, reader: &mut JoinHandle<ReaderExit>) -> SessionOutcome {
        match reader.await {
            Ok(ReaderExit::RemoteClosed { code, reason }) => {
                info!(code = ?code, reason = %reason, "gateway closed the connection");
                self.close_reply_pending = true;
                SessionOutcome::RemoteClosed { code, reason }
            }
            Ok(ReaderExit::StreamEnded) => SessionOutcome::RemoteClosed {
                code: None,
                reason: String::new(),
            },
            Ok(ReaderExit::Failed(e)) => SessionOutcome::TransportError(e.into()),
            Ok(ReaderExit::ControllerGone) => {
                SessionOutcome::TransportError(TransportError::Closed.into())
            }
            Err(e) => SessionOutcome::TransportError(
                TransportError::Read(format!("event reader stopped: {e}")).into(),
            ),
        }
    }
}
