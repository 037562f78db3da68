/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Background event reader.
//!
//! The reader owns the read half of the transport. It decodes every text frame
//! and hands the event to the controller over a bounded channel, blocking until
//! the controller has room. Malformed frames are logged and dropped. Any read
//! failure, remote close, or end of stream stops the task; dropping its sender
//! is how the controller learns the stream is over.

use herald_core::error::TransportError;
use herald_core::payload::InboundEvent;
use herald_transport::codec::FrameCodec;
use herald_transport::frame::{FrameSource, WireFrame};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

/// Why the reader stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderExit {
    /// Remote side sent a close frame.
    RemoteClosed {
        /// Close code, if the frame carried one.
        code: Option<u16>,
        /// Close reason.
        reason: String,
    },
    /// Stream ended without a close frame.
    StreamEnded,
    /// Reading from the transport failed.
    Failed(TransportError),
    /// The controller dropped its receiver.
    ControllerGone,
}

/// Reads frames from a transport and forwards decoded events.
pub struct EventReader<S> {
    source: S,
    codec: FrameCodec,
}

impl<S: FrameSource + 'static> EventReader<S> {
    /// Creates a reader over a transport read half.
    #[must_use]
    pub fn new(source: S, codec: FrameCodec) -> Self {
        Self { source, codec }
    }

    /// Spawns the reader loop on the runtime.
    pub fn spawn(self, tx: mpsc::Sender<InboundEvent>) -> JoinHandle<ReaderExit> {
        tokio::spawn(self.run(tx))
    }

    /// Runs the reader loop until the stream stops.
    pub async fn run(mut self, tx: mpsc::Sender<InboundEvent>) -> ReaderExit {
        loop {
            let frame = match self.source.recv().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    debug!("gateway stream ended");
                    return ReaderExit::StreamEnded;
                }
                Err(TransportError::Closed) => {
                    debug!("transport closed locally");
                    return ReaderExit::Failed(TransportError::Closed);
                }
                Err(e) => {
                    error!(error = %e, "gateway read failed");
                    return ReaderExit::Failed(e);
                }
            };

            if let WireFrame::Close(info) = frame {
                let (code, reason) = info
                    .map_or((None, String::new()), |c| (Some(c.code), c.reason));
                debug!(code = ?code, reason = %reason, "gateway sent close frame");
                return ReaderExit::RemoteClosed { code, reason };
            }

            let event = match self.codec.decode(&frame) {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, kind = frame.kind(), "discarding undecodable frame");
                    continue;
                }
            };

            trace!(
                op = event.opcode.value(),
                seq = ?event.sequence,
                event_type = ?event.event_type,
                "frame received"
            );
            if tx.send(event).await.is_err() {
                return ReaderExit::ControllerGone;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::types::Opcode;
    use herald_transport::memory;

    #[tokio::test]
    async fn test_reader_forwards_and_skips_malformed() {
        let (_sink, source, mut peer) = memory::pair();
        let (tx, mut rx) = mpsc::channel(1);
        let handle = EventReader::new(source, FrameCodec::new()).spawn(tx);

        peer.send_text(r#"{"op":10,"d":{"heartbeat_interval":1000}}"#);
        peer.send_text("garbage");
        peer.send_frame(WireFrame::Binary(vec![0xde, 0xad]));
        peer.send_text(r#"{"op":11}"#);
        peer.hang_up();

        assert_eq!(rx.recv().await.unwrap().opcode, Opcode::HELLO);
        assert_eq!(rx.recv().await.unwrap().opcode, Opcode::HEARTBEAT_ACK);
        assert!(rx.recv().await.is_none());
        assert_eq!(handle.await.unwrap(), ReaderExit::StreamEnded);
    }

    #[tokio::test]
    async fn test_reader_stops_on_read_failure() {
        let (_sink, source, peer) = memory::pair();
        let (tx, mut rx) = mpsc::channel(1);
        let handle = EventReader::new(source, FrameCodec::new()).spawn(tx);

        peer.fail_read(TransportError::Read("connection reset".to_string()));

        assert!(rx.recv().await.is_none());
        assert_eq!(
            handle.await.unwrap(),
            ReaderExit::Failed(TransportError::Read("connection reset".to_string()))
        );
    }

    #[tokio::test]
    async fn test_reader_reports_remote_close() {
        let (_sink, source, peer) = memory::pair();
        let (tx, mut rx) = mpsc::channel(1);
        let handle = EventReader::new(source, FrameCodec::new()).spawn(tx);

        peer.send_close(4004, "Authentication failed.");

        assert!(rx.recv().await.is_none());
        assert_eq!(
            handle.await.unwrap(),
            ReaderExit::RemoteClosed {
                code: Some(4004),
                reason: "Authentication failed.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_reader_blocks_on_full_handoff() {
        let (_sink, source, peer) = memory::pair();
        let (tx, mut rx) = mpsc::channel(1);
        let handle = EventReader::new(source, FrameCodec::new()).spawn(tx);

        for _ in 0..3 {
            peer.send_text(r#"{"op":11}"#);
        }
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        assert!(rx.recv().await.is_some());
        drop(rx);
        assert_eq!(handle.await.unwrap(), ReaderExit::ControllerGone);
    }
}
