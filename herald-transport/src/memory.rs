/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! In-memory transport backed by channels.
//!
//! [`pair`] returns the client halves plus a [`MemoryPeer`] that plays the
//! remote side: it feeds frames to the client, observes what the client sent,
//! and can inject read or write failures. Closing or dropping the
//! [`MemorySink`] makes a pending [`MemorySource::recv`] fail, the same way a
//! blocking socket read fails once the socket is closed.

use crate::frame::{CloseInfo, FrameSink, FrameSource, WireFrame};
use async_trait::async_trait;
use herald_core::error::TransportError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

type Inbound = Result<WireFrame, TransportError>;

/// Creates a connected in-memory transport.
#[must_use]
pub fn pair() -> (MemorySink, MemorySource, MemoryPeer) {
    let (to_client, from_peer) = mpsc::unbounded_channel();
    let (to_peer, from_client) = mpsc::unbounded_channel();
    let closed = CancellationToken::new();
    let fail_writes = Arc::new(AtomicBool::new(false));
    let close_called = Arc::new(AtomicBool::new(false));

    let sink = MemorySink {
        tx: to_peer,
        closed: closed.clone(),
        fail_writes: Arc::clone(&fail_writes),
        close_called: Arc::clone(&close_called),
    };
    let source = MemorySource {
        rx: from_peer,
        closed,
    };
    let peer = MemoryPeer {
        tx: Some(to_client),
        rx: from_client,
        fail_writes,
        close_called,
    };
    (sink, source, peer)
}

/// Client write half.
#[derive(Debug)]
pub struct MemorySink {
    tx: mpsc::UnboundedSender<WireFrame>,
    closed: CancellationToken,
    fail_writes: Arc<AtomicBool>,
    close_called: Arc<AtomicBool>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send(&mut self, frame: WireFrame) -> Result<(), TransportError> {
        if self.closed.is_cancelled() {
            return Err(TransportError::Closed);
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(TransportError::Write("injected write failure".to_string()));
        }
        self.tx.send(frame).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.close_called.store(true, Ordering::SeqCst);
        self.closed.cancel();
        Ok(())
    }
}

impl Drop for MemorySink {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}

/// Client read half.
#[derive(Debug)]
pub struct MemorySource {
    rx: mpsc::UnboundedReceiver<Inbound>,
    closed: CancellationToken,
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn recv(&mut self) -> Result<Option<WireFrame>, TransportError> {
        tokio::select! {
            biased;
            item = self.rx.recv() => match item {
                Some(Ok(frame)) => Ok(Some(frame)),
                Some(Err(e)) => Err(e),
                None => Ok(None),
            },
            () = self.closed.cancelled() => Err(TransportError::Closed),
        }
    }
}

/// Remote side of an in-memory transport.
#[derive(Debug)]
pub struct MemoryPeer {
    tx: Option<mpsc::UnboundedSender<Inbound>>,
    rx: mpsc::UnboundedReceiver<WireFrame>,
    fail_writes: Arc<AtomicBool>,
    close_called: Arc<AtomicBool>,
}

impl MemoryPeer {
    fn push(&self, item: Inbound) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.send(item).is_ok())
    }

    /// Delivers a text frame to the client.
    ///
    /// Returns false if the client read half is gone.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.push(Ok(WireFrame::Text(text.into())))
    }

    /// Delivers a raw frame to the client.
    pub fn send_frame(&self, frame: WireFrame) -> bool {
        self.push(Ok(frame))
    }

    /// Delivers a close frame to the client.
    pub fn send_close(&self, code: u16, reason: impl Into<String>) -> bool {
        self.push(Ok(WireFrame::Close(Some(CloseInfo::new(code, reason)))))
    }

    /// Makes the client's next read fail.
    pub fn fail_read(&self, err: TransportError) -> bool {
        self.push(Err(err))
    }

    /// Makes every subsequent client write fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Ends the inbound stream cleanly.
    pub fn hang_up(&mut self) {
        self.tx = None;
    }

    /// Waits for the next frame written by the client.
    ///
    /// Returns `None` once the client write half is dropped.
    pub async fn recv(&mut self) -> Option<WireFrame> {
        self.rx.recv().await
    }

    /// Returns true if the client closed its write half explicitly.
    ///
    /// Dropping the sink does not count.
    #[must_use]
    pub fn client_closed(&self) -> bool {
        self.close_called.load(Ordering::SeqCst)
    }

    /// Returns a frame written by the client, if one is queued.
    pub fn try_recv(&mut self) -> Option<WireFrame> {
        self.rx.try_recv().ok()
    }
}
