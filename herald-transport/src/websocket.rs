/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! WebSocket transport built on `tokio-tungstenite`.

use crate::frame::{CloseInfo, FrameSink, FrameSource, WireFrame};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use herald_core::error::TransportError;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of a WebSocket connection.
pub struct WsSink {
    inner: SplitSink<WsStream, Message>,
}

/// Read half of a WebSocket connection.
pub struct WsSource {
    inner: SplitStream<WsStream>,
}

/// Opens a WebSocket connection and splits it into its two halves.
///
/// # Arguments
/// * `url` - A `ws://` or `wss://` URL
///
/// # Errors
/// Returns `TransportError::Connect` if the handshake fails.
pub async fn connect(url: &str) -> Result<(WsSink, WsSource), TransportError> {
    let (stream, response) = connect_async(url)
        .await
        .map_err(|e| TransportError::Connect(e.to_string()))?;
    debug!(status = %response.status(), "websocket handshake complete");

    let (sink, source) = stream.split();
    Ok((WsSink { inner: sink }, WsSource { inner: source }))
}

fn to_message(frame: WireFrame) -> Message {
    match frame {
        WireFrame::Text(text) => Message::Text(text.into()),
        WireFrame::Binary(data) => Message::Binary(data.into()),
        WireFrame::Close(info) => Message::Close(info.map(|c| CloseFrame {
            code: CloseCode::from(c.code),
            reason: c.reason.into(),
        })),
    }
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&mut self, frame: WireFrame) -> Result<(), TransportError> {
        self.inner
            .send(to_message(frame))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.inner
            .close()
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }
}

#[async_trait]
impl FrameSource for WsSource {
    async fn recv(&mut self) -> Result<Option<WireFrame>, TransportError> {
        loop {
            let message = match self.inner.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => return Err(TransportError::Read(e.to_string())),
                None => return Ok(None),
            };

            let frame = match message {
                Message::Text(text) => WireFrame::Text(text.as_str().to_owned()),
                Message::Binary(data) => WireFrame::Binary(data.to_vec()),
                Message::Close(frame) => WireFrame::Close(frame.map(|f| {
                    CloseInfo::new(u16::from(f.code), f.reason.as_str().to_owned())
                })),
                // Control frames are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {
                    trace!("skipping control frame");
                    continue;
                }
            };
            return Ok(Some(frame));
        }
    }
}
