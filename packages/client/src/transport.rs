//! Frame transport used by the duplex loop.
//!
//! The loop only needs to send text frames and to await the next inbound
//! frame, from two different tasks. A connection is therefore handed over
//! as two halves: a [`FrameSender`] kept by the interactive loop and a
//! [`FrameReceiver`] moved into the inbound task.
//!
//! Implementations:
//! - websocket, over tokio-tungstenite ([`connect`])
//! - in-memory, over `tokio::sync::mpsc` unbounded channels

use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, protocol::Message},
};

#[derive(Debug, Error)]
pub enum TransportError {
    /// The other side has gone away
    #[error("connection closed")]
    Closed,

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// A frame type the protocol does not use
    #[error("unexpected {0} frame")]
    UnexpectedFrame(&'static str),
}

/// Outbound half of a connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSender: Send {
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Close the connection. Called once, after the inbound half has stopped.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a connection.
#[async_trait]
pub trait FrameReceiver: Send {
    /// Next text frame; `None` once the stream has ended.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WsFrameSender {
    sink: SplitSink<WsStream, Message>,
}

pub struct WsFrameReceiver {
    stream: SplitStream<WsStream>,
}

/// Open a websocket connection and split it into its two halves.
pub async fn connect(url: &str) -> Result<(WsFrameSender, WsFrameReceiver), TransportError> {
    let (ws_stream, response) = connect_async(url).await?;
    tracing::info!(
        "Connected to {} (HTTP {})",
        url,
        response.status().as_u16()
    );

    let (sink, stream) = ws_stream.split();
    Ok((WsFrameSender { sink }, WsFrameReceiver { stream }))
}

#[async_trait]
impl FrameSender for WsFrameSender {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.sink.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.close().await?;
        Ok(())
    }
}

#[async_trait]
impl FrameReceiver for WsFrameReceiver {
    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(e.into())),
            };

            match message {
                Message::Text(text) => return Some(Ok(text.as_str().to_owned())),
                Message::Binary(_) => return Some(Err(TransportError::UnexpectedFrame("binary"))),
                Message::Close(_) => {
                    tracing::info!("Server closed the connection");
                    return None;
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }
}

#[async_trait]
impl FrameSender for mpsc::UnboundedSender<String> {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        mpsc::UnboundedSender::send(self, frame).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // The channel closes when the sender is dropped
        Ok(())
    }
}

#[async_trait]
impl FrameReceiver for mpsc::UnboundedReceiver<String> {
    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        mpsc::UnboundedReceiver::recv(self).await.map(Ok)
    }
}
