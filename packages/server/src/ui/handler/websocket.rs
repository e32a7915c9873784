//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    registry::ConnectionId,
    relay::{BroadcastRelay, RelayState},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the outbound queue into the websocket.
///
/// Frames forwarded by other connections arrive on `rx` and are written to
/// this client. The task ends when the queue is closed or a write fails.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Spawns the receive loop of one connection.
///
/// Every text frame is handed to the relay. Anything that is not a valid
/// frame ends the loop: the protocol has no way to resynchronize.
fn receiver_loop(
    mut receiver: SplitStream<WebSocket>,
    relay: BroadcastRelay,
    id: ConnectionId,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut state = RelayState::AwaitingMessage;

        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on connection '{}': {}", id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    state = RelayState::Forwarding;
                    tracing::debug!("Received text from '{}': {}", id, text.as_str());

                    if let Err(e) = relay.relay_frame(&id, text.as_str()) {
                        tracing::warn!("Closing connection '{}' after malformed frame: {}", id, e);
                        break;
                    }
                    state = RelayState::AwaitingMessage;
                }
                Message::Binary(data) => {
                    tracing::warn!(
                        "Closing connection '{}' after unexpected binary frame ({} bytes)",
                        id,
                        data.len()
                    );
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => {
                    tracing::trace!("Received ping/pong from '{}'", id);
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", id);
                    break;
                }
            }
        }

        tracing::debug!("Connection '{}': {} -> {}", id, state, RelayState::Closed);
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (tx, rx) = mpsc::unbounded_channel();

    // Dropping the registration removes this connection from the registry
    let registration = state.registry.register(tx);
    let id = registration.id();
    tracing::info!(
        "Connection '{}' opened. Total connections: {}",
        id,
        state.registry.len()
    );

    let (sender, receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);
    let mut recv_task = receiver_loop(receiver, state.relay.clone(), id);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        result = &mut recv_task => {
            if let Err(e) = result {
                tracing::error!("Receive task of connection '{}' failed: {}", id, e);
            }
            send_task.abort();
        }
        _ = &mut send_task => recv_task.abort(),
    };

    drop(registration);
    tracing::info!(
        "Connection '{}' closed. Remaining connections: {}",
        id,
        state.registry.len()
    );
}
