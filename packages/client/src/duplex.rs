//! Client duplex loop.
//!
//! Two activities share one connection and one [`ChatHistoryBuffer`]:
//!
//! - the inbound task, spawned on the runtime, awaits frames and appends
//!   them to the history;
//! - the interactive loop renders, polls the terminal for at most
//!   `poll_interval`, edits the input line and sends submitted messages.
//!
//! They communicate only through the history buffer and the
//! [`ConnectionFlag`]. On exit the inbound task is told to stop through a
//! oneshot channel and awaited before the transport is closed.

use std::{sync::Arc, time::Duration};

use hiroba_shared::{
    protocol::WireMessage,
    time::{Clock, SystemClock},
};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{
    error::ClientError,
    history::{ChatHistoryBuffer, ChatMessage},
    session::{ClientSessionState, ConnectionFlag},
    terminal::{CONNECTION_LOST_NOTICE, Key, Screen, Terminal, View, chat_notice},
    transport::{FrameReceiver, FrameSender},
};

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplexOutcome {
    /// The user pressed the cancel key while connected
    UserExit,
    /// The connection dropped and the user acknowledged it
    ConnectionLost,
}

pub struct ClientDuplexLoop {
    session: ClientSessionState,
    history: Arc<ChatHistoryBuffer>,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
    notice: String,
}

impl ClientDuplexLoop {
    pub fn new(
        session: ClientSessionState,
        history: Arc<ChatHistoryBuffer>,
        poll_interval: Duration,
    ) -> Self {
        let notice = chat_notice(history.capacity());
        Self {
            session,
            history,
            poll_interval,
            clock: Arc::new(SystemClock),
            notice,
        }
    }

    /// Use `clock` to timestamp new messages.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run until the user exits.
    ///
    /// The transport is closed exactly once, after the inbound task has
    /// stopped, whichever way the loop ends.
    pub async fn run<T, S, R>(
        mut self,
        terminal: &mut T,
        mut sender: S,
        receiver: R,
    ) -> Result<DuplexOutcome, ClientError>
    where
        T: Terminal + ?Sized,
        S: FrameSender,
        R: FrameReceiver + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let inbound = spawn_inbound(
            receiver,
            Arc::clone(&self.history),
            self.session.connection().clone(),
            Arc::clone(&self.clock),
            shutdown_rx,
        );

        let result = self.interact(terminal, &mut sender).await;

        // The inbound task may already be gone, so a failed send is fine
        let _ = shutdown_tx.send(());
        if let Err(e) = inbound.await {
            tracing::error!("Inbound task failed: {}", e);
        }

        if let Err(e) = sender.close().await {
            tracing::debug!("Failed to close transport cleanly: {}", e);
        }
        tracing::info!("Transport closed");

        result
    }

    async fn interact<T, S>(
        &mut self,
        terminal: &mut T,
        sender: &mut S,
    ) -> Result<DuplexOutcome, ClientError>
    where
        T: Terminal + ?Sized,
        S: FrameSender,
    {
        loop {
            if !self.session.connection_alive() {
                self.wait_for_exit(terminal).await?;
                return Ok(DuplexOutcome::ConnectionLost);
            }

            let history = self.history.snapshot_for_render();
            terminal.render(&View {
                screen: Screen::Chat,
                notice: &self.notice,
                history: &history,
                input_text: self.session.input_text(),
                user_name: self.session.user_name(),
            })?;

            let Some(key) = terminal.poll_key(self.poll_interval).await? else {
                tokio::task::yield_now().await;
                continue;
            };

            match key {
                Key::Submit => self.submit(sender).await,
                Key::Erase => self.session.erase(),
                Key::Cancel => return Ok(DuplexOutcome::UserExit),
                Key::Char(c) => self.session.push_char(c),
                Key::Other => {}
            }
        }
    }

    /// Append the input line locally and send it to the relay.
    async fn submit<S>(&mut self, sender: &mut S)
    where
        S: FrameSender,
    {
        let Some(text) = self.session.take_input() else {
            return;
        };

        let user_name = self.session.user_name();
        let frame = WireMessage::new(user_name, text.as_str()).encode();
        self.history
            .append(ChatMessage::new(self.clock.now(), user_name, text));

        match frame {
            Ok(frame) => {
                // A dead connection is reported by the inbound task
                if let Err(e) = sender.send(frame).await {
                    tracing::warn!("Failed to send message: {}", e);
                }
            }
            Err(e) => tracing::error!("Failed to encode message: {}", e),
        }
    }

    /// Keep the last chat view on screen until the user presses the cancel key.
    async fn wait_for_exit<T>(&mut self, terminal: &mut T) -> Result<(), ClientError>
    where
        T: Terminal + ?Sized,
    {
        tracing::warn!("Connection to server lost");
        self.history
            .append(ChatMessage::system(self.clock.now(), CONNECTION_LOST_NOTICE));
        let history = self.history.snapshot_for_render();
        let view = View {
            screen: Screen::ConnectionLost,
            notice: CONNECTION_LOST_NOTICE,
            history: &history,
            input_text: self.session.input_text(),
            user_name: self.session.user_name(),
        };

        loop {
            terminal.render(&view)?;
            if let Some(Key::Cancel) = terminal.poll_key(self.poll_interval).await? {
                return Ok(());
            }
        }
    }
}

/// Spawn the inbound task.
///
/// Every decoded frame is appended to `history`. A malformed frame, a
/// transport error or the end of the stream clears `connection`. A signal
/// on `shutdown` stops the task without touching the flag.
fn spawn_inbound<R>(
    mut receiver: R,
    history: Arc<ChatHistoryBuffer>,
    connection: ConnectionFlag,
    clock: Arc<dyn Clock>,
    mut shutdown: oneshot::Receiver<()>,
) -> JoinHandle<()>
where
    R: FrameReceiver + 'static,
{
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!("Inbound task stopped");
                    return;
                }
                frame = receiver.recv() => match frame {
                    Some(Ok(frame)) => match WireMessage::decode(&frame) {
                        Ok(message) => {
                            tracing::debug!("Received message from '{}'", message.sender);
                            history.append(ChatMessage::from_wire(message, clock.now()));
                        }
                        Err(e) => {
                            tracing::warn!("Dropping connection after malformed frame: {}", e);
                            break;
                        }
                    },
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket read error: {}", e);
                        break;
                    }
                    None => {
                        tracing::info!("Inbound stream ended");
                        break;
                    }
                },
            }
        }

        connection.mark_lost();
    })
}
