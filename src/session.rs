//! Per-connection session
//!
//! Drives one connection through name negotiation and the message loop.
//! Reads happen here; all writes go through an outbound channel drained by a
//! dedicated writer task, the same path broadcasts from other sessions use.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

use crate::broadcast::Broadcaster;
use crate::client::Client;
use crate::codec::{InboundLine, LineCodec};
use crate::config::ServerConfig;
use crate::error::{AdmitError, AppError, ValidationError};
use crate::message::{validate_message, validate_name, ServerMessage};
use crate::registry::Registry;
use crate::types::ClientId;

/// Session lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted, banner not yet sent
    Connecting,
    /// Waiting for an acceptable, unused name
    NegotiatingName,
    /// Registered and chatting
    Active { name: String },
    /// Terminal
    Disconnected,
}

/// Result of waiting for the next inbound line
enum Inbound {
    Line(String),
    /// Longer than `max_line_length`; already skipped
    Oversized,
    /// EOF, read error, or the writer task went away
    Closed,
    TimedOut,
}

/// Handle a new TCP connection
///
/// Runs the session to completion; returns once the connection is done and
/// any queued output has been flushed.
pub async fn handle_connection(
    stream: TcpStream,
    registry: Registry,
    config: Arc<ServerConfig>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    stream.set_nodelay(true)?;

    let id = ClientId::new();
    info!("Client {} connected from {}", id, peer_addr);

    serve(id, stream, registry, config).await;

    info!("Client {} disconnected", id);
    Ok(())
}

/// Run a session over any byte stream
pub async fn serve<S>(id: ClientId, io: S, registry: Registry, config: Arc<ServerConfig>)
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (read_half, write_half) = tokio::io::split(io);

    // Server -> client messages
    let (msg_tx, msg_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = tokio::spawn(write_outbound(id, write_half, msg_rx, config.write_timeout));

    let session = Session {
        id,
        lines: FramedRead::new(read_half, LineCodec::new(config.max_line_length)),
        outbound: msg_tx,
        idle_timeout: config.idle_timeout,
        broadcaster: Broadcaster::new(registry.clone()),
        registry,
    };
    session.run().await;

    // Every sender is gone now, so the writer drains what is queued and exits
    if let Err(e) = writer.await {
        warn!("Writer task for {} failed: {}", id, e);
    }
}

/// Drain queued messages onto the socket
///
/// A write that fails or stalls past `write_timeout` ends the task, which the
/// session observes as a disconnect.
async fn write_outbound<W>(
    id: ClientId,
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
    write_timeout: Duration,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = outbound.recv().await {
        let text = msg.to_string();
        match timeout(write_timeout, writer.write_all(text.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!("Write to {} failed: {}", id, e);
                break;
            }
            Err(_) => {
                warn!("Write to {} stalled for {:?}, dropping peer", id, write_timeout);
                break;
            }
        }
    }
    debug!("Write task ended for {}", id);

    let _ = writer.shutdown().await;
}

struct Session<R> {
    id: ClientId,
    lines: FramedRead<R, LineCodec>,
    outbound: mpsc::UnboundedSender<ServerMessage>,
    idle_timeout: Option<Duration>,
    registry: Registry,
    broadcaster: Broadcaster,
}

impl<R> Session<R>
where
    R: AsyncRead + Unpin,
{
    async fn run(mut self) {
        let mut state = SessionState::Connecting;
        loop {
            let next = match state {
                SessionState::Connecting => {
                    self.send(ServerMessage::Banner);
                    SessionState::NegotiatingName
                }
                SessionState::NegotiatingName => self.negotiate_name().await,
                SessionState::Active { ref name } => self.exchange(name).await,
                SessionState::Disconnected => break,
            };
            if next != state {
                debug!("Session {}: {:?} -> {:?}", self.id, state, next);
            }
            state = next;
        }
    }

    /// Queue output; a closed channel surfaces on the next read
    fn send(&self, msg: ServerMessage) {
        let _ = self.outbound.send(msg);
    }

    async fn next_line(&mut self) -> Inbound {
        let lines = &mut self.lines;
        let outbound = &self.outbound;
        let read = async {
            tokio::select! {
                line = lines.next() => line,
                _ = outbound.closed() => None,
            }
        };

        let line = match self.idle_timeout {
            Some(limit) => match timeout(limit, read).await {
                Ok(line) => line,
                Err(_) => return Inbound::TimedOut,
            },
            None => read.await,
        };

        match line {
            Some(Ok(InboundLine::Text(line))) => Inbound::Line(line),
            Some(Ok(InboundLine::Oversized)) => Inbound::Oversized,
            Some(Err(e)) => {
                debug!("Read from {} failed: {}", self.id, e);
                Inbound::Closed
            }
            None => Inbound::Closed,
        }
    }

    /// One handshake attempt
    async fn negotiate_name(&mut self) -> SessionState {
        let raw = match self.next_line().await {
            Inbound::Line(raw) => raw,
            Inbound::Oversized => {
                self.send(ValidationError::InvalidName.into());
                return SessionState::NegotiatingName;
            }
            Inbound::Closed => return SessionState::Disconnected,
            Inbound::TimedOut => {
                warn!("Client {} timed out choosing a name", self.id);
                return SessionState::Disconnected;
            }
        };

        let name = match validate_name(&raw) {
            Ok(name) => name.to_string(),
            Err(e) => {
                self.send(e.into());
                return SessionState::NegotiatingName;
            }
        };

        if self.registry.is_name_taken(&name).await {
            self.send(ValidationError::NameTaken.into());
            return SessionState::NegotiatingName;
        }

        let client = Client::new(self.id, name.clone(), self.outbound.clone());
        match self.registry.try_admit(client).await {
            Ok(()) => {
                info!("Client {} joined as '{}'", self.id, name);
                self.broadcaster.announce_join(&name, self.id).await;
                SessionState::Active { name }
            }
            Err(AdmitError::ServerFull) => {
                info!("Rejected client {}: server full", self.id);
                self.send(ServerMessage::ServerFull);
                SessionState::Disconnected
            }
            Err(AdmitError::NameTaken) => {
                self.send(ValidationError::NameTaken.into());
                SessionState::NegotiatingName
            }
        }
    }

    /// Prompt, read one line, broadcast it if valid
    async fn exchange(&mut self, name: &str) -> SessionState {
        self.send(ServerMessage::Prompt {
            name: name.to_string(),
        });

        let raw = match self.next_line().await {
            Inbound::Line(raw) => raw,
            Inbound::Oversized => {
                self.send(ValidationError::InvalidMessage.into());
                return SessionState::Active {
                    name: name.to_string(),
                };
            }
            Inbound::Closed => return self.disconnect(name).await,
            Inbound::TimedOut => {
                warn!("Client {} ('{}') idle timeout", self.id, name);
                return self.disconnect(name).await;
            }
        };

        match validate_message(&raw) {
            Ok(text) => {
                debug!("Chat from '{}': {}", name, text);
                self.broadcaster.chat(name, text, self.id).await;
            }
            Err(e) => self.send(e.into()),
        }
        SessionState::Active {
            name: name.to_string(),
        }
    }

    /// Remove from the registry; only the call that removes announces
    async fn disconnect(&self, name: &str) -> SessionState {
        if self.registry.remove(self.id).await.is_some() {
            info!("Client {} ('{}') left", self.id, name);
            self.broadcaster.announce_leave(name, self.id).await;
        }
        SessionState::Disconnected
    }
}
