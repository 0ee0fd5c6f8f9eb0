//! Client struct definition
//!
//! Represents a registered participant and its outbound channel.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ClientId;

/// Registered participant
///
/// Owned by the registry from admission until removal. The sender feeds the
/// connection's writer task, so sending never blocks on the socket.
#[derive(Debug, Clone)]
pub struct Client {
    /// Connection handle
    pub id: ClientId,
    /// Display name, unique among registered clients
    pub name: String,
    /// Server → Client message channel
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Client {
    pub fn new(id: ClientId, name: String, sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { id, name, sender }
    }

    /// Send a message to this client
    ///
    /// Returns an error if the channel is closed (writer gone).
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.send(msg).map_err(|_| SendError::ChannelClosed)
    }

    /// Deliver a broadcast line followed by this client's own prompt
    pub fn deliver(&self, line: &str) -> Result<(), SendError> {
        self.send(ServerMessage::Delivery {
            line: line.to_string(),
            recipient: self.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_deliver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client = Client::new(ClientId::new(), "Bob".to_string(), tx);

        client.deliver("Alice has joined the chat").unwrap();

        match rx.recv().await {
            Some(ServerMessage::Delivery { line, recipient }) => {
                assert_eq!(line, "Alice has joined the chat");
                assert_eq!(recipient, "Bob");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_send_after_close() {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = Client::new(ClientId::new(), "Bob".to_string(), tx);
        drop(rx);

        assert!(matches!(
            client.send(ServerMessage::ServerFull),
            Err(SendError::ChannelClosed)
        ));
    }
}
