//! Broadcast fan-out
//!
//! Formats chat lines and join/leave notices and hands them to the registry,
//! which records each one in history and queues it to every other member.
//! Join and leave notices take the same path as chat, so they are replayed to
//! later joiners as well.

use tracing::debug;

use crate::message::{chat_line, joined_notice, left_notice};
use crate::registry::Registry;
use crate::types::ClientId;

/// Stateless broadcaster over a registry handle
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Registry,
}

impl Broadcaster {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Record `line` and send it to every member except `exclude`
    ///
    /// Delivery is best-effort; a departed peer never fails the broadcast.
    pub async fn broadcast(&self, line: String, exclude: ClientId) -> usize {
        let delivered = self.registry.publish(line, exclude).await;
        debug!("Broadcast from {} reached {} peer(s)", exclude, delivered);
        delivered
    }

    /// Broadcast a validated chat message from `name`
    pub async fn chat(&self, name: &str, text: &str, sender: ClientId) -> usize {
        self.broadcast(chat_line(name, text), sender).await
    }

    pub async fn announce_join(&self, name: &str, id: ClientId) -> usize {
        self.broadcast(joined_notice(name), id).await
    }

    pub async fn announce_leave(&self, name: &str, id: ClientId) -> usize {
        self.broadcast(left_notice(name), id).await
    }
}
