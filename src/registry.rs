//! Shared client registry
//!
//! Process-wide membership map plus the ordered chat history, both behind a
//! single lock. The raw containers are never handed out: every read and
//! write goes through one of the atomic operations below.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::client::Client;
use crate::error::AdmitError;
use crate::message::ServerMessage;
use crate::types::ClientId;

/// State guarded by the registry lock
#[derive(Debug, Default)]
struct RegistryState {
    /// Registered clients: ClientId -> Client
    members: HashMap<ClientId, Client>,
    /// Broadcast lines in broadcast order
    history: VecDeque<String>,
}

impl RegistryState {
    fn name_taken(&self, name: &str) -> bool {
        self.members.values().any(|c| c.name == name)
    }
}

/// Cloneable handle to the shared registry
#[derive(Debug, Clone)]
pub struct Registry {
    inner: Arc<Mutex<RegistryState>>,
    max_clients: usize,
    history_limit: Option<usize>,
}

impl Registry {
    pub fn new(max_clients: usize, history_limit: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryState::default())),
            max_clients,
            history_limit,
        }
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }

    /// Whether a registered client already uses this exact name
    pub async fn is_name_taken(&self, name: &str) -> bool {
        self.inner.lock().await.name_taken(name)
    }

    /// Atomically test capacity and name uniqueness, then insert
    ///
    /// On success the current history is queued to the new client while the
    /// lock is still held, so replay precedes every live delivery it will
    /// receive. On failure nothing is mutated.
    pub async fn try_admit(&self, client: Client) -> Result<(), AdmitError> {
        let mut state = self.inner.lock().await;

        if state.members.len() >= self.max_clients {
            return Err(AdmitError::ServerFull);
        }
        if state.name_taken(&client.name) {
            return Err(AdmitError::NameTaken);
        }

        for line in &state.history {
            if client
                .send(ServerMessage::History { line: line.clone() })
                .is_err()
            {
                break;
            }
        }

        debug!(
            "Admitted {} as '{}' ({} replayed)",
            client.id,
            client.name,
            state.history.len()
        );
        state.members.insert(client.id, client);
        Ok(())
    }

    /// Remove a client; `None` if it was not registered
    pub async fn remove(&self, id: ClientId) -> Option<Client> {
        self.inner.lock().await.members.remove(&id)
    }

    /// Append a line to history and queue it to every member except `exclude`
    ///
    /// Both happen in one critical section so every member observes lines in
    /// history order. Queueing is non-blocking; socket writes happen in each
    /// member's writer task. Returns the number of members the line reached.
    pub async fn publish(&self, line: String, exclude: ClientId) -> usize {
        let mut state = self.inner.lock().await;

        let mut delivered = 0;
        for (id, client) in &state.members {
            if *id == exclude {
                continue;
            }
            match client.deliver(&line) {
                Ok(()) => delivered += 1,
                Err(e) => debug!("Skipping delivery to {}: {}", id, e),
            }
        }

        state.history.push_back(line);
        if let Some(limit) = self.history_limit {
            while state.history.len() > limit {
                state.history.pop_front();
            }
        }

        delivered
    }

    pub async fn member_count(&self) -> usize {
        self.inner.lock().await.members.len()
    }

    /// Sorted names of registered members
    pub async fn member_names(&self) -> Vec<String> {
        let state = self.inner.lock().await;
        let mut names: Vec<String> = state.members.values().map(|c| c.name.clone()).collect();
        names.sort();
        names
    }

    /// Copy of the history in broadcast order
    pub async fn history(&self) -> Vec<String> {
        self.inner.lock().await.history.iter().cloned().collect()
    }
}
