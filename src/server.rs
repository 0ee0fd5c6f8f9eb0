//! TCP listener
//!
//! Binds the configured address and spawns one session task per accepted
//! connection. All sessions share a single registry.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::registry::Registry;
use crate::session::handle_connection;

/// The chat server: a bound listener plus the shared registry
pub struct ChatServer {
    listener: TcpListener,
    registry: Registry,
    config: Arc<ServerConfig>,
}

impl ChatServer {
    /// Bind the listener described by `config`
    pub async fn bind(config: ServerConfig) -> Result<Self, AppError> {
        let listener = TcpListener::bind(config.bind_addr()).await?;
        let registry = Registry::new(config.max_clients, config.history_limit);
        Ok(Self {
            listener,
            registry,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AppError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the shared registry
    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }

    /// Accept connections forever
    ///
    /// Accept errors are logged and skipped; they never stop the server.
    pub async fn run(self) {
        info!(
            "Chat server accepting connections (max {} clients)",
            self.registry.max_clients()
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("New connection from {}", addr);
                    let registry = self.registry.clone();
                    let config = Arc::clone(&self.config);

                    // Spawn session task for each connection
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, registry, config).await {
                            error!("Connection handler error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}
