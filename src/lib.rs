//! Multi-user TCP Chat Server Library
//!
//! A line-oriented chat server over raw TCP built on tokio.
//!
//! # Features
//! - Name negotiation with uniqueness and character checks
//! - Capacity-limited admission
//! - History replay for newcomers
//! - Broadcast of chat lines and join/leave notices
//! - Optional idle and per-write timeouts
//!
//! # Architecture
//! - `Registry` holds members and history behind one `tokio::sync::Mutex`
//!   and only exposes atomic operations
//! - Each connection runs a session task plus a writer task fed by an
//!   unbounded `mpsc` channel
//! - Broadcasts are queued to every peer under the lock, so all peers see
//!   history order, while socket writes happen outside it
//!
//! # Example
//! ```ignore
//! use tcp_chat::{ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = ChatServer::bind(ServerConfig::default()).await.unwrap();
//!     server.run().await;
//! }
//! ```

pub mod broadcast;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod message;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use broadcast::Broadcaster;
pub use client::Client;
pub use config::ServerConfig;
pub use error::{AdmitError, AppError, SendError, ValidationError};
pub use message::ServerMessage;
pub use registry::Registry;
pub use server::ChatServer;
pub use session::{handle_connection, SessionState};
pub use types::ClientId;
