//! Error types for the chat server
//!
//! Defines startup errors, admission outcomes, in-band validation
//! rejections and delivery errors. Uses thiserror for ergonomic error
//! definitions.

use thiserror::Error;

/// Application-level errors
///
/// These end the process (startup) or a single connection (I/O).
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal for the affected connection, or the listener at startup)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// More than one positional argument was supplied
    #[error("[USAGE]: ./TCPChat $port")]
    Usage,

    /// The port argument is not a valid TCP port
    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

/// Registry admission failures
///
/// Both leave the registry untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmitError {
    /// `max_clients` members are already registered
    #[error("Server is full")]
    ServerFull,

    /// Another member registered the same name after the handshake lookup
    #[error("Name already taken")]
    NameTaken,
}

/// Input rejected by the session
///
/// Recoverable: reported only to the sender, who is reprompted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name cannot be empty. Please enter a valid name:")]
    EmptyName,

    #[error("Name can only contain letters and numbers. Please try again:")]
    InvalidName,

    #[error("This name is already taken. Please enter a different name:")]
    NameTaken,

    #[error("Message can only contain letters and numbers. Please try again:")]
    InvalidMessage,
}

impl ValidationError {
    /// Whether this rejection belongs to the name handshake
    pub fn is_name_error(&self) -> bool {
        !matches!(self, ValidationError::InvalidMessage)
    }
}

/// Message send errors
///
/// Occurs when delivering to a connection whose writer has gone away.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
