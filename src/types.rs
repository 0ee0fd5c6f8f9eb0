//! Connection handles
//!
//! Every accepted connection gets a `ClientId` before it sends a byte. The
//! registry keys members by it, and a broadcast names the sender's id so the
//! line is not echoed back.

use uuid::Uuid;

/// Opaque handle for one connection
///
/// Random UUID v4, so two live connections never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
