//! Client and session identity used to tag events and disambiguate writers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one client installation (device/browser profile)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Create a new unique client ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for one process lifetime; regenerated on every start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique session ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The writer identity stamped onto every event and remote upsert.
///
/// `client_id` survives restarts when the caller persists it; `session_id`
/// is always fresh per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub client_id: ClientId,
    pub session_id: SessionId,
}

impl ClientIdentity {
    /// Generate a brand-new identity (new client, new session)
    #[must_use]
    pub fn generate() -> Self {
        Self {
            client_id: ClientId::new(),
            session_id: SessionId::new(),
        }
    }

    /// Start a new session for an existing client
    #[must_use]
    pub fn resume(client_id: ClientId) -> Self {
        Self {
            client_id,
            session_id: SessionId::new(),
        }
    }
}
