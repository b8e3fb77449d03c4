//! Authentication middleware.
//!
//! The signer state itself never checks identity; authorization is the
//! fronting gateway's job. These layers implement the gateway side: a
//! public layer that tags every request as anonymous, and an API key
//! layer that rejects requests without the shared key.

use std::fmt::{self, Display};

pub mod key;
pub mod public;

pub use key::ApiKeyAuthLayer;
pub use public::PublicAccessAuthLayer;

/// Client identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientId {
    /// Anonymous client identifier.
    Anonymous,
    /// Known client identifier.
    Known(String),
}

impl ClientId {
    /// Create a new anonymous client identifier.
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Create a new known client identifier.
    pub fn known<S: Into<String>>(client_id: S) -> Self {
        Self::Known(client_id.into())
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientId::Anonymous => write!(f, "ANONYMOUS"),
            ClientId::Known(id) => write!(f, "{}", id),
        }
    }
}
