use crate::types::events::Category;

use thiserror::Error;

/// Failure talking to the disaster backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Clone, Error)]
#[error("failed to load {category} events: {reason}")]
pub struct InitialLoadError {
    pub category: Category,
    pub reason: String,
}

/// A step of the subscription flow after permission was granted failed.
#[derive(Debug, Clone, Error)]
pub enum SubscriptionError {
    #[error("push worker did not become ready: {0}")]
    NotReady(String),

    #[error("failed to create push subscription: {0}")]
    Subscribe(String),

    #[error("failed to register push subscription: {0}")]
    Registration(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerKeyError {
    #[error("server key is empty")]
    Empty,

    #[error("server key is not valid base64url: {0}")]
    Encoding(String),

    #[error("server key must be a 65-byte uncompressed P-256 point, got {0} bytes")]
    Length(usize),
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}
