//! Gateway and transport errors.

use thiserror::Error;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors surfaced by [`ContentGateway`](crate::ContentGateway).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Draft mode was requested but no read token is configured.
    ///
    /// Raised before any request is issued.
    #[error("The `SANITY_API_READ_TOKEN` environment variable is required in draft mode")]
    AuthenticationRequired,

    /// Failure reported by the transport, passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Result did not match the shape requested by the caller.
    #[error("failed to decode query result: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Whether the failure comes from local configuration rather than the store.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }
}

/// Errors raised while talking to the content store.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network or protocol failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("content store error {status}: {message}")]
    Store { status: u16, message: String },

    /// The store answered with something that is not a query envelope.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
