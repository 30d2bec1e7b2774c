//! Typed error hierarchy for the taskdesk client.
//!
//! `ClientError` covers everything that can go wrong between the views and
//! the remote API. Session-level failures are folded into result values by the
//! session store, so callers of `login` never see these as faults.

use thiserror::Error;

/// Coarse classification of a [`ClientError`], used by the login flow and the
/// views to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    Network,
    Api,
    Decode,
    Config,
}

/// Errors from the HTTP client, the authenticator and the views.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required form field is missing. Caught before any request is made.
    #[error("{0}")]
    Validation(String),

    /// The server refused the supplied username/password.
    #[error("{0}")]
    Authentication(String),

    /// The credential is missing, expired or rejected on a protected call.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// The request could not complete (connection refused, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// Any other non-success status, carrying the server's `detail`.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::Network(_) => ErrorKind::Network,
            Self::Api { .. } => ErrorKind::Api,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::InvalidUrl { .. } => ErrorKind::Config,
        }
    }

    /// Message suitable for showing in a view's error indicator.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Authentication(msg) => msg.clone(),
            Self::Authorization(_) => "Your session has expired. Please log in again.".to_string(),
            Self::Network(_) => "Unable to reach the server. Please try again.".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Decode { .. } => "The server sent an unexpected response.".to_string(),
            Self::InvalidUrl { .. } => self.to_string(),
        }
    }

    pub(crate) fn network(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "could not connect to server".to_string()
        } else {
            err.to_string()
        };
        Self::Network(message)
    }
}
