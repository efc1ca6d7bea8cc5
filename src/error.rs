//! Error types for registry manifest operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for registry manifest operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while fetching or storing a manifest.
///
/// Every variant carries enough context (the URL attempted, the status
/// received) to diagnose a failure from the error alone. None of these are
/// retried internally beyond the single basic-to-bearer escalation.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The request never produced an HTTP response: unparseable URL, DNS
    /// failure, refused connection, TLS failure, or timeout.
    #[error("Request to '{url}' failed: {message}")]
    Transport {
        /// The URL that was being contacted.
        url: String,
        /// The underlying failure.
        message: String,
    },

    /// The registry demanded authentication but offered no bearer challenge
    /// to act on.
    #[error("Registry denied access without offering a bearer challenge")]
    NoChallenge,

    /// The bearer challenge named a realm that is not an absolute URL.
    #[error("Challenge realm '{realm}' is not a valid URL: {message}")]
    MalformedRealm {
        /// The realm value as received (empty when absent).
        realm: String,
        /// Why it failed to parse.
        message: String,
    },

    /// The token endpoint answered with something other than 200.
    #[error("Token exchange at '{url}' failed with status {status}")]
    TokenExchangeStatus {
        /// The token endpoint URL.
        url: String,
        /// The status it returned.
        status: StatusCode,
    },

    /// A JSON payload could not be decoded (or encoded).
    #[error("Failed to decode {context}: {message}")]
    Decode {
        /// What was being decoded (token response, manifest, config file).
        context: String,
        /// The underlying parse failure.
        message: String,
    },

    /// The manifest endpoint's final answer, after any escalation, was not
    /// a success status.
    #[error("Registry at '{url}' answered with unexpected status {status}")]
    UnexpectedStatus {
        /// The manifest URL.
        url: String,
        /// The final status received.
        status: StatusCode,
    },

    /// Client construction or configuration failure.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error (credential file access).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Create a transport error.
    #[must_use]
    pub fn transport(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed realm error.
    #[must_use]
    pub fn malformed_realm(realm: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedRealm {
            realm: realm.into(),
            message: message.to_string(),
        }
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }
}
