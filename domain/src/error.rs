//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors are modeled as a tree with `Error` as the root holding an
/// `error_kind` enum that classifies what went wrong, while the `source`
/// field preserves the original error for chaining. The calling layer maps
/// `error_kind`s to user-facing behavior (HTTP status codes, redirects)
/// without ever exposing provider error bodies to end users.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Errors originating inside this process.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// A gateway was constructed from a configuration that lacks its
    /// credentials. Possible in development mode, where integration
    /// variables are optional.
    Config,
    Other(String),
}

/// Errors originating from a third-party service.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// Failed to reach the service or to read its response.
    Network,
    /// The identity provider returned a profile without an email address.
    /// Accounts are identified by email, so such a profile is unusable.
    IncompleteProfile,
    /// The service answered with an error of its own; the payload carries
    /// the provider's error text unchanged.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}
