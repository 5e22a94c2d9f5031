//! OAuth identity-provider gateway.
//!
//! Member sign-in runs against whichever identity provider issued the
//! authorization code. Providers implement the two-operation capability set
//! consumed by the authentication flow: code-for-token exchange and profile
//! retrieval. Each operation is stateless and independently retryable by
//! the caller; the gateway itself never retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub mod slack;

/// Known identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Slack,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Slack => "slack",
        }
    }
}

/// Input to the authorization-code exchange.
#[derive(Debug, Clone)]
pub struct ExchangeCodeInput {
    /// Single-use code issued by the provider's consent redirect.
    pub code: String,
    /// Must exactly match the redirect URI registered with the provider.
    pub redirect_url: String,
}

/// Tokens returned by the provider's token endpoint.
///
/// A token the provider omitted is the empty string, never an `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExchange {
    pub access_token: String,
    pub refresh_token: String,
}

/// Minimal identity retrieved from the provider's userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
}

/// Trait for OAuth identity providers.
///
/// Implementations are stateless per call and safe to invoke concurrently
/// for different codes and tokens. Additional providers (Google, GitHub)
/// implement the same two operations independently.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Exchange an authorization code for access and refresh tokens.
    ///
    /// Runs at most once per code; providers invalidate authorization codes
    /// after first use, so failures are surfaced to the caller unchanged
    /// rather than retried here.
    async fn exchange_code_for_token(
        &self,
        input: &ExchangeCodeInput,
    ) -> Result<TokenExchange, Error>;

    /// Fetch the profile for an access token obtained from
    /// [`OAuthProvider::exchange_code_for_token`].
    ///
    /// Fails with [`crate::error::ExternalErrorKind::IncompleteProfile`]
    /// when the provider's response carries no email.
    async fn get_profile(&self, access_token: &str) -> Result<Profile, Error>;
}
