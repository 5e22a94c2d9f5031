//! Slack OpenID Connect client.
//!
//! This module provides an HTTP client for Slack's OpenID Connect endpoints,
//! used during member sign-in to exchange an authorization code for tokens
//! and to look up the member's email address.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
use async_trait::async_trait;
use log::*;
use serde::{Deserialize, Serialize};
use service::config::Config;

use super::{ExchangeCodeInput, OAuthProvider, Profile, ProviderKind, TokenExchange};

/// Token response from Slack.
///
/// Slack reports request-level failures as HTTP 200 with `ok: false` and an
/// `error` code instead of a non-success status.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Userinfo response from Slack.
#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Request to exchange authorization code for tokens
#[derive(Debug, Serialize)]
struct TokenExchangeRequest {
    client_id: String,
    client_secret: String,
    code: String,
    redirect_uri: String,
    grant_type: String,
}

/// Configuration for Slack OpenID Connect URLs
#[derive(Debug, Clone)]
pub struct SlackOAuthUrls {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for SlackOAuthUrls {
    fn default() -> Self {
        Self {
            authorize_url: "https://slack.com/openid/connect/authorize".to_string(),
            token_url: "https://slack.com/api/openid.connect.token".to_string(),
            userinfo_url: "https://slack.com/api/openid.connect.userInfo".to_string(),
        }
    }
}

/// Slack OpenID Connect client for member sign-in
#[derive(Debug)]
pub struct SlackOAuthClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    urls: SlackOAuthUrls,
}

impl SlackOAuthClient {
    /// Create a new Slack client with configurable URLs
    pub fn new(client_id: &str, client_secret: &str, urls: SlackOAuthUrls) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            urls,
        })
    }

    /// Create a client from the validated configuration.
    ///
    /// Fails with a config error when the Slack client credentials are
    /// absent, which development mode allows.
    pub fn from_config(config: &Config, urls: SlackOAuthUrls) -> Result<Self, Error> {
        let client_id = config.slack_client_id().ok_or_else(|| {
            warn!("Slack client ID is not configured");
            Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?;
        let client_secret = config.slack_client_secret().ok_or_else(|| {
            warn!("Slack client secret is not configured");
            Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        })?;

        Self::new(&client_id, &client_secret, urls)
    }

    /// Generate the consent URL the member is redirected to.
    ///
    /// `redirect_url` must be the redirect URI registered with Slack for
    /// this client; Slack sends the authorization code there along with the
    /// opaque `state` value.
    pub fn authorization_url(&self, redirect_url: &str, state: &str) -> String {
        let scopes = ["openid", "email", "profile"].join(" ");

        format!(
            "{}?\
            response_type=code&\
            client_id={}&\
            redirect_uri={}&\
            scope={}&\
            state={}",
            self.urls.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_url),
            urlencoding::encode(&scopes),
            urlencoding::encode(state)
        )
    }
}

#[async_trait]
impl OAuthProvider for SlackOAuthClient {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Slack
    }

    /// Exchange authorization code for access and refresh tokens
    async fn exchange_code_for_token(
        &self,
        input: &ExchangeCodeInput,
    ) -> Result<TokenExchange, Error> {
        let request = TokenExchangeRequest {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            code: input.code.clone(),
            redirect_uri: input.redirect_url.clone(),
            grant_type: "authorization_code".to_string(),
        };

        debug!("Exchanging Slack authorization code for tokens");

        let response = self
            .client
            .post(&self.urls.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to exchange Slack authorization code: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            let tokens: TokenResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Slack token response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Slack".to_string(),
                    )),
                }
            })?;

            if let Some(error) = request_level_error(tokens.ok, tokens.error) {
                warn!("Slack rejected the token exchange: {}", error);
                return Err(Error {
                    source: None,
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error)),
                });
            }

            info!("Successfully exchanged Slack authorization code for tokens");
            Ok(TokenExchange {
                access_token: tokens.access_token.unwrap_or_default(),
                refresh_token: tokens.refresh_token.unwrap_or_default(),
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Slack token endpoint error: {}", error_text);
            Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
            })
        }
    }

    /// Get the member's email address using the access token
    async fn get_profile(&self, access_token: &str) -> Result<Profile, Error> {
        let response = self
            .client
            .get(&self.urls.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get Slack user info: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            let user_info: UserInfoResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Slack user info: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Slack".to_string(),
                    )),
                }
            })?;

            if let Some(error) = request_level_error(user_info.ok, user_info.error) {
                warn!("Slack rejected the user info request: {}", error);
                return Err(Error {
                    source: None,
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error)),
                });
            }

            match user_info.email {
                Some(email) if !email.is_empty() => Ok(Profile { email }),
                _ => {
                    warn!("Slack profile has no email address");
                    Err(Error {
                        source: None,
                        error_kind: DomainErrorKind::External(
                            ExternalErrorKind::IncompleteProfile,
                        ),
                    })
                }
            }
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Slack user info error: {}", error_text);
            Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
            })
        }
    }
}

/// Slack-style request-level failure: HTTP 200 with `ok: false`.
fn request_level_error(ok: Option<bool>, error: Option<String>) -> Option<String> {
    match ok {
        Some(false) => Some(error.unwrap_or_else(|| "unknown Slack error".to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(server: &mockito::ServerGuard) -> SlackOAuthClient {
        let urls = SlackOAuthUrls {
            authorize_url: format!("{}/openid/connect/authorize", server.url()),
            token_url: format!("{}/api/openid.connect.token", server.url()),
            userinfo_url: format!("{}/api/openid.connect.userInfo", server.url()),
        };

        SlackOAuthClient::new("test-client-id", "test-client-secret", urls).unwrap()
    }

    fn exchange_input() -> ExchangeCodeInput {
        ExchangeCodeInput {
            code: "one-time-code".to_string(),
            redirect_url: "https://profile.example.com/oauth/slack".to_string(),
        }
    }

    #[tokio::test]
    async fn test_exchange_code_defaults_missing_refresh_token_to_empty() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/openid.connect.token")
            .match_body(mockito::Matcher::Regex(
                "grant_type=authorization_code".to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"access_token":"abc"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let tokens = client
            .exchange_code_for_token(&exchange_input())
            .await
            .unwrap();

        assert_eq!(
            tokens,
            TokenExchange {
                access_token: "abc".to_string(),
                refresh_token: "".to_string(),
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_code_returns_both_tokens_when_present() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/openid.connect.token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"access_token":"abc","refresh_token":"def"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let tokens = client
            .exchange_code_for_token(&exchange_input())
            .await
            .unwrap();

        assert_eq!(tokens.access_token, "abc");
        assert_eq!(tokens.refresh_token, "def");
    }

    #[tokio::test]
    async fn test_exchange_code_surfaces_slack_error_code() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/openid.connect.token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":false,"error":"invalid_code"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let err = client
            .exchange_code_for_token(&exchange_input())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Other("invalid_code".to_string()))
        );
    }

    #[tokio::test]
    async fn test_exchange_code_surfaces_http_error_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/openid.connect.token")
            .with_status(500)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let client = test_client(&server);
        let err = client
            .exchange_code_for_token(&exchange_input())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Other(
                "upstream unavailable".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_get_profile_returns_email() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/openid.connect.userInfo")
            .match_header("authorization", "Bearer abc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"email":"a@b.com"}"#)
            .create_async()
            .await;

        let client = test_client(&server);
        let profile = client.get_profile("abc").await.unwrap();

        assert_eq!(
            profile,
            Profile {
                email: "a@b.com".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_get_profile_without_email_is_incomplete() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/openid.connect.userInfo")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let client = test_client(&server);
        let err = client.get_profile("abc").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::IncompleteProfile)
        );
    }

    #[tokio::test]
    async fn test_from_config_requires_slack_credentials() {
        let config = Config::validate(vec![
            ("ENVIRONMENT".to_string(), "development".to_string()),
            ("ADMIN_DASHBOARD_URL".to_string(), "http://x".to_string()),
            ("API_URL".to_string(), "http://y".to_string()),
            (
                "DATABASE_URL".to_string(),
                "postgres://localhost:5432/platform".to_string(),
            ),
            ("JWT_SECRET".to_string(), "s".to_string()),
            ("REDIS_URL".to_string(), "redis://localhost:6379".to_string()),
            ("SESSION_SECRET".to_string(), "s2".to_string()),
        ])
        .unwrap();

        let err = SlackOAuthClient::from_config(&config, SlackOAuthUrls::default()).unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let client = SlackOAuthClient::new(
            "test-client-id",
            "test-client-secret",
            SlackOAuthUrls::default(),
        )
        .unwrap();

        let url = client.authorization_url("https://profile.example.com/oauth/slack", "xyz");

        assert!(url.starts_with("https://slack.com/openid/connect/authorize?"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fprofile.example.com%2Foauth%2Fslack"));
        assert!(url.contains("scope=openid%20email%20profile"));
        assert!(url.contains("state=xyz"));
    }
}
