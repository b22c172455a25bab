//! auth::oauth
//!
//! HTTP client for the Spotify authorization-code flow.
//!
//! # Flow
//!
//! 1. Send the user to [`OAuthClient::authorize_url`] with a random `state`
//! 2. The browser comes back to the redirect URI with `?code=...&state=...`
//! 3. [`OAuthClient::exchange_code`] trades the code for tokens
//! 4. Later, [`OAuthClient::refresh`] trades the refresh token for a new access token
//!
//! Token requests use HTTP Basic client authentication.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::errors::AuthError;
use super::token_bundle::TokenInfo;
use crate::core::config::SpotifyCredentials;

/// Default Spotify accounts service.
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Scopes needed to read the current and recent tracks.
pub const SCOPES: &str = "user-read-currently-playing user-read-recently-played";

/// User-Agent header for OAuth requests.
const USER_AGENT: &str = concat!("commit-vibes/", env!("CARGO_PKG_VERSION"));

/// Successful token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    pub token_type: Option<String>,

    /// Seconds until the access token expires.
    pub expires_in: Option<u64>,

    /// Absent on refresh when the old refresh token stays valid.
    pub refresh_token: Option<String>,

    pub scope: Option<String>,
}

/// Error body from the accounts service.
#[derive(Debug, Clone, Deserialize)]
struct OAuthErrorBody {
    error: String,
    error_description: Option<String>,
}

impl OAuthErrorBody {
    fn describe(&self) -> String {
        match &self.error_description {
            Some(desc) if !desc.is_empty() => format!("{}: {}", self.error, desc),
            _ => self.error.clone(),
        }
    }
}

/// Client for the Spotify accounts service.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client: Client,
    accounts_base: String,
    credentials: SpotifyCredentials,
}

impl OAuthClient {
    /// Create a client against the real accounts service.
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self::with_base(credentials, DEFAULT_ACCOUNTS_BASE)
    }

    /// Create a client against a custom accounts base URL (tests).
    pub fn with_base(credentials: SpotifyCredentials, accounts_base: &str) -> Self {
        Self {
            client: Client::new(),
            accounts_base: accounts_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn redirect_uri(&self) -> &str {
        &self.credentials.redirect_uri
    }

    fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_base)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(USER_AGENT),
        );
        headers
    }

    /// Build the consent page URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Listener`] if the accounts base is not a URL.
    pub fn authorize_url(&self, state: &str) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            &format!("{}/authorize", self.accounts_base),
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("state", state),
                ("scope", SCOPES),
            ],
        )
        .map_err(|e| AuthError::Listener(format!("invalid accounts URL: {}", e)))?;
        Ok(url.into())
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Api`] if Spotify rejects the code
    /// - [`AuthError::Network`] on transport failure
    pub async fn exchange_code(&self, code: &str) -> Result<TokenInfo, AuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ];

        match self.post_token(&form).await? {
            Ok(response) => {
                let refresh_token = response.refresh_token.ok_or_else(|| AuthError::Api {
                    status: 200,
                    message: "token response had no refresh_token".to_string(),
                })?;
                Ok(TokenInfo::new(
                    response.access_token,
                    response.expires_in,
                    refresh_token,
                    response.scope,
                ))
            }
            Err((status, err)) => Err(AuthError::Api {
                status,
                message: err.describe(),
            }),
        }
    }

    /// Refresh an access token.
    ///
    /// If the response carries no new refresh token, the old one is kept.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Expired`] if the refresh token was revoked (`invalid_grant`)
    /// - [`AuthError::RefreshFailed`] for other rejections
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenInfo, AuthError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        match self.post_token(&form).await? {
            Ok(response) => Ok(TokenInfo::new(
                response.access_token,
                response.expires_in,
                response
                    .refresh_token
                    .unwrap_or_else(|| refresh_token.to_string()),
                response.scope,
            )),
            Err((_, err)) if err.error == "invalid_grant" => Err(AuthError::Expired),
            Err((status, err)) => Err(AuthError::RefreshFailed(format!(
                "{} ({})",
                err.describe(),
                status
            ))),
        }
    }

    /// POST to the token endpoint.
    ///
    /// The outer error is transport; the inner `Err` is a parsed rejection.
    async fn post_token(
        &self,
        form: &[(&str, &str)],
    ) -> Result<Result<TokenResponse, (u16, OAuthErrorBody)>, AuthError> {
        let response = self
            .client
            .post(self.token_url())
            .headers(self.headers())
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let parsed = serde_json::from_str(&body).map_err(|e| AuthError::Api {
                status: status.as_u16(),
                message: format!("failed to parse token response: {}", e),
            })?;
            return Ok(Ok(parsed));
        }

        tracing::debug!(status = status.as_u16(), "token endpoint rejected request");
        match serde_json::from_str::<OAuthErrorBody>(&body) {
            Ok(err) => Ok(Err((status.as_u16(), err))),
            Err(_) => Err(AuthError::Api {
                status: status.as_u16(),
                message: truncate(&body, 200),
            }),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> SpotifyCredentials {
        SpotifyCredentials {
            client_id: "client-abc".into(),
            client_secret: "secret-xyz".into(),
            redirect_uri: "http://localhost:3000".into(),
        }
    }

    #[test]
    fn authorize_url_carries_all_params() {
        let client = OAuthClient::new(credentials());
        let url = Url::parse(&client.authorize_url("state-123").unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("accounts.spotify.com"));
        assert_eq!(url.path(), "/authorize");
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "client-abc");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["redirect_uri"], "http://localhost:3000");
        assert_eq!(pairs["state"], "state-123");
        assert_eq!(pairs["scope"], SCOPES);
        assert!(!pairs.contains_key("client_secret"));
    }

    #[tokio::test]
    async fn exchange_code_posts_form_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header_exists("authorization"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "acc",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "ref",
                "scope": SCOPES
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::with_base(credentials(), &server.uri());
        let tokens = client.exchange_code("the-code").await.expect("exchange");

        assert_eq!(tokens.access_token, "acc");
        assert_eq!(tokens.refresh_token, "ref");
        assert!(tokens.access_token_expires_at.is_some());
    }

    #[tokio::test]
    async fn refresh_keeps_old_refresh_token_when_omitted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::with_base(credentials(), &server.uri());
        let tokens = client.refresh("old-refresh").await.expect("refresh");

        assert_eq!(tokens.access_token, "fresh");
        assert_eq!(tokens.refresh_token, "old-refresh");
    }

    #[tokio::test]
    async fn invalid_grant_maps_to_expired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Refresh token revoked"
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::with_base(credentials(), &server.uri());
        let err = client.refresh("dead").await.unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[tokio::test]
    async fn exchange_rejection_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_client"
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::with_base(credentials(), &server.uri());
        match client.exchange_code("c").await {
            Err(AuthError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("invalid_client"));
                assert!(!message.contains("secret-xyz"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
