//! music::spotify
//!
//! Spotify Web API client.
//!
//! # Authentication
//!
//! Every request asks the [`TokenProvider`] for a bearer token. If the API
//! answers 401, the provider is asked to refresh once and the request is
//! retried once. A second 401, or a failed refresh, is reported as
//! [`MusicError::AuthExpired`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::types::{MusicError, MusicService};
use crate::auth::TokenProvider;
use crate::core::types::{NowPlaying, RecentTrack, Track};

/// Default Spotify Web API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";

/// How many recent tracks to fetch when nothing is playing.
pub const RECENT_LIMIT: u8 = 3;

const USER_AGENT_VALUE: &str = concat!("commit-vibes/", env!("CARGO_PKG_VERSION"));

const UNKNOWN_ARTIST: &str = "Unknown Artist";

// ---- Wire types ----

#[derive(Debug, Deserialize)]
struct CurrentlyPlayingResponse {
    item: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct RecentlyPlayedResponse {
    #[serde(default)]
    items: Vec<PlayHistoryObject>,
}

#[derive(Debug, Deserialize)]
struct PlayHistoryObject {
    track: TrackObject,
    played_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorObject,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    message: String,
}

impl From<TrackObject> for Track {
    fn from(t: TrackObject) -> Self {
        let artist = t
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        Track::new(t.name, artist)
    }
}

/// Low-level Spotify Web API client.
pub struct SpotifyClient {
    client: Client,
    token_provider: Arc<dyn TokenProvider>,
    api_base: String,
}

impl std::fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("api_base", &self.api_base)
            .field("authenticated", &self.token_provider.is_authenticated())
            .finish()
    }
}

impl SpotifyClient {
    /// Create a client against the real Web API.
    pub fn new(token_provider: Arc<dyn TokenProvider>) -> Self {
        Self::with_api_base(token_provider, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base (tests).
    pub fn with_api_base(token_provider: Arc<dyn TokenProvider>, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            token_provider,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// The track that is playing right now, if any.
    ///
    /// A 204, an empty body, or a null `item` (ads, podcasts) all mean
    /// nothing is playing.
    pub async fn currently_playing(&self) -> Result<Option<Track>, MusicError> {
        let response = self.get("/me/player/currently-playing").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = self.success_body(response).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let parsed: CurrentlyPlayingResponse =
            serde_json::from_str(&body).map_err(|e| MusicError::Decode(e.to_string()))?;
        Ok(parsed.item.map(Track::from))
    }

    /// Up to `limit` recently played tracks, newest first.
    pub async fn recently_played(&self, limit: u8) -> Result<Vec<RecentTrack>, MusicError> {
        let response = self
            .get(&format!("/me/player/recently-played?limit={}", limit))
            .await?;
        let body = self.success_body(response).await?;

        let parsed: RecentlyPlayedResponse =
            serde_json::from_str(&body).map_err(|e| MusicError::Decode(e.to_string()))?;
        Ok(parsed
            .items
            .into_iter()
            .map(|item| RecentTrack {
                track: item.track.into(),
                played_at: item.played_at,
            })
            .collect())
    }

    fn headers(token: &str) -> Result<HeaderMap, MusicError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| MusicError::Auth("access token is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        Ok(headers)
    }

    async fn send(&self, url: &str, token: &str) -> Result<Response, MusicError> {
        self.client
            .get(url)
            .headers(Self::headers(token)?)
            .send()
            .await
            .map_err(|e| MusicError::Network(e.without_url().to_string()))
    }

    /// GET with one refresh-and-retry on 401.
    async fn get(&self, path: &str) -> Result<Response, MusicError> {
        let url = format!("{}{}", self.api_base, path);

        let token = self.token_provider.bearer_token().await?;
        let response = self.send(&url, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(path, "access token rejected, refreshing");
        let token = self
            .token_provider
            .refresh_after_rejection(&token)
            .await
            .map_err(|e| match MusicError::from(e) {
                MusicError::Network(msg) => MusicError::Network(msg),
                _ => MusicError::AuthExpired,
            })?;

        let response = self.send(&url, &token).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(path, "refreshed token rejected too");
            return Err(MusicError::AuthExpired);
        }
        Ok(response)
    }

    async fn success_body(&self, response: Response) -> Result<String, MusicError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MusicError::Network(e.without_url().to_string()))?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
        Err(MusicError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Spotify as a [`MusicService`].
#[derive(Debug)]
pub struct SpotifyService {
    client: SpotifyClient,
}

impl SpotifyService {
    pub fn new(client: SpotifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MusicService for SpotifyService {
    fn name(&self) -> &'static str {
        "Spotify"
    }

    async fn now_playing(&self) -> Result<NowPlaying, MusicError> {
        if let Some(track) = self.client.currently_playing().await? {
            return Ok(NowPlaying::Playing(track));
        }

        let recent = self.client.recently_played(RECENT_LIMIT).await?;
        if recent.is_empty() {
            Ok(NowPlaying::Nothing)
        } else {
            Ok(NowPlaying::Recent(recent))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use std::sync::Mutex;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Hands out "tok-0", then "tok-1" after one refresh; a second refresh fails.
    struct CountingProvider {
        refreshes: Mutex<u32>,
    }

    impl CountingProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                refreshes: Mutex::new(0),
            })
        }

        fn refreshes(&self) -> u32 {
            *self.refreshes.lock().unwrap()
        }
    }

    #[async_trait]
    impl TokenProvider for CountingProvider {
        async fn bearer_token(&self) -> Result<String, AuthError> {
            Ok(format!("tok-{}", self.refreshes()))
        }

        async fn refresh_after_rejection(&self, _rejected: &str) -> Result<String, AuthError> {
            let mut n = self.refreshes.lock().unwrap();
            if *n > 0 {
                return Err(AuthError::Expired);
            }
            *n += 1;
            Ok(format!("tok-{}", *n))
        }

        fn is_authenticated(&self) -> bool {
            true
        }
    }

    fn track_json(name: &str, artist: &str) -> serde_json::Value {
        serde_json::json!({ "name": name, "artists": [{ "name": artist }, { "name": "Feature" }] })
    }

    #[tokio::test]
    async fn currently_playing_parses_first_artist() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .and(header("authorization", "Bearer tok-0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "is_playing": true,
                "item": track_json("Digital Love", "Daft Punk")
            })))
            .mount(&server)
            .await;

        let client = SpotifyClient::with_api_base(CountingProvider::new(), &server.uri());
        let track = client.currently_playing().await.unwrap();
        assert_eq!(track, Some(Track::new("Digital Love", "Daft Punk")));
    }

    #[tokio::test]
    async fn no_content_falls_back_to_recent_tracks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/player/recently-played"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    { "track": track_json("One", "A"), "played_at": "2026-01-10T12:00:00.000Z" },
                    { "track": track_json("Two", "B"), "played_at": "2026-01-10T11:00:00.000Z" }
                ]
            })))
            .mount(&server)
            .await;

        let service = SpotifyService::new(SpotifyClient::with_api_base(
            CountingProvider::new(),
            &server.uri(),
        ));
        match service.now_playing().await.unwrap() {
            NowPlaying::Recent(tracks) => {
                assert_eq!(tracks.len(), 2);
                assert_eq!(tracks[0].track.name, "One");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_history_is_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "item": null })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/player/recently-played"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
            .mount(&server)
            .await;

        let service = SpotifyService::new(SpotifyClient::with_api_base(
            CountingProvider::new(),
            &server.uri(),
        ));
        assert_eq!(service.now_playing().await.unwrap(), NowPlaying::Nothing);
    }

    #[tokio::test]
    async fn unauthorized_refreshes_once_and_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .and(header("authorization", "Bearer tok-0"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "item": track_json("After Refresh", "X")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CountingProvider::new();
        let client = SpotifyClient::with_api_base(provider.clone(), &server.uri());
        let track = client.currently_playing().await.unwrap();

        assert_eq!(track.map(|t| t.name), Some("After Refresh".to_string()));
        assert_eq!(provider.refreshes(), 1);
    }

    #[tokio::test]
    async fn second_unauthorized_is_auth_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let provider = CountingProvider::new();
        let client = SpotifyClient::with_api_base(provider.clone(), &server.uri());
        let err = client.currently_playing().await.unwrap_err();

        assert!(matches!(err, MusicError::AuthExpired));
        assert_eq!(provider.refreshes(), 1);
    }

    #[tokio::test]
    async fn api_error_message_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/player/recently-played"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": { "status": 429, "message": "API rate limit exceeded" }
            })))
            .mount(&server)
            .await;

        let client = SpotifyClient::with_api_base(CountingProvider::new(), &server.uri());
        match client.recently_played(3).await {
            Err(MusicError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "API rate limit exceeded");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_artists_reads_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/player/currently-playing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "item": { "name": "Lonely", "artists": [] }
            })))
            .mount(&server)
            .await;

        let client = SpotifyClient::with_api_base(CountingProvider::new(), &server.uri());
        let track = client.currently_playing().await.unwrap().unwrap();
        assert_eq!(track.artist, UNKNOWN_ARTIST);
    }
}
