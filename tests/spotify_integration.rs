//! Integration tests for the Spotify stack: token file, refresh, and API.
//!
//! A wiremock server plays both the accounts service and the Web API. The
//! token file is a real file in a temp directory.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use commit_vibes::auth::{OAuthClient, SpotifyAuthManager, TokenBundle, TokenInfo};
use commit_vibes::core::config::SpotifyCredentials;
use commit_vibes::core::paths::AppPaths;
use commit_vibes::core::types::{NowPlaying, Track};
use commit_vibes::music::{MusicError, MusicService, SpotifyClient, SpotifyService};
use commit_vibes::secrets;

// =============================================================================
// Fixtures
// =============================================================================

struct Fixture {
    _home: TempDir,
    paths: AppPaths,
    server: MockServer,
}

impl Fixture {
    /// A connected account whose stored access token is `acc-1`.
    async fn connected() -> Self {
        let home = TempDir::new().expect("failed to create temp dir");
        let paths = AppPaths::new(home.path().to_path_buf());
        let server = MockServer::start().await;

        let fixture = Self {
            _home: home,
            paths,
            server,
        };
        fixture
            .manager()
            .store_tokens(TokenInfo::new(
                "acc-1".to_string(),
                None,
                "refresh-1".to_string(),
                None,
            ))
            .expect("failed to store tokens");
        fixture
    }

    fn manager(&self) -> SpotifyAuthManager {
        let credentials = SpotifyCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:3000".to_string(),
        };
        SpotifyAuthManager::new(
            secrets::create_store(&self.paths),
            self.paths.lock_path(),
            OAuthClient::with_base(credentials, &self.server.uri()),
        )
    }

    fn service(&self) -> SpotifyService {
        let client = SpotifyClient::with_api_base(
            Arc::new(self.manager()),
            &format!("{}/v1", self.server.uri()),
        );
        SpotifyService::new(client)
    }

    fn stored_access_token(&self) -> String {
        let raw = secrets::create_store(&self.paths)
            .read()
            .unwrap()
            .expect("token file missing");
        TokenBundle::parse(&raw).unwrap().tokens.access_token
    }
}

fn refreshed_token_response(access_token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "user-read-currently-playing user-read-recently-played"
    }))
}

fn playing_body(name: &str, artist: &str) -> serde_json::Value {
    json!({
        "is_playing": true,
        "item": { "name": name, "artists": [{ "name": artist }, { "name": "Someone Else" }] }
    })
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn currently_playing_track() {
    let fx = Fixture::connected().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .and(header("authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playing_body("Song", "Artist")))
        .expect(1)
        .mount(&fx.server)
        .await;

    let now = fx.service().now_playing().await.unwrap();
    assert_eq!(now, NowPlaying::Playing(Track::new("Song", "Artist")));
}

#[tokio::test]
async fn nothing_playing_falls_back_to_recent() {
    let fx = Fixture::connected().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&fx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/recently-played"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "track": { "name": "Newest", "artists": [{ "name": "A" }] },
                    "played_at": "2024-05-01T12:00:00Z"
                },
                {
                    "track": { "name": "Older", "artists": [] },
                    "played_at": "2024-05-01T11:00:00Z"
                }
            ]
        })))
        .expect(1)
        .mount(&fx.server)
        .await;

    match fx.service().now_playing().await.unwrap() {
        NowPlaying::Recent(tracks) => {
            assert_eq!(tracks.len(), 2);
            assert_eq!(tracks[0].track, Track::new("Newest", "A"));
            assert_eq!(tracks[1].track.artist, "Unknown Artist");
        }
        other => panic!("expected recent tracks, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_history_is_nothing() {
    let fx = Fixture::connected().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&fx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/recently-played"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&fx.server)
        .await;

    assert_eq!(fx.service().now_playing().await.unwrap(), NowPlaying::Nothing);
}

#[tokio::test]
async fn rejected_token_is_refreshed_once_and_saved() {
    let fx = Fixture::connected().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .and(header("authorization", "Bearer acc-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&fx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .and(header("authorization", "Bearer acc-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playing_body("Song", "Artist")))
        .expect(1)
        .mount(&fx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(refreshed_token_response("acc-2"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let now = fx.service().now_playing().await.unwrap();
    assert_eq!(now, NowPlaying::Playing(Track::new("Song", "Artist")));
    assert_eq!(fx.stored_access_token(), "acc-2");
}

#[tokio::test]
async fn expired_token_triggers_exactly_one_refresh() {
    let fx = Fixture::connected().await;
    // Every token is rejected, including the refreshed one.
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&fx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(refreshed_token_response("acc-2"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let result = fx.service().now_playing().await;
    assert!(matches!(result, Err(MusicError::AuthExpired)));
}

#[tokio::test]
async fn revoked_refresh_token_is_auth_expired() {
    let fx = Fixture::connected().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&fx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Refresh token revoked"
        })))
        .expect(1)
        .mount(&fx.server)
        .await;

    let result = fx.service().now_playing().await;
    assert!(matches!(result, Err(MusicError::AuthExpired)));
    // The stored bundle is left as it was.
    assert_eq!(fx.stored_access_token(), "acc-1");
}

#[tokio::test]
async fn api_error_message_is_surfaced() {
    let fx = Fixture::connected().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "status": 429, "message": "API rate limit exceeded" }
        })))
        .mount(&fx.server)
        .await;

    match fx.service().now_playing().await {
        Err(MusicError::Api { status, message }) => {
            assert_eq!(status, 429);
            assert_eq!(message, "API rate limit exceeded");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_token_file_is_not_connected() {
    let fx = Fixture::connected().await;
    assert!(secrets::create_store(&fx.paths).remove().unwrap());

    let result = fx.service().now_playing().await;
    assert!(matches!(result, Err(MusicError::NotConnected)));
}

#[test]
fn token_file_round_trips() {
    let home = TempDir::new().unwrap();
    let paths = AppPaths::new(home.path().to_path_buf());
    let store = secrets::create_store(&paths);

    let bundle = TokenBundle::new(TokenInfo::new(
        "access".to_string(),
        Some(3600),
        "refresh".to_string(),
        None,
    ));
    store.write(&bundle.to_json().unwrap()).unwrap();

    let read = TokenBundle::parse(&store.read().unwrap().unwrap()).unwrap();
    assert_eq!(read.tokens, bundle.tokens);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(paths.token_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
