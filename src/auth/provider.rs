//! auth::provider
//!
//! SpotifyAuthManager - TokenProvider implementation for the Spotify token file.
//!
//! # Refresh Policy
//!
//! At most one refresh per manager (that is, per invocation). A refresh is
//! triggered either because the stored expiry has passed, or because the
//! API rejected the current token. Refreshes run under [`AuthLock`], and
//! the token file is re-read after taking the lock so that a refresh done
//! by another process is picked up instead of repeated.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::errors::AuthError;
use super::lock::{AuthLock, DEFAULT_LOCK_TIMEOUT};
use super::oauth::OAuthClient;
use super::token_bundle::{TokenBundle, TokenInfo};
use super::TokenProvider;
use crate::secrets::SecretStore;

/// Spotify authentication manager.
pub struct SpotifyAuthManager {
    store: Box<dyn SecretStore>,
    lock_path: PathBuf,
    oauth: OAuthClient,
    /// Cached token bundle.
    cache: RwLock<Option<TokenBundle>>,
    /// Set once the single refresh attempt has been spent.
    refresh_attempted: AtomicBool,
}

impl SpotifyAuthManager {
    /// Create a new auth manager.
    ///
    /// # Arguments
    ///
    /// * `store` - Where the token bundle lives
    /// * `lock_path` - Lock file guarding refresh
    /// * `oauth` - Client used to refresh tokens
    pub fn new(store: Box<dyn SecretStore>, lock_path: PathBuf, oauth: OAuthClient) -> Self {
        Self {
            store,
            lock_path,
            oauth,
            cache: RwLock::new(None),
            refresh_attempted: AtomicBool::new(false),
        }
    }

    /// Load the token bundle from the store, bypassing the cache.
    pub fn load_bundle(&self) -> Result<Option<TokenBundle>, AuthError> {
        match self.store.read()? {
            Some(json) => Ok(Some(TokenBundle::parse(&json)?)),
            None => Ok(None),
        }
    }

    fn save_bundle(&self, bundle: &TokenBundle) -> Result<(), AuthError> {
        let json = bundle.to_json()?;
        self.store.write(&json)?;
        Ok(())
    }

    fn update_cache(&self, bundle: Option<TokenBundle>) {
        if let Ok(mut cache) = self.cache.write() {
            *cache = bundle;
        }
    }

    fn get_or_load_bundle(&self) -> Result<Option<TokenBundle>, AuthError> {
        if let Ok(cache) = self.cache.read() {
            if let Some(ref bundle) = *cache {
                return Ok(Some(bundle.clone()));
            }
        }

        let bundle = self.load_bundle()?;
        if bundle.is_some() {
            self.update_cache(bundle.clone());
        }
        Ok(bundle)
    }

    /// Refresh under the lock, unless someone else already did.
    ///
    /// `stale` is the access token we know to be bad (or about to be).
    async fn refresh_with_lock(&self, stale: &str) -> Result<TokenBundle, AuthError> {
        if self.refresh_attempted.swap(true, Ordering::SeqCst) {
            tracing::debug!("refresh already attempted this run");
            return Err(AuthError::Expired);
        }

        let _lock = AuthLock::acquire(&self.lock_path, DEFAULT_LOCK_TIMEOUT)?;

        let bundle = self.load_bundle()?.ok_or(AuthError::NotAuthenticated)?;

        if bundle.tokens.access_token != stale && !bundle.needs_refresh() {
            tracing::debug!("token refreshed by another process");
            self.update_cache(Some(bundle.clone()));
            return Ok(bundle);
        }

        tracing::debug!("refreshing access token");
        let tokens = self.oauth.refresh(&bundle.tokens.refresh_token).await?;
        let new_bundle = bundle.with_refreshed_tokens(tokens);

        self.save_bundle(&new_bundle)?;
        self.update_cache(Some(new_bundle.clone()));
        Ok(new_bundle)
    }

    /// Store a new token bundle after connecting.
    pub fn store_tokens(&self, tokens: TokenInfo) -> Result<TokenBundle, AuthError> {
        let bundle = TokenBundle::new(tokens);
        self.save_bundle(&bundle)?;
        self.update_cache(Some(bundle.clone()));
        Ok(bundle)
    }

    /// Delete the token file. Returns whether one existed.
    pub fn delete_tokens(&self) -> Result<bool, AuthError> {
        let removed = self.store.remove()?;
        self.update_cache(None);
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl TokenProvider for SpotifyAuthManager {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        let bundle = self
            .get_or_load_bundle()?
            .ok_or(AuthError::NotAuthenticated)?;

        if bundle.needs_refresh() {
            let refreshed = self.refresh_with_lock(&bundle.tokens.access_token).await?;
            return Ok(refreshed.tokens.access_token);
        }

        Ok(bundle.tokens.access_token)
    }

    async fn refresh_after_rejection(&self, rejected: &str) -> Result<String, AuthError> {
        let refreshed = self.refresh_with_lock(rejected).await?;
        Ok(refreshed.tokens.access_token)
    }

    fn is_authenticated(&self) -> bool {
        matches!(self.get_or_load_bundle(), Ok(Some(_)))
    }
}

impl std::fmt::Debug for SpotifyAuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyAuthManager")
            .field("lock_path", &self.lock_path)
            .field("is_authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
