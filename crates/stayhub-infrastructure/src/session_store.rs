//! Disk-backed session store.
//!
//! The single source of truth for authentication state. Explicitly
//! constructed at startup and shared by `Arc` with the API client and the UI
//! composition root.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use stayhub_core::session::{
    Profile, Session, SessionEvent, SessionEventKind, SessionKey, SessionService,
};
use stayhub_core::storage::KeyValueStore;
use stayhub_core::{Result, StayhubError};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;

/// Session state held in memory and mirrored to a `KeyValueStore`.
///
/// Values are JSON-encoded before being written, so a token `abc` is stored
/// as the string `"abc"`.
pub struct SessionStore {
    state: RwLock<Session>,
    storage: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Creates an empty, logged-out store. Call [`SessionStore::initialize`]
    /// (or use [`SessionStore::load`]) to pick up a persisted session.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(Session::new()),
            storage,
            events,
        }
    }

    /// Creates a store and loads the persisted session into it.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let store = Self::new(storage);
        store.initialize().await?;
        Ok(store)
    }

    /// Reads `accessToken`, `refreshToken` and `profile` from storage.
    ///
    /// Absent keys load as empty / `None`. A value that is present but not
    /// valid JSON fails with `StayhubError::Serialization` and leaves memory
    /// untouched.
    pub async fn initialize(&self) -> Result<()> {
        let access_token: Option<String> = self.read_json(SessionKey::AccessToken).await?;
        let refresh_token: Option<String> = self.read_json(SessionKey::RefreshToken).await?;
        let profile: Option<Profile> = self.read_json(SessionKey::Profile).await?;

        let mut state = self.write_state();
        state.access_token = access_token.unwrap_or_default();
        state.refresh_token = refresh_token.unwrap_or_default();
        state.profile = profile;

        tracing::debug!(
            authenticated = state.is_authenticated(),
            "Session loaded from storage"
        );
        Ok(())
    }

    /// A copy of the current in-memory session.
    pub fn snapshot(&self) -> Session {
        self.read_state().clone()
    }

    pub fn refresh_token(&self) -> String {
        self.read_state().refresh_token.clone()
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    async fn read_json<T: DeserializeOwned>(&self, key: SessionKey) -> Result<Option<T>> {
        match self.storage.get(key.as_str()).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StayhubError::json(format!("stored '{}'", key), e)),
            None => Ok(None),
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: SessionKey, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.storage.set(key.as_str(), raw).await
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, kind: SessionEventKind) {
        // No subscribers is fine
        let _ = self.events.send(SessionEvent::now(kind));
    }
}

#[async_trait]
impl SessionService for SessionStore {
    fn get_token(&self) -> String {
        self.read_state().access_token.clone()
    }

    fn current_profile(&self) -> Option<Profile> {
        self.read_state().profile.clone()
    }

    async fn save_login(
        &self,
        access_token: String,
        refresh_token: String,
        profile: Profile,
    ) -> Result<()> {
        {
            let mut state = self.write_state();
            state.access_token = access_token.clone();
            state.refresh_token = refresh_token.clone();
            state.profile = Some(profile.clone());
        }

        // Sequential, not transactional: a failure here leaves memory ahead of disk.
        self.write_json(SessionKey::AccessToken, &access_token).await?;
        self.write_json(SessionKey::RefreshToken, &refresh_token).await?;
        self.write_json(SessionKey::Profile, &profile).await?;

        tracing::info!(profile_id = %profile.id, "Login saved");
        self.emit(SessionEventKind::LoggedIn);
        Ok(())
    }

    async fn clear_token(&self) -> Result<()> {
        *self.write_state() = Session::new();

        for key in SessionKey::ALL {
            self.storage.remove(key.as_str()).await?;
        }

        tracing::info!("Session cleared");
        self.emit(SessionEventKind::LoggedOut);
        Ok(())
    }

    async fn stored_access_token(&self) -> Result<Option<String>> {
        let token: Option<String> = self.read_json(SessionKey::AccessToken).await?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    async fn stored_refresh_token(&self) -> Result<Option<String>> {
        let token: Option<String> = self.read_json(SessionKey::RefreshToken).await?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    async fn update_access_token(&self, access_token: String) -> Result<()> {
        self.write_state().access_token = access_token.clone();
        self.write_json(SessionKey::AccessToken, &access_token).await?;

        tracing::debug!("Access token replaced after refresh");
        self.emit(SessionEventKind::TokenRefreshed);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
