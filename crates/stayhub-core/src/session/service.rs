//! Session capability trait.
//!
//! Defines the interface the API client and UI composition root use to read
//! and mutate authentication state. The concrete store lives in
//! `stayhub-infrastructure`.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::model::{Profile, SessionEvent};
use crate::error::Result;

/// Authentication capability.
///
/// # Consistency
///
/// Mutating calls update memory before storage, so synchronous readers see
/// the new values immediately; awaiting the call guarantees storage has
/// caught up. Nothing here is transactional across keys.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Current in-memory access token. Empty when logged out. No freshness check.
    fn get_token(&self) -> String;

    /// Current in-memory profile.
    fn current_profile(&self) -> Option<Profile>;

    fn is_authenticated(&self) -> bool {
        self.current_profile().is_some()
    }

    /// Records a successful login in memory, then persists each key in turn.
    async fn save_login(
        &self,
        access_token: String,
        refresh_token: String,
        profile: Profile,
    ) -> Result<()>;

    /// Resets memory to the logged-out state and removes every session key
    /// from storage. Safe to call repeatedly.
    async fn clear_token(&self) -> Result<()>;

    /// Access token as currently persisted, bypassing memory.
    async fn stored_access_token(&self) -> Result<Option<String>>;

    /// Refresh token as currently persisted, bypassing memory.
    async fn stored_refresh_token(&self) -> Result<Option<String>>;

    /// Installs a freshly exchanged access token in memory and storage.
    async fn update_access_token(&self, access_token: String) -> Result<()>;

    /// Subscribes to session transitions.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}
