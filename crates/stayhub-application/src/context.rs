//! Composition root.
//!
//! Everything the app shares (device storage, the session, the cache and the
//! API client) is built here once at startup and handed out by reference.
//! Nothing is constructed as a side effect of loading a module.

use crate::auth_service::AuthService;
use anyhow::{Context, Result};
use stayhub_client::{ApiClient, ApiClientBuilder, NormalizedCache};
use stayhub_core::config::ClientConfig;
use stayhub_core::session::SessionService;
use stayhub_core::storage::KeyValueStore;
use stayhub_infrastructure::{JsonFileStore, SessionStore, StayhubPaths};
use std::sync::Arc;

pub struct AppContext {
    config: ClientConfig,
    storage: Arc<dyn KeyValueStore>,
    session: Arc<SessionStore>,
    client: Arc<ApiClient>,
}

impl AppContext {
    /// Opens `storage.json` in the configured data directory and assembles
    /// the client against the configured endpoint.
    pub async fn bootstrap(config: ClientConfig) -> Result<Self> {
        let path = StayhubPaths::storage_file(config.data_dir.as_ref())
            .context("Failed to resolve storage location")?;
        tracing::debug!(path = %path.display(), "Opening device storage");

        let storage: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(path));
        Self::bootstrap_with_store(config, storage).await
    }

    pub async fn bootstrap_with_store(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        Self::bootstrap_with(config, storage, |builder| builder).await
    }

    /// Like [`bootstrap_with_store`](Self::bootstrap_with_store), letting the
    /// caller adjust the client before it is built (e.g. swap the transport).
    pub async fn bootstrap_with<F>(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        customize: F,
    ) -> Result<Self>
    where
        F: FnOnce(ApiClientBuilder) -> ApiClientBuilder,
    {
        let session = SessionStore::load(Arc::clone(&storage))
            .await
            .context("Failed to restore session")?;
        let session = Arc::new(session);

        let cache = if config.persist_cache {
            NormalizedCache::with_persistence(Arc::clone(&storage))
                .await
                .context("Failed to restore GraphQL cache")?
        } else {
            NormalizedCache::new()
        };

        let session_service: Arc<dyn SessionService> = session.clone();
        let builder = ApiClient::builder(&config, session_service).cache(Arc::new(cache));
        let client = Arc::new(customize(builder).build());

        tracing::info!(
            endpoint = %config.endpoint,
            authenticated = session.is_authenticated(),
            "Stayhub client ready"
        );

        Ok(Self {
            config,
            storage,
            session,
            client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone(), self.session.clone())
    }

    /// Flushes the cache to storage. The context is consumed.
    pub async fn shutdown(self) -> Result<()> {
        self.client
            .cache()
            .flush()
            .await
            .context("Failed to flush GraphQL cache")?;
        tracing::debug!("Stayhub client shut down");
        Ok(())
    }
}
