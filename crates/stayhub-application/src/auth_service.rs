//! Authentication use cases.

use crate::operations::{LoginMutation, LoginVariables, MeQuery};
use anyhow::{Context, Result};
use stayhub_client::{ApiClient, GraphQLOperation};
use stayhub_core::config::FetchPolicy;
use stayhub_core::session::{Profile, SessionEvent, SessionService};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Login, logout and profile lookups over a shared client and session.
#[derive(Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
    session: Arc<dyn SessionService>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>, session: Arc<dyn SessionService>) -> Self {
        Self { client, session }
    }

    /// Signs in and persists the returned tokens and profile.
    ///
    /// The login result is never written to the response cache.
    pub async fn login(&self, email: &str, password: &str) -> Result<Profile> {
        let variables = LoginVariables {
            email: email.to_string(),
            password: password.to_string(),
        };
        let operation = LoginMutation::build(&variables)?.with_fetch_policy(FetchPolicy::NoCache);
        let data = self
            .client
            .request::<LoginMutation>(operation)
            .await
            .context("Login failed")?;

        let payload = data.login;
        self.session
            .save_login(
                payload.access_token,
                payload.refresh_token,
                payload.profile.clone(),
            )
            .await
            .context("Failed to persist login")?;

        tracing::info!(user = %payload.profile.id, "Logged in");
        Ok(payload.profile)
    }

    /// Clears the session and the response cache.
    pub async fn logout(&self) -> Result<()> {
        self.session
            .clear_token()
            .await
            .context("Failed to clear session")?;
        self.client
            .reset_store()
            .await
            .context("Failed to reset GraphQL cache")?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub fn current_profile(&self) -> Option<Profile> {
        self.session.current_profile()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Fetches the caller's profile; `fresh` skips the cache read.
    pub async fn fetch_me(&self, fresh: bool) -> Result<Profile> {
        let data = if fresh {
            self.client
                .query_with_policy::<MeQuery>(&(), FetchPolicy::NetworkOnly)
                .await
        } else {
            self.client.query::<MeQuery>(&()).await
        }
        .context("Failed to fetch profile")?;
        Ok(data.me)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use crate::context::AppContext;
    use crate::test_support::FakeServer;
    use stayhub_client::ClientError;
    use stayhub_core::config::ClientConfig;
    use stayhub_core::graphql::ErrorAction;
    use stayhub_core::session::{SessionEventKind, SessionService};
    use stayhub_core::storage::KeyValueStore;
    use stayhub_infrastructure::MemoryStore;
    use std::sync::Arc;

    async fn context(server: Arc<FakeServer>) -> (AppContext, MemoryStore) {
        let store = MemoryStore::new();
        let storage: Arc<dyn KeyValueStore> = Arc::new(store.clone());
        let ctx = AppContext::bootstrap_with(ClientConfig::default(), storage, |b| {
            b.transport(server)
        })
        .await
        .unwrap();
        (ctx, store)
    }

    #[tokio::test]
    async fn test_login_saves_session() {
        let server = FakeServer::new();
        let (ctx, store) = context(server.clone()).await;
        let auth = ctx.auth();
        let mut events = auth.subscribe();

        let profile = auth.login("mika@example.com", "secret").await.unwrap();

        assert_eq!(profile.name.as_deref(), Some("Mika"));
        assert!(auth.is_authenticated());
        assert_eq!(auth.current_profile(), Some(profile));
        assert_eq!(ctx.session().get_token(), "access-1");
        assert_eq!(
            store.get("refreshToken").await.unwrap(),
            Some("\"refresh-1\"".to_string())
        );
        assert_eq!(events.try_recv().unwrap().kind, SessionEventKind::LoggedIn);
        assert!(ctx.client().cache().snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_login_leaves_session_empty() {
        let server = FakeServer::new();
        let (ctx, _store) = context(server.clone()).await;

        let err = ctx.auth().login("mika@example.com", "wrong").await.unwrap_err();

        let client_err = err.downcast_ref::<ClientError>().unwrap();
        assert!(client_err.graphql_errors().is_some());
        assert!(!ctx.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_fetch_me_uses_cache_unless_fresh() {
        let server = FakeServer::new();
        let (ctx, _store) = context(server.clone()).await;
        let auth = ctx.auth();
        auth.login("mika@example.com", "secret").await.unwrap();

        auth.fetch_me(false).await.unwrap();
        auth.fetch_me(false).await.unwrap();
        let me = auth.fetch_me(true).await.unwrap();

        assert_eq!(me.id, "user-1");
        assert_eq!(server.calls("Me"), 2);
        assert_eq!(server.last_bearer().as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_cache() {
        let server = FakeServer::new();
        let (ctx, store) = context(server.clone()).await;
        let auth = ctx.auth();
        auth.login("mika@example.com", "secret").await.unwrap();
        auth.fetch_me(false).await.unwrap();

        auth.logout().await.unwrap();

        assert!(!auth.is_authenticated());
        assert!(ctx.session().snapshot().is_cleared());
        assert!(ctx.client().cache().snapshot().await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_server_logout_is_reflected_in_service() {
        let server = FakeServer::new();
        let (ctx, _store) = context(server.clone()).await;
        let auth = ctx.auth();
        auth.login("mika@example.com", "secret").await.unwrap();

        server.revoke();
        let err = auth.fetch_me(true).await.unwrap_err();

        let client_err = err.downcast_ref::<ClientError>().unwrap();
        assert!(client_err.has_action(ErrorAction::Logout));
        assert!(!auth.is_authenticated());
    }
}
