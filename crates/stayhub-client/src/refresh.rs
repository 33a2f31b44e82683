//! Refresh-token exchange.
//!
//! The exchange is a dedicated `RefreshToken` mutation sent outside the link
//! chain, authenticated with the refresh token itself.

use crate::error::ClientError;
use crate::link::decode_body;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::Client;
use serde_json::json;
use stayhub_core::config::RefreshPolicy;
use stayhub_core::graphql::{GraphQLRequest, GraphQLResponse};
use stayhub_core::session::SessionService;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

pub const REFRESH_TOKEN_OPERATION: &str = "RefreshToken";
pub const REFRESH_TOKEN_MUTATION: &str =
    "mutation RefreshToken($token:String!) { refreshToken(token:$token) }";

/// Trades a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<String, ClientError>;
}

/// [`TokenRefresher`] that calls the GraphQL endpoint directly.
#[derive(Clone)]
pub struct HttpTokenRefresher {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpTokenRefresher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<String, ClientError> {
        let body = GraphQLRequest {
            operation_name: Some(REFRESH_TOKEN_OPERATION.to_string()),
            query: REFRESH_TOKEN_MUTATION.to_string(),
            variables: json!({ "token": refresh_token }),
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(refresh_token)
            .json(&body);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        extract_token(decode_body(status.as_u16(), status.is_success(), &body)?)
    }
}

fn extract_token(response: GraphQLResponse) -> Result<String, ClientError> {
    if response.has_errors() {
        return Err(ClientError::GraphQL(response.errors));
    }
    response
        .data
        .as_ref()
        .and_then(|data| data.get("refreshToken"))
        .and_then(|token| token.as_str())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ClientError::Decode("response has no data.refreshToken".to_string()))
}

type SharedExchange = Shared<BoxFuture<'static, Result<String, ClientError>>>;

/// Runs refresh exchanges on behalf of the error stage.
///
/// Under [`RefreshPolicy::SingleFlight`] at most one exchange is in flight;
/// operations that go stale meanwhile await that exchange and share its
/// outcome. Under [`RefreshPolicy::Independent`] each caller runs its own.
pub struct RefreshCoordinator {
    session: Arc<dyn SessionService>,
    refresher: Arc<dyn TokenRefresher>,
    policy: RefreshPolicy,
    inflight: Mutex<Option<SharedExchange>>,
    exchanges: AtomicUsize,
}

impl RefreshCoordinator {
    pub fn new(
        session: Arc<dyn SessionService>,
        refresher: Arc<dyn TokenRefresher>,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            session,
            refresher,
            policy,
            inflight: Mutex::new(None),
            exchanges: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Number of exchanges started so far.
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    /// Obtains a fresh access token, persisting it before returning.
    pub async fn refresh(&self) -> Result<String, ClientError> {
        match self.policy {
            RefreshPolicy::Independent => self.start().await,
            RefreshPolicy::SingleFlight => {
                let shared = {
                    let mut inflight = self.inflight.lock().await;
                    match inflight.as_ref() {
                        Some(existing) => {
                            tracing::debug!("Joining in-flight token refresh");
                            existing.clone()
                        }
                        None => {
                            let exchange = self.start().boxed().shared();
                            *inflight = Some(exchange.clone());
                            exchange
                        }
                    }
                };

                let outcome = shared.clone().await;

                let mut inflight = self.inflight.lock().await;
                if inflight.as_ref().is_some_and(|current| current.ptr_eq(&shared)) {
                    *inflight = None;
                }
                outcome
            }
        }
    }

    fn start(&self) -> impl Future<Output = Result<String, ClientError>> + Send + 'static {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        exchange(Arc::clone(&self.session), Arc::clone(&self.refresher))
    }
}

async fn exchange(
    session: Arc<dyn SessionService>,
    refresher: Arc<dyn TokenRefresher>,
) -> Result<String, ClientError> {
    let refresh_token = session
        .stored_refresh_token()
        .await?
        .ok_or(ClientError::MissingRefreshToken)?;

    tracing::info!("Exchanging refresh token");
    let access_token = refresher
        .refresh(&refresh_token)
        .await
        .map_err(|e| match e {
            ClientError::RefreshFailed(_) => e,
            other => ClientError::RefreshFailed(other.to_string()),
        })?;

    session.update_access_token(access_token.clone()).await?;
    Ok(access_token)
}
