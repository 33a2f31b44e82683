//! `ApiClient`: the assembled pipeline plus typed entry points.

use crate::cache::NormalizedCache;
use crate::error::ClientError;
use crate::link::{AuthLink, CacheLink, ErrorLink, HttpLink, Link, LinkChain, TokenSource};
use crate::operation::{GraphQLOperation, Operation};
use crate::refresh::{HttpTokenRefresher, RefreshCoordinator, TokenRefresher};
use serde_json::Value;
use stayhub_core::config::{ClientConfig, FetchPolicy};
use stayhub_core::graphql::GraphQLResponse;
use stayhub_core::session::SessionService;
use std::sync::Arc;
use std::time::Duration;

/// Dispatches GraphQL operations through `cache -> error -> auth -> transport`.
///
/// # Example
///
/// ```ignore
/// let client = ApiClient::builder(&config, session.clone()).build();
/// let me = client.query::<MeQuery>(&()).await?;
/// ```
pub struct ApiClient {
    chain: LinkChain,
    cache: Arc<NormalizedCache>,
    session: Arc<dyn SessionService>,
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    pub fn builder(config: &ClientConfig, session: Arc<dyn SessionService>) -> ApiClientBuilder {
        ApiClientBuilder {
            config: config.clone(),
            session,
            transport: None,
            refresher: None,
            cache: None,
            token_source: TokenSource::default(),
        }
    }

    /// Runs an operation and returns the raw response, `errors[]` included.
    pub async fn send(&self, operation: Operation) -> Result<GraphQLResponse, ClientError> {
        self.chain.execute(operation).await
    }

    /// Runs an operation; a response carrying errors becomes
    /// `ClientError::GraphQL`.
    pub async fn execute(&self, operation: Operation) -> Result<Value, ClientError> {
        let response = self.send(operation).await?;
        if response.has_errors() {
            return Err(ClientError::GraphQL(response.errors));
        }
        Ok(response.data.unwrap_or(Value::Null))
    }

    pub async fn query<Q: GraphQLOperation>(
        &self,
        variables: &Q::Variables,
    ) -> Result<Q::Data, ClientError> {
        self.request::<Q>(Q::build(variables)?).await
    }

    pub async fn query_with_policy<Q: GraphQLOperation>(
        &self,
        variables: &Q::Variables,
        policy: FetchPolicy,
    ) -> Result<Q::Data, ClientError> {
        self.request::<Q>(Q::build(variables)?.with_fetch_policy(policy))
            .await
    }

    pub async fn mutate<M: GraphQLOperation>(
        &self,
        variables: &M::Variables,
    ) -> Result<M::Data, ClientError> {
        self.request::<M>(M::build(variables)?).await
    }

    /// Runs a prepared `O` operation (custom headers or policy) and decodes
    /// its data.
    pub async fn request<O: GraphQLOperation>(
        &self,
        operation: Operation,
    ) -> Result<O::Data, ClientError> {
        let data = self.execute(operation).await?;
        serde_json::from_value(data)
            .map_err(|e| ClientError::Decode(format!("{}: {}", O::OPERATION_NAME, e)))
    }

    pub fn cache(&self) -> &Arc<NormalizedCache> {
        &self.cache
    }

    pub fn session(&self) -> &Arc<dyn SessionService> {
        &self.session
    }

    /// Refresh exchanges started by this client so far.
    pub fn refresh_exchanges(&self) -> usize {
        self.coordinator.exchanges()
    }

    /// Stage names in execution order.
    pub fn stages(&self) -> Vec<&'static str> {
        self.chain.names()
    }

    /// Empties the response cache.
    pub async fn reset_store(&self) -> Result<(), ClientError> {
        Ok(self.cache.reset().await?)
    }
}

pub struct ApiClientBuilder {
    config: ClientConfig,
    session: Arc<dyn SessionService>,
    transport: Option<Arc<dyn Link>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    cache: Option<Arc<NormalizedCache>>,
    token_source: TokenSource,
}

impl ApiClientBuilder {
    /// Replaces the HTTP transport with another terminating link.
    pub fn transport(mut self, transport: Arc<dyn Link>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Uses a prepared cache (e.g. one restored from storage).
    pub fn cache(mut self, cache: Arc<NormalizedCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn token_source(mut self, source: TokenSource) -> Self {
        self.token_source = source;
        self
    }

    pub fn build(self) -> ApiClient {
        let timeout = self.config.timeout_secs.map(Duration::from_secs);
        let http = reqwest::Client::new();

        let transport: Arc<dyn Link> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpLink::new(&self.config.endpoint)
                    .with_client(http.clone())
                    .with_timeout(timeout),
            ),
        };
        let refresher: Arc<dyn TokenRefresher> = match self.refresher {
            Some(refresher) => refresher,
            None => Arc::new(
                HttpTokenRefresher::new(&self.config.endpoint)
                    .with_client(http)
                    .with_timeout(timeout),
            ),
        };
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(NormalizedCache::new()));

        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&self.session),
            refresher,
            self.config.refresh_policy,
        ));

        let chain = LinkChain::builder()
            .link(Arc::new(CacheLink::new(
                Arc::clone(&cache),
                self.config.default_fetch_policy,
            )))
            .link(Arc::new(ErrorLink::new(
                Arc::clone(&self.session),
                Arc::clone(&coordinator),
            )))
            .link(Arc::new(
                AuthLink::new(Arc::clone(&self.session)).with_source(self.token_source),
            ))
            .terminate(transport);

        ApiClient {
            chain,
            cache,
            session: self.session,
            coordinator,
        }
    }
}
