#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use stayhub_client::{ApiClient, ClientError, Link, Next, Operation, TokenRefresher};
use stayhub_core::config::{ClientConfig, RefreshPolicy};
use stayhub_core::graphql::{ErrorAction, GraphQLError, GraphQLResponse};
use stayhub_core::session::{Profile, SessionService};
use stayhub_core::storage::KeyValueStore;
use stayhub_infrastructure::{MemoryStore, SessionStore};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the transport saw for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub operation: String,
    pub bearer: Option<String>,
}

type Responder = Box<dyn Fn(&Operation) -> Result<GraphQLResponse, ClientError> + Send + Sync>;

/// Terminating link that replays queued responses, then falls back to a
/// responder.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<GraphQLResponse, ClientError>>>,
    responder: Responder,
    requests: Mutex<Vec<Recorded>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::with_responder(|_| Ok(GraphQLResponse::from_data(json!({ "ok": true }))))
    }

    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&Operation) -> Result<GraphQLResponse, ClientError> + Send + Sync + 'static,
    {
        Self {
            script: Mutex::new(VecDeque::new()),
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push(&self, response: Result<GraphQLResponse, ClientError>) {
        self.script.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.requests().into_iter().map(|r| r.bearer).collect()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Link for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn request(
        &self,
        operation: Operation,
        _next: Next<'_>,
    ) -> Result<GraphQLResponse, ClientError> {
        self.requests.lock().unwrap().push(Recorded {
            operation: operation.name().to_string(),
            bearer: operation.bearer().map(str::to_string),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(response) => response,
            None => (self.responder)(&operation),
        }
    }
}

/// Refresher that counts exchanges and hands out `fresh-<n>` tokens.
pub struct CountingRefresher {
    calls: AtomicUsize,
    received: Mutex<Vec<String>>,
    fail_with: Option<ClientError>,
    delay: Option<Duration>,
}

impl CountingRefresher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            fail_with: None,
            delay: None,
        }
    }

    pub fn failing(error: ClientError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens presented, in call order.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenRefresher for CountingRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<String, ClientError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.received.lock().unwrap().push(refresh_token.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(format!("fresh-{}", n)),
        }
    }
}

pub fn profile() -> Profile {
    Profile::new("user-1")
        .with_name("Mika")
        .with_email("mika@example.com")
}

pub fn action_error(message: &str, action: ErrorAction) -> GraphQLResponse {
    GraphQLResponse::from_errors(vec![GraphQLError::new(message).with_action(action)])
}

pub fn data(value: Value) -> Result<GraphQLResponse, ClientError> {
    Ok(GraphQLResponse::from_data(value))
}

/// A session over a fresh in-memory store.
pub async fn session() -> (Arc<SessionStore>, MemoryStore) {
    let store = MemoryStore::new();
    let backing: Arc<dyn KeyValueStore> = Arc::new(store.clone());
    let session = SessionStore::load(backing).await.unwrap();
    (Arc::new(session), store)
}

/// A session already logged in as `profile()` with the given tokens.
pub async fn logged_in(access: &str, refresh: &str) -> (Arc<SessionStore>, MemoryStore) {
    let (session, store) = session().await;
    session
        .save_login(access.to_string(), refresh.to_string(), profile())
        .await
        .unwrap();
    (session, store)
}

pub fn client(
    session: Arc<SessionStore>,
    transport: Arc<ScriptedTransport>,
    refresher: Arc<CountingRefresher>,
    policy: RefreshPolicy,
) -> ApiClient {
    let config = ClientConfig::default().with_refresh_policy(policy);
    ApiClient::builder(&config, session)
        .transport(transport)
        .refresher(refresher)
        .build()
}
