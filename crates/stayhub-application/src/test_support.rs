//! In-process GraphQL server used by the application tests.

use async_trait::async_trait;
use serde_json::json;
use stayhub_client::{ClientError, Link, Next, Operation};
use stayhub_core::graphql::{ErrorAction, GraphQLError, GraphQLResponse};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeServer {
    seen: Mutex<Vec<(String, Option<String>)>>,
    revoked: AtomicBool,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every later request is answered with a `logout` action.
    pub fn revoke(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == operation)
            .count()
    }

    pub fn last_bearer(&self) -> Option<String> {
        self.seen.lock().unwrap().last().and_then(|(_, bearer)| bearer.clone())
    }

    fn profile() -> serde_json::Value {
        json!({ "__typename": "User", "id": "user-1", "name": "Mika", "email": "mika@example.com" })
    }
}

#[async_trait]
impl Link for FakeServer {
    fn name(&self) -> &'static str {
        "fake-server"
    }

    async fn request(
        &self,
        operation: Operation,
        _next: Next<'_>,
    ) -> Result<GraphQLResponse, ClientError> {
        self.seen.lock().unwrap().push((
            operation.name().to_string(),
            operation.bearer().map(str::to_string),
        ));

        if self.revoked.load(Ordering::SeqCst) {
            return Ok(GraphQLResponse::from_errors(vec![
                GraphQLError::new("session revoked").with_action(ErrorAction::Logout),
            ]));
        }

        let response = match operation.name() {
            "Login" if operation.request.variables["password"] == "secret" => {
                GraphQLResponse::from_data(json!({
                    "login": {
                        "accessToken": "access-1",
                        "refreshToken": "refresh-1",
                        "profile": Self::profile(),
                    }
                }))
            }
            "Login" => GraphQLResponse::from_errors(vec![
                GraphQLError::new("invalid credentials").with_code("UNAUTHENTICATED"),
            ]),
            "Me" => GraphQLResponse::from_data(json!({ "me": Self::profile() })),
            other => GraphQLResponse::from_errors(vec![GraphQLError::new(format!(
                "unknown operation {}",
                other
            ))]),
        };
        Ok(response)
    }
}
