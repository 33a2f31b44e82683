//! Bearer-token injection stage.

use super::{Link, Next};
use crate::error::ClientError;
use crate::operation::Operation;
use async_trait::async_trait;
use stayhub_core::graphql::GraphQLResponse;
use stayhub_core::session::SessionService;
use std::sync::Arc;

/// Where the auth stage reads the access token from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenSource {
    /// Persistent storage, re-read on every request. Picks up tokens written
    /// by another process sharing the data directory.
    #[default]
    Storage,
    /// The in-memory session.
    Memory,
}

/// Attaches `Authorization: Bearer <token>` when a token is available and
/// strips the header when none is.
pub struct AuthLink {
    session: Arc<dyn SessionService>,
    source: TokenSource,
}

impl AuthLink {
    pub fn new(session: Arc<dyn SessionService>) -> Self {
        Self {
            session,
            source: TokenSource::default(),
        }
    }

    pub fn with_source(mut self, source: TokenSource) -> Self {
        self.source = source;
        self
    }

    async fn current_token(&self) -> Result<Option<String>, ClientError> {
        match self.source {
            TokenSource::Storage => Ok(self.session.stored_access_token().await?),
            TokenSource::Memory => {
                let token = self.session.get_token();
                Ok((!token.is_empty()).then_some(token))
            }
        }
    }
}

#[async_trait]
impl Link for AuthLink {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn request(
        &self,
        mut operation: Operation,
        next: Next<'_>,
    ) -> Result<GraphQLResponse, ClientError> {
        match self.current_token().await? {
            Some(token) => operation.set_bearer(&token)?,
            None => operation.clear_bearer(),
        }
        next.run(operation).await
    }
}
