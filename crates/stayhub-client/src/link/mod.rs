//! Link chain: an ordered list of request/response stages.
//!
//! Each stage receives the operation and a [`Next`] handle for the rest of
//! the chain. A stage may rewrite the operation, short-circuit with its own
//! response, or run `next` more than once (the error stage does, to retry).
//! The last stage must be terminating and never touches its `next`.

mod auth;
mod cache;
mod error;
mod http;

pub use auth::{AuthLink, TokenSource};
pub use cache::CacheLink;
pub use error::ErrorLink;
pub use http::HttpLink;
pub(crate) use http::decode_body;

use crate::error::ClientError;
use crate::operation::Operation;
use async_trait::async_trait;
use stayhub_core::graphql::GraphQLResponse;
use std::sync::Arc;

/// A single pipeline stage.
#[async_trait]
pub trait Link: Send + Sync {
    /// Short stage name used in logs and `LinkChain::names`.
    fn name(&self) -> &'static str;

    async fn request(
        &self,
        operation: Operation,
        next: Next<'_>,
    ) -> Result<GraphQLResponse, ClientError>;
}

/// The remainder of the chain after the current stage.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    links: &'a [Arc<dyn Link>],
}

impl<'a> Next<'a> {
    /// Forwards `operation` to the following stage.
    pub async fn run(self, operation: Operation) -> Result<GraphQLResponse, ClientError> {
        match self.links.split_first() {
            Some((link, rest)) => link.request(operation, Next { links: rest }).await,
            None => Err(ClientError::Pipeline(format!(
                "operation '{}' ran past the terminating link",
                operation.name()
            ))),
        }
    }

    /// A `Next` with nothing behind it, for driving a terminating link directly.
    pub fn end() -> Self {
        Next { links: &[] }
    }
}

/// Composed pipeline, outermost stage first.
#[derive(Clone)]
pub struct LinkChain {
    links: Vec<Arc<dyn Link>>,
}

impl LinkChain {
    pub fn builder() -> LinkChainBuilder {
        LinkChainBuilder { links: Vec::new() }
    }

    pub async fn execute(&self, operation: Operation) -> Result<GraphQLResponse, ClientError> {
        Next { links: &self.links }.run(operation).await
    }

    /// Stage names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.links.iter().map(|link| link.name()).collect()
    }
}

pub struct LinkChainBuilder {
    links: Vec<Arc<dyn Link>>,
}

impl LinkChainBuilder {
    /// Appends a non-terminating stage.
    pub fn link(mut self, link: Arc<dyn Link>) -> Self {
        self.links.push(link);
        self
    }

    /// Appends the terminating stage and finishes the chain.
    pub fn terminate(mut self, link: Arc<dyn Link>) -> LinkChain {
        self.links.push(link);
        LinkChain { links: self.links }
    }
}
