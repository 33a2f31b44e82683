//! Outermost stage: answers reads from the normalized cache.

use super::{Link, Next};
use crate::cache::NormalizedCache;
use crate::error::ClientError;
use crate::operation::{Operation, OperationKind};
use async_trait::async_trait;
use stayhub_core::config::FetchPolicy;
use stayhub_core::graphql::GraphQLResponse;
use std::sync::Arc;

pub struct CacheLink {
    cache: Arc<NormalizedCache>,
    default_policy: FetchPolicy,
}

impl CacheLink {
    pub fn new(cache: Arc<NormalizedCache>, default_policy: FetchPolicy) -> Self {
        Self {
            cache,
            default_policy,
        }
    }
}

#[async_trait]
impl Link for CacheLink {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn request(
        &self,
        operation: Operation,
        next: Next<'_>,
    ) -> Result<GraphQLResponse, ClientError> {
        let kind = operation.kind;
        let policy = operation.fetch_policy.unwrap_or(self.default_policy);
        let key = operation.cache_key();

        if kind == OperationKind::Query && policy == FetchPolicy::CacheFirst {
            if let Some(data) = self.cache.read(&key).await {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(GraphQLResponse::from_data(data));
            }
        }

        let response = next.run(operation).await?;

        if policy == FetchPolicy::NoCache || response.has_errors() {
            return Ok(response);
        }

        if let Some(data) = &response.data {
            let written = match kind {
                OperationKind::Query => self.cache.write(&key, data).await,
                OperationKind::Mutation => self.cache.write_entities(data).await,
            };
            // A cache that cannot persist must not fail the operation.
            if let Err(e) = written {
                tracing::warn!(key = %key, error = %e, "Failed to update cache");
            }
        }

        Ok(response)
    }
}
