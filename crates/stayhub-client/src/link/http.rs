//! Terminating transport stage.

use super::{Link, Next};
use crate::error::ClientError;
use crate::operation::Operation;
use async_trait::async_trait;
use reqwest::Client;
use stayhub_core::graphql::GraphQLResponse;
use std::time::Duration;

/// POSTs `{ operationName, query, variables }` to a fixed endpoint.
///
/// No timeout is applied unless one is configured; the reqwest defaults
/// govern otherwise.
#[derive(Clone)]
pub struct HttpLink {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpLink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    /// Reuses an existing reqwest client (connection pool, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Link for HttpLink {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn request(
        &self,
        operation: Operation,
        _next: Next<'_>,
    ) -> Result<GraphQLResponse, ClientError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .headers(operation.headers.clone())
            .json(&operation.request);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(operation = operation.name(), endpoint = %self.endpoint, "Sending GraphQL request");

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        decode_body(status.as_u16(), status.is_success(), &body)
    }
}

/// GraphQL servers commonly answer validation failures with 4xx and a
/// regular `{ errors }` body, so the body is tried first regardless of status.
pub(crate) fn decode_body(status: u16, success: bool, body: &str) -> Result<GraphQLResponse, ClientError> {
    match serde_json::from_str::<GraphQLResponse>(body) {
        Ok(parsed) if success || parsed.data.is_some() || parsed.has_errors() => Ok(parsed),
        Err(e) if success => Err(ClientError::Decode(e.to_string())),
        _ => Err(ClientError::Http {
            status,
            body: body.to_string(),
        }),
    }
}
