//! Error type for the request pipeline.

use stayhub_core::StayhubError;
use stayhub_core::graphql::{ErrorAction, GraphQLError};
use thiserror::Error;

/// Everything an operation can fail with.
///
/// `Clone` so that one refresh outcome can be handed to every operation
/// waiting on a shared exchange.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status with a body that is not a GraphQL response.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The server answered with `errors[]`.
    #[error("GraphQL error: {}", join_messages(.0))]
    GraphQL(Vec<GraphQLError>),

    /// The refresh-token exchange failed; replaces the original error.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error(transparent)]
    Storage(#[from] StayhubError),

    /// Misassembled link chain.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_refresh_failure(&self) -> bool {
        matches!(self, Self::RefreshFailed(_) | Self::MissingRefreshToken)
    }

    pub fn graphql_errors(&self) -> Option<&[GraphQLError]> {
        match self {
            Self::GraphQL(errors) => Some(errors),
            _ => None,
        }
    }

    /// Whether any GraphQL error declares `action`.
    pub fn has_action(&self, action: ErrorAction) -> bool {
        self.graphql_errors()
            .is_some_and(|errors| errors.iter().any(|e| e.action() == Some(action)))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
