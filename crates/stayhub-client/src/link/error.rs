//! Error-interception stage: logout and refresh-then-retry.

use super::{Link, Next};
use crate::error::ClientError;
use crate::operation::Operation;
use crate::refresh::RefreshCoordinator;
use async_trait::async_trait;
use stayhub_core::graphql::{ErrorAction, GraphQLResponse};
use stayhub_core::session::SessionService;
use std::sync::Arc;

/// Reacts to the `action` the server attaches to GraphQL errors.
///
/// - `logout`: the session is cleared and the response passes through.
/// - `refresh-token`: the refresh token is exchanged, the original operation
///   is re-sent once with the new token, and the retried response is final.
///   A failed exchange is returned in place of the original response.
/// - anything else, including transport failures: logged and passed through.
pub struct ErrorLink {
    session: Arc<dyn SessionService>,
    coordinator: Arc<RefreshCoordinator>,
}

impl ErrorLink {
    pub fn new(session: Arc<dyn SessionService>, coordinator: Arc<RefreshCoordinator>) -> Self {
        Self {
            session,
            coordinator,
        }
    }

    async fn logout(&self, operation: &str) {
        tracing::warn!(operation, "Server requested logout, clearing session");
        if let Err(e) = self.session.clear_token().await {
            tracing::error!(operation, error = %e, "Failed to clear session after logout");
        }
    }

    fn log_errors(operation: &str, response: &GraphQLResponse) {
        for error in &response.errors {
            tracing::warn!(
                operation,
                code = error.code().unwrap_or("-"),
                action = error.action().map(|a| a.as_str()).unwrap_or("-"),
                "GraphQL error: {}",
                error.message
            );
        }
    }
}

#[async_trait]
impl Link for ErrorLink {
    fn name(&self) -> &'static str {
        "error"
    }

    async fn request(
        &self,
        operation: Operation,
        next: Next<'_>,
    ) -> Result<GraphQLResponse, ClientError> {
        let name = operation.name().to_string();
        let original = operation.clone();

        let response = match next.run(operation).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(operation = %name, error = %e, "Request failed");
                return Err(e);
            }
        };

        match response.control_action() {
            Some(ErrorAction::Logout) => {
                self.logout(&name).await;
                Ok(response)
            }
            Some(ErrorAction::RefreshToken) => {
                tracing::info!(operation = %name, "Access token stale, refreshing");
                let token = match self.coordinator.refresh().await {
                    Ok(token) => token,
                    Err(e) => {
                        tracing::error!(operation = %name, error = %e, "Token refresh failed");
                        return Err(e);
                    }
                };

                let mut retry = original;
                retry.set_bearer(&token)?;

                // The retry is terminal: no second refresh, whatever it returns.
                let retried = match next.run(retry).await {
                    Ok(retried) => retried,
                    Err(e) => {
                        tracing::error!(operation = %name, error = %e, "Retried request failed");
                        return Err(e);
                    }
                };
                if retried.control_action() == Some(ErrorAction::Logout) {
                    self.logout(&name).await;
                } else if retried.has_errors() {
                    Self::log_errors(&name, &retried);
                }
                Ok(retried)
            }
            _ => {
                Self::log_errors(&name, &response);
                Ok(response)
            }
        }
    }
}
