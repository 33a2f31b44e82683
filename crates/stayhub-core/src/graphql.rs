//! GraphQL wire types.
//!
//! The server multiplexes control signals (`action`) inside the standard
//! `errors[]` channel, so the error type carries them as a first-class field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body POSTed to the GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    pub query: String,
    #[serde(default)]
    pub variables: Value,
}

/// Response body returned by the GraphQL endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLResponse {
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self {
            data: None,
            errors,
            extensions: None,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// First control action declared by any error, in server order.
    pub fn control_action(&self) -> Option<ErrorAction> {
        self.errors
            .iter()
            .filter_map(GraphQLError::action)
            .find(|action| action.is_control())
    }
}

/// Server-declared instruction attached to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorAction {
    /// Credentials are no longer acceptable; drop the session.
    Logout,
    /// The access token is stale; exchange the refresh token and retry.
    RefreshToken,
    #[serde(other)]
    Other,
}

impl ErrorAction {
    /// Whether the error interceptor branches on this action.
    pub fn is_control(&self) -> bool {
        matches!(self, ErrorAction::Logout | ErrorAction::RefreshToken)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorAction::Logout => "logout",
            ErrorAction::RefreshToken => "refresh-token",
            ErrorAction::Other => "other",
        }
    }
}

/// Source location of an error inside the query document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// Debug payload attached by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ErrorLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stacktrace: Vec<String>,
}

/// A single entry of `errors[]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ErrorAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ErrorInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ErrorLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_action(mut self, action: ErrorAction) -> Self {
        self.action = Some(action);
        self
    }

    /// The declared action, looking at `extensions.action` when the server
    /// did not promote it to the top level.
    pub fn action(&self) -> Option<ErrorAction> {
        self.action.or_else(|| {
            self.extensions
                .as_ref()?
                .get("action")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
        })
    }

    /// The declared code, with the same `extensions` fallback as `action`.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().or_else(|| {
            self.extensions
                .as_ref()?
                .get("code")
                .and_then(|v| v.as_str())
        })
    }
}

impl std::fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code() {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}
