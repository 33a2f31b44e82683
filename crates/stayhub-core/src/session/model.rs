//! Session domain models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the signed-in user, as returned by the login mutation.
///
/// Only the identifying fields are typed; anything else the server sends is
/// kept in `extra` so a save/load cycle reproduces the original document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            avatar: None,
            extra: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// In-memory authentication state.
///
/// An empty `access_token` is the logged-out sentinel. `profile` is present
/// exactly when the user counts as authenticated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub profile: Option<Profile>,
}

impl Session {
    /// Creates an empty (logged out) session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    pub fn is_cleared(&self) -> bool {
        self.access_token.is_empty() && self.refresh_token.is_empty() && self.profile.is_none()
    }
}

/// Storage keys owned by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Legacy single-token key. Never written, only removed on logout.
    Token,
    AccessToken,
    RefreshToken,
    Profile,
}

impl SessionKey {
    /// Keys removed on logout.
    pub const ALL: [SessionKey; 4] = [
        SessionKey::Token,
        SessionKey::AccessToken,
        SessionKey::RefreshToken,
        SessionKey::Profile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::Token => "token",
            SessionKey::AccessToken => "accessToken",
            SessionKey::RefreshToken => "refreshToken",
            SessionKey::Profile => "profile",
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of session transition broadcast to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    LoggedIn,
    LoggedOut,
    TokenRefreshed,
}

/// Notification emitted whenever the session changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    /// RFC 3339 timestamp
    pub at: String,
}

impl SessionEvent {
    pub fn now(kind: SessionEventKind) -> Self {
        Self {
            kind,
            at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
