//! GraphQL API client for the Stayhub marketplace.
//!
//! Requests travel an ordered chain of [`Link`] stages:
//!
//! ```text
//! CacheLink -> ErrorLink -> AuthLink -> HttpLink
//! ```
//!
//! The error stage reacts to server-declared `action`s: `logout` clears the
//! session, `refresh-token` exchanges the refresh token and retries the
//! operation once.

pub mod cache;
pub mod client;
pub mod error;
pub mod link;
pub mod operation;
pub mod refresh;

pub use cache::NormalizedCache;
pub use client::{ApiClient, ApiClientBuilder};
pub use error::ClientError;
pub use link::{Link, LinkChain, Next, TokenSource};
pub use operation::{GraphQLOperation, Operation, OperationKind};
pub use refresh::{HttpTokenRefresher, RefreshCoordinator, TokenRefresher};
