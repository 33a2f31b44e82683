//! Application layer for Stayhub.
//!
//! Wires storage, session and API client together at startup and exposes the
//! authentication use cases the UI and CLI call.

pub mod auth_service;
pub mod context;
pub mod operations;
pub mod telemetry;

pub use auth_service::AuthService;
pub use context::AppContext;

#[cfg(test)]
mod test_support;
