//! Session domain module.
//!
//! - `model`: session state, profile, storage keys and events
//! - `service`: the capability trait consumed by the API client

mod model;
mod service;

// Re-export public API
pub use model::{Profile, Session, SessionEvent, SessionEventKind, SessionKey};
pub use service::SessionService;
