pub mod config_service;
pub mod paths;
pub mod session_store;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::StayhubPaths;
pub use crate::session_store::SessionStore;
pub use crate::storage::{JsonFileStore, MemoryStore};
