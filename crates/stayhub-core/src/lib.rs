pub mod config;
pub mod error;
pub mod graphql;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::{Result, StayhubError};
