//! `KeyValueStore` implementations.
//!
//! - `MemoryStore`: process-local map, for tests and ephemeral sessions
//! - `JsonFileStore`: a single JSON document on disk, written atomically

mod atomic_json;
mod json_file_store;
mod memory_store;

pub use atomic_json::AtomicJsonFile;
pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
