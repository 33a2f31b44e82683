//! Persistent key-value storage trait.
//!
//! Device storage is modelled as an asynchronous string-to-string map. Values
//! are opaque to the store; callers that need structure serialize to JSON
//! before calling `set`.

use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous key-value store over a device-native backing.
///
/// Every call is a suspension point. Implementations do not offer
/// transactions: two writers racing on the same key resolve last-writer-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key.
    async fn clear(&self) -> Result<()>;

    /// Lists the stored keys in no particular order.
    async fn keys(&self) -> Result<Vec<String>>;
}
