//! Normalized GraphQL response cache.
//!
//! Objects carrying `__typename` and `id` are stored once under
//! `"<__typename>:<id>"` and referenced elsewhere as `{"__ref": key}`, so a
//! mutation returning an updated entity is visible to every cached query
//! that contains it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stayhub_core::Result;
use stayhub_core::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage key of the persisted cache blob.
pub const CACHE_STORAGE_KEY: &str = "graphql-cache";

const REF_FIELD: &str = "__ref";
const TYPENAME_FIELD: &str = "__typename";

/// Serializable cache contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Normalized entities by `Type:id`.
    pub entities: BTreeMap<String, Value>,
    /// Normalized root results by operation cache key.
    pub roots: BTreeMap<String, Value>,
}

impl CacheSnapshot {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.roots.is_empty()
    }
}

/// In-memory normalized store with optional persistence.
///
/// Grows without bound; nothing is evicted unless asked.
pub struct NormalizedCache {
    data: RwLock<CacheSnapshot>,
    persistence: Option<Arc<dyn KeyValueStore>>,
}

impl Default for NormalizedCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalizedCache {
    /// Memory-only cache.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(CacheSnapshot::default()),
            persistence: None,
        }
    }

    /// Restores the persisted blob from `store` before returning, and mirrors
    /// every later write back into it.
    ///
    /// An unreadable blob is discarded; the cache starts empty.
    pub async fn with_persistence(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let restored = match store.get(CACHE_STORAGE_KEY).await? {
            Some(raw) => match serde_json::from_str::<CacheSnapshot>(&raw) {
                Ok(snapshot) => {
                    tracing::debug!(
                        entities = snapshot.entities.len(),
                        roots = snapshot.roots.len(),
                        "Restored GraphQL cache"
                    );
                    snapshot
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable GraphQL cache");
                    CacheSnapshot::default()
                }
            },
            None => CacheSnapshot::default(),
        };

        Ok(Self {
            data: RwLock::new(restored),
            persistence: Some(store),
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    /// Denormalized result for `root_key`, or `None` on a miss (absent root
    /// or any dangling reference).
    pub async fn read(&self, root_key: &str) -> Option<Value> {
        let data = self.data.read().await;
        let root = data.roots.get(root_key)?;
        denormalize(root, &data.entities, &mut Vec::new())
    }

    /// Normalizes `result` into the entity table and records it under `root_key`.
    pub async fn write(&self, root_key: &str, result: &Value) -> Result<()> {
        let mut data = self.data.write().await;
        let root = normalize(result, &mut data.entities);
        data.roots.insert(root_key.to_string(), root);
        self.persist(&data).await
    }

    /// Merges the entities in `result` without recording a root (mutations).
    pub async fn write_entities(&self, result: &Value) -> Result<()> {
        let mut data = self.data.write().await;
        normalize(result, &mut data.entities);
        self.persist(&data).await
    }

    /// The normalized form of a single entity.
    pub async fn entity(&self, key: &str) -> Option<Value> {
        self.data.read().await.entities.get(key).cloned()
    }

    /// Drops an entity. Roots that reference it become misses.
    pub async fn evict(&self, key: &str) -> Result<bool> {
        let mut data = self.data.write().await;
        let removed = data.entities.remove(key).is_some();
        if removed {
            self.persist(&data).await?;
        }
        Ok(removed)
    }

    /// Empties the cache, including its persisted copy.
    pub async fn reset(&self) -> Result<()> {
        let mut data = self.data.write().await;
        *data = CacheSnapshot::default();
        match &self.persistence {
            Some(store) => store.remove(CACHE_STORAGE_KEY).await,
            None => Ok(()),
        }
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        self.data.read().await.clone()
    }

    /// Writes the current contents to storage (no-op when memory-only).
    ///
    /// An empty cache is not written, so a flush after `reset` leaves no blob.
    pub async fn flush(&self) -> Result<()> {
        let data = self.data.read().await;
        if data.is_empty() {
            return Ok(());
        }
        self.persist(&data).await
    }

    // Called with the lock held so persisted snapshots land in write order.
    async fn persist(&self, data: &CacheSnapshot) -> Result<()> {
        if let Some(store) = &self.persistence {
            let raw = serde_json::to_string(data)?;
            store.set(CACHE_STORAGE_KEY, raw).await?;
        }
        Ok(())
    }
}

fn entity_key(object: &Map<String, Value>) -> Option<String> {
    let typename = object.get(TYPENAME_FIELD)?.as_str()?;
    let id = match object.get("id")? {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => return None,
    };
    Some(format!("{}:{}", typename, id))
}

fn reference(key: String) -> Value {
    let mut object = Map::new();
    object.insert(REF_FIELD.to_string(), Value::String(key));
    Value::Object(object)
}

fn as_reference(object: &Map<String, Value>) -> Option<&str> {
    if object.len() != 1 {
        return None;
    }
    object.get(REF_FIELD)?.as_str()
}

fn normalize(value: &Value, entities: &mut BTreeMap<String, Value>) -> Value {
    match value {
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| normalize(item, entities)).collect())
        }
        Value::Object(object) => {
            let fields: Map<String, Value> = object
                .iter()
                .map(|(name, field)| (name.clone(), normalize(field, entities)))
                .collect();

            match entity_key(object) {
                Some(key) => {
                    let slot = entities
                        .entry(key.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                    match slot {
                        Value::Object(existing) => existing.extend(fields),
                        other => *other = Value::Object(fields),
                    }
                    reference(key)
                }
                None => Value::Object(fields),
            }
        }
        other => other.clone(),
    }
}

/// `path` holds the entity keys currently being expanded; meeting one again
/// yields a `{__typename, id}` stub instead of recursing forever.
fn denormalize(
    value: &Value,
    entities: &BTreeMap<String, Value>,
    path: &mut Vec<String>,
) -> Option<Value> {
    match value {
        Value::Object(object) => {
            if let Some(key) = as_reference(object) {
                let entity = entities.get(key)?;
                if path.iter().any(|seen| seen == key) {
                    return Some(stub(entity));
                }
                path.push(key.to_string());
                let expanded = denormalize(entity, entities, path);
                path.pop();
                return expanded;
            }

            let mut out = Map::new();
            for (name, field) in object {
                out.insert(name.clone(), denormalize(field, entities, path)?);
            }
            Some(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| denormalize(item, entities, path))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        other => Some(other.clone()),
    }
}

fn stub(entity: &Value) -> Value {
    let mut out = Map::new();
    for field in [TYPENAME_FIELD, "id"] {
        if let Some(value) = entity.get(field) {
            out.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(out)
}
