//! Storage back-ends from which the entity data producers load entities.

use crate::engine::value::Value;
use crate::error::Error;
use log::trace;
use std::collections::HashMap;
use std::fmt::Debug;

/// Trait implemented by back-ends that load entities by type and identifier. Implementations
/// wrap their own failures in [`Error::StorageFailed`].
///
/// # Examples
///
/// ```rust
/// # use warpresolver::engine::storage::EntityStorage;
/// # use warpresolver::engine::value::Value;
/// # use warpresolver::Error;
///
/// #[derive(Debug)]
/// struct NothingStorage {}
///
/// impl EntityStorage for NothingStorage {
///     fn load(&self, _entity_type: &str, _id: &str) -> Result<Option<Value>, Error> {
///         Ok(None)
///     }
/// }
/// ```
pub trait EntityStorage: Debug + Send + Sync {
    /// Returns the entity of type `entity_type` with identifier `id`, or `None` if no such
    /// entity exists
    fn load(&self, entity_type: &str, id: &str) -> Result<Option<Value>, Error>;
}

/// An [`EntityStorage`] that holds its entities in memory
///
/// # Examples
///
/// ```rust
/// use warpresolver::engine::storage::{EntityStorage, MemoryStorage};
/// use warpresolver::engine::value::Value;
///
/// let mut storage = MemoryStorage::new();
/// storage.insert("node", "1", Value::from("front page"));
///
/// assert_eq!(storage.load("node", "1").unwrap(), Some(Value::from("front page")));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entities: HashMap<String, HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    /// Stores an entity, returning the entity previously stored under the same type and id
    pub fn insert(&mut self, entity_type: &str, id: &str, entity: Value) -> Option<Value> {
        self.entities
            .entry(entity_type.to_string())
            .or_insert_with(HashMap::new)
            .insert(id.to_string(), entity)
    }

    pub fn with_entity(mut self, entity_type: &str, id: &str, entity: Value) -> Self {
        self.insert(entity_type, id, entity);
        self
    }
}

impl EntityStorage for MemoryStorage {
    fn load(&self, entity_type: &str, id: &str) -> Result<Option<Value>, Error> {
        trace!(
            "MemoryStorage::load called -- entity_type: {}, id: {}",
            entity_type,
            id
        );
        Ok(self
            .entities
            .get(entity_type)
            .and_then(|entities| entities.get(id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityStorage, MemoryStorage};
    use crate::engine::value::Value;

    /// Passes if stored entities load by type and id, and absent ones load as None
    #[test]
    fn load() {
        let storage = MemoryStorage::new()
            .with_entity("node", "1", Value::from("front"))
            .with_entity("user", "1", Value::from("admin"));

        assert_eq!(storage.load("node", "1").unwrap(), Some(Value::from("front")));
        assert_eq!(storage.load("user", "1").unwrap(), Some(Value::from("admin")));
        assert!(storage.load("node", "2").unwrap().is_none());
        assert!(storage.load("term", "1").unwrap().is_none());
    }

    /// Passes if inserting over an entity returns the replaced one
    #[test]
    fn insert_replaces() {
        let mut storage = MemoryStorage::new();

        assert!(storage.insert("node", "1", Value::from("a")).is_none());
        assert_eq!(
            storage.insert("node", "1", Value::from("b")),
            Some(Value::from("a"))
        );
    }
}
