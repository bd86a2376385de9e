//! Per-client schema cache.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::schema::EntitySchema;

/// Cache of entity schemas keyed by entity name.
///
/// Owned by one facade client and shared among its clones; there is no
/// process-global registry. Entries live for the registry's lifetime since
/// describe output is stable for a deployed org. Concurrent first fetches
/// of the same entity may race; last insert wins, which is harmless
/// because both fetched the same describe.
#[derive(Default)]
pub struct SchemaRegistry {
    inner: RwLock<HashMap<String, Arc<EntitySchema>>>,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let map = self.inner.read().expect("registry lock poisoned");
        f.debug_struct("SchemaRegistry")
            .field("entities", &map.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached schema for an entity, if one is held.
    pub fn get(&self, entity_type: &str) -> Option<Arc<EntitySchema>> {
        self.inner
            .read()
            .expect("registry lock poisoned")
            .get(entity_type)
            .cloned()
    }

    /// Cache a schema under its entity name.
    pub fn insert(&self, schema: Arc<EntitySchema>) {
        self.inner
            .write()
            .expect("registry lock poisoned")
            .insert(schema.entity_type().to_string(), schema);
    }

    /// Number of cached entities.
    pub fn len(&self) -> usize {
        self.inner.read().expect("registry lock poisoned").len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntitySchema;

    #[test]
    fn test_insert_and_get() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("Car").is_none());

        registry.insert(Arc::new(EntitySchema::new("Car", vec![])));
        let schema = registry.get("Car").unwrap();
        assert_eq!(schema.entity_type(), "Car");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reinsert_replaces() {
        let registry = SchemaRegistry::new();
        registry.insert(Arc::new(EntitySchema::new("Car", vec![])));
        registry.insert(Arc::new(EntitySchema::new("Car", vec![])));
        assert_eq!(registry.len(), 1);
    }
}
