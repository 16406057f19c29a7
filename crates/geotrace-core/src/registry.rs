//! Id -> (scene handle, controller) lookup.

use std::collections::HashMap;

use crate::error::EngineError;
use crate::render::RenderHandle;

#[derive(Debug)]
pub struct RegistryEntry<C> {
    pub id: String,
    pub handle: RenderHandle,
    pub controller: C,
}

/// Tracked objects keyed by id, remembering insertion order for listings.
#[derive(Debug)]
pub struct EntityRegistry<C> {
    entries: HashMap<String, RegistryEntry<C>>,
    order: Vec<String>,
}

impl<C> Default for EntityRegistry<C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<C> EntityRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new object. An existing id is left untouched and rejected.
    pub fn add(&mut self, id: &str, handle: RenderHandle, controller: C) -> Result<(), EngineError> {
        if self.entries.contains_key(id) {
            return Err(EngineError::DuplicateId(id.to_string()));
        }
        self.entries.insert(
            id.to_string(),
            RegistryEntry {
                id: id.to_string(),
                handle,
                controller,
            },
        );
        self.order.push(id.to_string());
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<RegistryEntry<C>> {
        let entry = self.entries.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(entry)
    }

    pub fn find(&self, id: &str) -> Option<&RegistryEntry<C>> {
        self.entries.get(id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut RegistryEntry<C>> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Ids in insertion order. Owned, so callers may remove while walking it.
    pub fn list(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry<C>> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RegistryEntry<C>> {
        self.entries.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_keeps_insertion_order() {
        let mut registry = EntityRegistry::new();
        for (i, id) in ["gs", "d2", "d1"].iter().enumerate() {
            registry.add(id, RenderHandle(i as u64), ()).unwrap();
        }
        assert_eq!(registry.list(), vec!["gs", "d2", "d1"]);

        registry.remove("d2");
        assert_eq!(registry.list(), vec!["gs", "d1"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry = EntityRegistry::new();
        registry.add("d1", RenderHandle(1), "first").unwrap();

        let err = registry.add("d1", RenderHandle(2), "second").unwrap_err();

        assert_eq!(err, EngineError::DuplicateId("d1".into()));
        let entry = registry.find("d1").unwrap();
        assert_eq!(entry.handle, RenderHandle(1));
        assert_eq!(entry.controller, "first");
        assert_eq!(registry.list(), vec!["d1"]);
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut registry: EntityRegistry<()> = EntityRegistry::new();
        assert!(registry.remove("nope").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn removing_while_walking_snapshot() {
        let mut registry = EntityRegistry::new();
        registry.add("a", RenderHandle(1), 1).unwrap();
        registry.add("b", RenderHandle(2), 2).unwrap();
        for id in registry.list() {
            registry.remove(&id);
        }
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
    }
}
