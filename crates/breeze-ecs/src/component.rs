//! Component type registration and per-type storage.
//!
//! Every component type used in the ECS must be registered in the
//! [`ComponentRegistry`] under a human-readable name. Each registered type gets
//! its own [`ComponentStore`], a sparse map keyed by [`EntityId`].

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// Registry mapping Rust types to their registered names.
///
/// A type can only be registered once; registering it again keeps the first
/// name.
#[derive(Debug, Default)]
pub(crate) struct ComponentRegistry {
    names: HashMap<TypeId, String>,
}

impl ComponentRegistry {
    /// Register `T` under `name`. Returns `false` if `T` was already known.
    pub fn register<T: 'static>(&mut self, name: &str) -> bool {
        let type_id = TypeId::of::<T>();
        if self.names.contains_key(&type_id) {
            return false;
        }
        self.names.insert(type_id, name.to_owned());
        true
    }

    /// Comma-separated, sorted list of registered names (for error messages).
    pub fn registered_names(&self) -> String {
        let mut names: Vec<&str> = self.names.values().map(String::as_str).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

// ---------------------------------------------------------------------------
// ComponentStore
// ---------------------------------------------------------------------------

/// Sparse storage for one component type, ordered by entity id.
#[derive(Debug)]
pub(crate) struct ComponentStore<T> {
    components: BTreeMap<EntityId, T>,
}

impl<T> ComponentStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    /// Insert or overwrite the component for `entity`.
    pub fn insert(&mut self, entity: EntityId, component: T) -> Option<T> {
        self.components.insert(entity, component)
    }

    /// Remove the component for `entity`.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        self.components.remove(&entity)
    }

    /// Shared access to the component of `entity`.
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.components.get(&entity)
    }

    /// Mutable access to the component of `entity`.
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.components.get_mut(&entity)
    }

    /// Whether `entity` has this component.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.components.contains_key(&entity)
    }

    /// Entities that own this component, ascending.
    pub fn entities(&self) -> Vec<EntityId> {
        self.components.keys().copied().collect()
    }
}

// ---------------------------------------------------------------------------
// ErasedStore -- type-erased view used by the World
// ---------------------------------------------------------------------------

/// Operations the [`World`](crate::world::World) performs on a store without
/// knowing its component type.
pub(crate) trait ErasedStore: Any {
    fn remove_entity(&mut self, entity: EntityId) -> bool;
    fn contains_entity(&self, entity: EntityId) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> ErasedStore for ComponentStore<T> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn contains_entity(&self, entity: EntityId) -> bool {
        self.contains(entity)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct Health(u32);
    struct Armor;

    fn id(raw: u32) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    #[test]
    fn register_once() {
        let mut reg = ComponentRegistry::default();
        assert!(reg.register::<Health>("health"));
        assert!(!reg.register::<Health>("health_again"));
        assert_eq!(reg.registered_names(), "health");
    }

    #[test]
    fn registered_names_are_sorted() {
        let mut reg = ComponentRegistry::default();
        reg.register::<Health>("health");
        reg.register::<Armor>("armor");
        assert_eq!(reg.registered_names(), "armor, health");
    }

    #[test]
    fn store_lists_entities_in_id_order() {
        let mut store = ComponentStore::new();
        store.insert(id(3), Health(30));
        store.insert(id(1), Health(10));
        store.insert(id(2), Health(20));
        assert_eq!(store.entities(), vec![id(1), id(2), id(3)]);
        assert_eq!(store.get(id(2)).map(|h| h.0), Some(20));
    }

    #[test]
    fn erased_remove_reports_presence() {
        let mut store: ComponentStore<Health> = ComponentStore::new();
        store.insert(id(1), Health(1));
        let erased: &mut dyn ErasedStore = &mut store;
        assert!(erased.remove_entity(id(1)));
        assert!(!erased.remove_entity(id(1)));
        assert!(!erased.contains_entity(id(1)));
    }
}
