//! The [`World`] is the top-level container for the ECS. It owns the entity
//! allocator, the component registry, and one sparse store per registered
//! component type.

use std::any::TypeId;
use std::collections::HashMap;

use crate::component::{ComponentRegistry, ComponentStore, ErasedStore};
use crate::entity::{EntityAllocator, EntityId};
use crate::EcsError;

/// The ECS world.
///
/// Lookups on destroyed or never-allocated ids report "not present" instead of
/// failing, so systems may enumerate `1..=max_entity_id()` even after earlier
/// passes in the same frame destroyed some of those ids.
#[derive(Default)]
pub struct World {
    allocator: EntityAllocator,
    registry: ComponentRegistry,
    stores: HashMap<TypeId, Box<dyn ErasedStore>>,
}

impl World {
    /// Create an empty world with no registered components.
    pub fn new() -> Self {
        Self::default()
    }

    // -- registration -------------------------------------------------------

    /// Register a component type under `name`, creating its store.
    ///
    /// Registering the same type twice is a no-op.
    pub fn register_component<T: 'static>(&mut self, name: &str) {
        if self.registry.register::<T>(name) {
            self.stores
                .insert(TypeId::of::<T>(), Box::new(ComponentStore::<T>::new()));
        }
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Allocate a new entity with no components.
    pub fn spawn(&mut self) -> EntityId {
        self.allocator.allocate()
    }

    /// Allocate a new entity carrying a single component.
    pub fn spawn_with<T: 'static>(&mut self, component: T) -> Result<EntityId, EcsError> {
        let entity = self.spawn();
        self.insert_component(entity, component)?;
        Ok(entity)
    }

    /// Destroy `entity`, removing its components from every store.
    ///
    /// Idempotent: returns `false` and does nothing if the entity is already
    /// destroyed or was never allocated.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.allocator.deallocate(entity) {
            return false;
        }
        for store in self.stores.values_mut() {
            store.remove_entity(entity);
        }
        true
    }

    /// Whether `entity` is alive.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Upper bound for id enumeration: the highest id ever allocated.
    pub fn max_entity_id(&self) -> u32 {
        self.allocator.max_id()
    }

    // -- component access ---------------------------------------------------

    /// Attach (or overwrite) a component on a live entity.
    pub fn insert_component<T: 'static>(
        &mut self,
        entity: EntityId,
        component: T,
    ) -> Result<(), EcsError> {
        if !self.allocator.is_alive(entity) {
            return Err(EcsError::StaleEntity(entity));
        }
        let store = self
            .stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<ComponentStore<T>>())
            .ok_or_else(|| EcsError::UnknownComponent {
                name: std::any::type_name::<T>().to_owned(),
                registered: self.registry.registered_names(),
            })?;
        store.insert(entity, component);
        Ok(())
    }

    /// Membership test. Unknown types and dead entities report `false`.
    pub fn has_component<T: 'static>(&self, entity: EntityId) -> bool {
        self.stores
            .get(&TypeId::of::<T>())
            .map(|store| store.contains_entity(entity))
            .unwrap_or(false)
    }

    /// Shared access to a component.
    pub fn get_component<T: 'static>(&self, entity: EntityId) -> Option<&T> {
        self.store::<T>()?.get(entity)
    }

    /// Mutable access to a component.
    pub fn get_component_mut<T: 'static>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.store_mut::<T>()?.get_mut(entity)
    }

    /// Entities carrying `T`, in ascending id order.
    pub fn entities_with<T: 'static>(&self) -> Vec<EntityId> {
        self.store::<T>()
            .map(ComponentStore::entities)
            .unwrap_or_default()
    }

    fn store<T: 'static>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<ComponentStore<T>>()
    }

    fn store_mut<T: 'static>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entity_count())
            .field("max_entity_id", &self.max_entity_id())
            .field("components", &self.registry.registered_names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
