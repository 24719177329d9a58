//! Breeze ECS -- sparse entity/component store for the Breeze engine.
//!
//! Entities are positive integer ids allocated sequentially. Each registered
//! component type lives in its own sparse store keyed by
//! [`EntityId`](entity::EntityId). Destruction removes an entity's
//! components from every store and is idempotent; systems that detect
//! destruction conditions mid-iteration queue them on a
//! [`CommandBuffer`](command::CommandBuffer) instead.
//!
//! # Quick Start
//!
//! ```
//! use breeze_ecs::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut world = World::new();
//! world.register_component::<Position>("position");
//!
//! let entity = world.spawn_with(Position { x: 0.0, y: 0.0 }).unwrap();
//! assert!(world.has_component::<Position>(entity));
//!
//! assert!(world.despawn(entity));
//! assert!(!world.despawn(entity));
//! assert_eq!(world.get_component::<Position>(entity), None);
//! ```

#![deny(unsafe_code)]

pub mod command;
mod component;
pub mod entity;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The entity does not exist (destroyed or never allocated).
    #[error("entity {0:?} does not exist (destroyed or never allocated)")]
    StaleEntity(entity::EntityId),

    /// A component type was referenced that has not been registered.
    #[error("component type '{name}' not registered. Registered components: [{registered}]")]
    UnknownComponent {
        /// Name or Rust type name that was looked up.
        name: String,
        /// Names of all registered components.
        registered: String,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::command::{ApplyReport, Axis, CausalReason, Command, CommandBuffer, SystemId};
    pub use crate::entity::EntityId;
    pub use crate::world::World;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    fn setup_world() -> World {
        let mut world = World::new();
        world.register_component::<Position>("position");
        world.register_component::<Velocity>("velocity");
        world
    }

    #[test]
    fn deferred_destruction_during_iteration() {
        let mut world = setup_world();
        for i in 0..10 {
            let e = world.spawn_with(Position { x: i as f32, y: 0.0 }).unwrap();
            world
                .insert_component(e, Velocity { dx: 1.0, dy: 0.0 })
                .unwrap();
        }

        let mut cmds = CommandBuffer::new();
        for e in EntityId::range_to(world.max_entity_id()) {
            if let Some(pos) = world.get_component_mut::<Position>(e) {
                pos.x += 1.0;
                if pos.x > 5.0 {
                    cmds.despawn(e, SystemId::TRANSFORM, CausalReason::OutOfBounds(Axis::Horizontal));
                }
            }
        }
        // Every entity was still visited before any destruction.
        assert_eq!(world.entity_count(), 10);

        cmds.apply(&mut world);
        assert_eq!(world.entity_count(), 5);
        assert_eq!(world.entities_with::<Position>().len(), 5);
        assert_eq!(world.entities_with::<Velocity>().len(), 5);
    }

    #[test]
    fn enumeration_tolerates_destroyed_ids() {
        let mut world = setup_world();
        let ids: Vec<EntityId> = (0..4)
            .map(|_| world.spawn_with(Position { x: 0.0, y: 0.0 }).unwrap())
            .collect();
        world.despawn(ids[1]);
        world.despawn(ids[3]);

        let present: Vec<EntityId> = EntityId::range_to(world.max_entity_id())
            .filter(|e| world.has_component::<Position>(*e))
            .collect();
        assert_eq!(present, vec![ids[0], ids[2]]);
    }
}
