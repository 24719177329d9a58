//! Engine component types and the bundle used to spawn sprites.
//!
//! Three components take part in a frame:
//!
//! - [`TransformComponent`]: kinematic state, mutated by the integrator.
//! - [`CollisionComponent`]: cached bounding box plus the boundary flag. The
//!   box is written only by the collision engine's sync pass.
//! - [`RenderComponent`]: screen rectangle and texture handle, read-only to
//!   the core.

use breeze_ecs::entity::EntityId;
use breeze_ecs::world::World;

use crate::aabb::Aabb;
use crate::EngineError;

/// Registered name of [`TransformComponent`].
pub const TRANSFORM_COMPONENT: &str = "transform";
/// Registered name of [`CollisionComponent`].
pub const COLLISION_COMPONENT: &str = "collision";
/// Registered name of [`RenderComponent`].
pub const RENDER_COMPONENT: &str = "render";

/// Register the engine's component types on `world`.
pub fn register_components(world: &mut World) {
    world.register_component::<TransformComponent>(TRANSFORM_COMPONENT);
    world.register_component::<CollisionComponent>(COLLISION_COMPONENT);
    world.register_component::<RenderComponent>(RENDER_COMPONENT);
}

// ---------------------------------------------------------------------------
// Vector2
// ---------------------------------------------------------------------------

/// 2D vector of `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vector2 {
    /// Construct a vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The zero vector.
    pub const ZERO: Vector2 = Vector2::new(0.0, 0.0);
}

// ---------------------------------------------------------------------------
// ScreenRect / TextureHandle
// ---------------------------------------------------------------------------

/// Integer screen-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl ScreenRect {
    /// Construct a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Opaque handle to a sampleable pixel image owned by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Kinematic state of a movable entity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformComponent {
    /// Position in play-field coordinates.
    pub position: Vector2,
    /// Velocity, in units per 100 ms of frame time.
    pub velocity: Vector2,
}

impl TransformComponent {
    /// Construct a transform from position and velocity.
    pub const fn new(position: Vector2, velocity: Vector2) -> Self {
        Self { position, velocity }
    }
}

/// Collision geometry and boundary flag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionComponent {
    /// Cached copy of the render rectangle, refreshed every frame.
    pub aabb: Aabb,
    /// Whether play-field boundary rules apply.
    pub is_constrained: bool,
}

impl CollisionComponent {
    /// A collision component with an empty box; the sync pass fills it in.
    pub fn new(is_constrained: bool) -> Self {
        Self {
            aabb: Aabb::default(),
            is_constrained,
        }
    }
}

/// What the presentation layer draws for an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderComponent {
    /// Destination rectangle on screen.
    pub dst_rect: ScreenRect,
    /// Texture drawn into `dst_rect`.
    pub texture: TextureHandle,
}

// ---------------------------------------------------------------------------
// SpriteBundle
// ---------------------------------------------------------------------------

/// The usual component set of a game sprite, spawned in one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteBundle {
    /// Initial kinematic state; `None` for static sprites.
    pub transform: Option<TransformComponent>,
    /// Render rectangle and texture.
    pub render: RenderComponent,
    /// Boundary flag; `None` spawns a sprite without collision.
    pub constrained: Option<bool>,
}

impl SpriteBundle {
    /// Spawn the bundle into `world`.
    ///
    /// The collision box starts as a copy of the render rectangle so boundary
    /// rules see the right size before the first collision sync. If any insert
    /// fails the new entity is despawned before the error is returned.
    pub fn spawn(self, world: &mut World) -> Result<EntityId, EngineError> {
        let entity = world.spawn();
        if let Err(err) = self.insert_into(world, entity) {
            world.despawn(entity);
            return Err(err);
        }
        Ok(entity)
    }

    fn insert_into(self, world: &mut World, entity: EntityId) -> Result<(), EngineError> {
        if let Some(transform) = self.transform {
            world.insert_component(entity, transform)?;
        }
        world.insert_component(entity, self.render)?;
        if let Some(is_constrained) = self.constrained {
            world.insert_component(
                entity,
                CollisionComponent {
                    aabb: Aabb::from_rect(self.render.dst_rect),
                    is_constrained,
                },
            )?;
        }
        Ok(())
    }
}
