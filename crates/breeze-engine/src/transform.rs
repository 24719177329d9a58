//! Transform/physics integrator.
//!
//! Each frame [`TransformSystem::update`] advances every entity carrying a
//! [`TransformComponent`] by `velocity * delta_ms * 0.01`, then applies the
//! play-field rules to entities whose [`CollisionComponent`] is constrained:
//!
//! 1. Horizontal bounce/clamp against `[0, W - width]`.
//! 2. Horizontal cull when the entity is fully past either side.
//! 3. Vertical bounce off the top edge, and a velocity flip below the line at
//!    30% of the play-field height.
//! 4. Floor clamp at `H - height`.
//! 5. Vertical cull, tested with the entity's *width* (see
//!    [`apply_boundaries`]).
//!
//! Cull tests look at where integration put the entity on that axis, before
//! the clamps of the same axis moved it back into the field. Culled entities
//! are queued for destruction and despawned after the whole pass.

use breeze_ecs::command::{Axis, CausalReason, CommandBuffer, SystemId};
use breeze_ecs::entity::EntityId;
use breeze_ecs::world::World;
use tracing::{debug, trace};

use crate::components::{CollisionComponent, TransformComponent};
use crate::oracle::Viewport;

/// Scale from `velocity * milliseconds` to position units.
pub const TIME_SCALE: f32 = 0.01;

/// Fraction of the play-field height past which vertical velocity flips.
pub const BOUNCE_LINE_RATIO: f32 = 0.3;

// ---------------------------------------------------------------------------
// Boundary rules
// ---------------------------------------------------------------------------

/// What the boundary rules did to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryOutcome {
    /// A velocity component was negated.
    pub bounced: bool,
    /// The entity left the field on this axis and must be destroyed.
    pub culled: Option<Axis>,
}

/// Apply the play-field rules to one constrained entity.
///
/// `field` is the viewport `(W, H)` and `size` the entity's cached
/// `(width, height)`. Processing stops at the horizontal cull.
///
/// The vertical cull compares `y + width` and `H + width`, not the height.
pub fn apply_boundaries(
    transform: &mut TransformComponent,
    field: (f32, f32),
    size: (f32, f32),
) -> BoundaryOutcome {
    let (field_w, field_h) = field;
    let (width, height) = size;
    let mut outcome = BoundaryOutcome::default();

    let x = transform.position.x;
    if x > field_w - width {
        transform.velocity.x = -transform.velocity.x;
        transform.position.x = field_w - width;
        outcome.bounced = true;
    } else if x < 0.0 {
        transform.velocity.x = -transform.velocity.x;
        transform.position.x = 0.0;
        outcome.bounced = true;
    }
    if x + width < 0.0 || x > field_w + width {
        outcome.culled = Some(Axis::Horizontal);
        return outcome;
    }

    let y = transform.position.y;
    if y < 0.0 {
        transform.velocity.y = -transform.velocity.y;
        transform.position.y = 0.0;
        outcome.bounced = true;
    } else if y > field_h * BOUNCE_LINE_RATIO {
        transform.velocity.y = -transform.velocity.y;
        outcome.bounced = true;
    }
    if transform.position.y > field_h - height {
        transform.position.y = field_h - height;
    }
    if y + width < 0.0 || y > field_h + width {
        outcome.culled = Some(Axis::Vertical);
    }

    outcome
}

// ---------------------------------------------------------------------------
// TransformSystem
// ---------------------------------------------------------------------------

/// Result of one integrator pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
    /// Entities whose position was integrated.
    pub moved: usize,
    /// Constrained entities that bounced off a boundary.
    pub bounced: Vec<EntityId>,
    /// Entities destroyed for leaving the play field.
    pub destroyed: Vec<EntityId>,
}

/// Advances kinematic state and enforces play-field boundaries.
#[derive(Debug, Default)]
pub struct TransformSystem {
    commands: CommandBuffer,
}

impl TransformSystem {
    /// Create the system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one integrator pass over every entity with a transform.
    pub fn update(
        &mut self,
        world: &mut World,
        viewport: &dyn Viewport,
        delta_ms: u32,
    ) -> TransformReport {
        let (w, h) = viewport.viewport_size();
        let field = (w as f32, h as f32);
        let mut report = TransformReport::default();

        for entity in world.entities_with::<TransformComponent>() {
            // Copy out the box size first; the transform is borrowed mutably below.
            let constraint = world
                .get_component::<CollisionComponent>(entity)
                .filter(|c| c.is_constrained)
                .map(|c| (c.aabb.width, c.aabb.height));

            let Some(transform) = world.get_component_mut::<TransformComponent>(entity) else {
                continue;
            };
            transform.position.x += transform.velocity.x * delta_ms as f32 * TIME_SCALE;
            transform.position.y += transform.velocity.y * delta_ms as f32 * TIME_SCALE;
            report.moved += 1;

            let Some(size) = constraint else {
                continue;
            };
            let outcome = apply_boundaries(transform, field, size);
            if outcome.bounced {
                trace!(entity = %entity, velocity = ?transform.velocity, "bounced");
                report.bounced.push(entity);
            }
            if let Some(axis) = outcome.culled {
                self.commands
                    .despawn(entity, SystemId::TRANSFORM, CausalReason::OutOfBounds(axis));
            }
        }

        for cmd in self.commands.apply(world) {
            if cmd.applied_successfully {
                report.destroyed.push(cmd.target);
            }
        }

        debug!(
            moved = report.moved,
            bounced = report.bounced.len(),
            destroyed = report.destroyed.len(),
            "transform pass complete"
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
