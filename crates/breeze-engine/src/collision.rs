//! Two-phase collision detection with pixel-accurate narrow phase.
//!
//! [`CollisionSystem::update`] runs once per frame:
//!
//! 1. **Sync**: every entity with both a [`CollisionComponent`] and a
//!    [`RenderComponent`] gets `aabb = dst_rect`. This pass is the only writer
//!    of the cached box.
//! 2. **Broad phase**: every unordered pair `(e1, e2)`, `e1 < e2`, is tested
//!    with [`Aabb::overlaps`].
//! 3. **Narrow phase**: surviving pairs are tested with [`pixel_collision`],
//!    which scans the intersection of both sprites for a pixel that is solid
//!    in both textures.
//! 4. Both members of every colliding pair go into a destruction set, which is
//!    despawned after every pair has been tested.
//!
//! Oracle failures never escape: an unreadable texture has zero area and an
//! unreadable region has no solid pixels.

use std::collections::BTreeMap;

use breeze_ecs::command::{CausalReason, CommandBuffer, SystemId};
use breeze_ecs::entity::EntityId;
use breeze_ecs::world::World;
use tracing::{debug, trace};

use crate::aabb::Aabb;
use crate::components::{CollisionComponent, RenderComponent, ScreenRect, TextureHandle};
use crate::oracle::{is_solid, PixelOracle, TextureSize};

// ---------------------------------------------------------------------------
// Sync pass
// ---------------------------------------------------------------------------

/// Copy each render rectangle into its collision box, for ids `1..=max_entity`.
///
/// Returns the number of boxes written.
pub fn sync_collision_boxes(world: &mut World, max_entity: u32) -> usize {
    let mut synced = 0;
    for entity in EntityId::range_to(max_entity) {
        let Some(dst_rect) = world
            .get_component::<RenderComponent>(entity)
            .map(|r| r.dst_rect)
        else {
            continue;
        };
        if let Some(collision) = world.get_component_mut::<CollisionComponent>(entity) {
            collision.aabb = Aabb::from_rect(dst_rect);
            synced += 1;
        }
    }
    synced
}

// ---------------------------------------------------------------------------
// Narrow phase
// ---------------------------------------------------------------------------

fn texture_size_or_zero(oracle: &dyn PixelOracle, texture: TextureHandle) -> TextureSize {
    oracle.texture_size(texture).unwrap_or_else(|e| {
        trace!(texture = ?texture, error = %e, "texture size unavailable, treating as empty");
        TextureSize::ZERO
    })
}

/// Pixel-accurate overlap test between two placed sprites.
///
/// `rect_a`/`rect_b` supply the screen origin of each sprite; the extent comes
/// from each texture's native size. Both textures are read once over the
/// intersection and scanned row by row. Returns the screen coordinate of the
/// first pixel that is solid in both, or `None`.
pub fn pixel_collision(
    oracle: &dyn PixelOracle,
    texture_a: TextureHandle,
    rect_a: ScreenRect,
    texture_b: TextureHandle,
    rect_b: ScreenRect,
) -> Option<(i32, i32)> {
    let size_a = texture_size_or_zero(oracle, texture_a);
    let size_b = texture_size_or_zero(oracle, texture_b);

    let top = rect_a.y.max(rect_b.y);
    let bottom = rect_a
        .y
        .saturating_add(size_a.height as i32)
        .min(rect_b.y.saturating_add(size_b.height as i32));
    let left = rect_a.x.max(rect_b.x);
    let right = rect_a
        .x
        .saturating_add(size_a.width as i32)
        .min(rect_b.x.saturating_add(size_b.width as i32));
    if top >= bottom || left >= right {
        return None;
    }

    let width = right - left;
    let height = bottom - top;
    let region_a = ScreenRect::new(left - rect_a.x, top - rect_a.y, width, height);
    let region_b = ScreenRect::new(left - rect_b.x, top - rect_b.y, width, height);

    let alpha_a = match oracle.read_alpha(texture_a, region_a) {
        Ok(region) => region,
        Err(e) => {
            trace!(texture = ?texture_a, error = %e, "region read failed, treating as transparent");
            return None;
        }
    };
    let alpha_b = match oracle.read_alpha(texture_b, region_b) {
        Ok(region) => region,
        Err(e) => {
            trace!(texture = ?texture_b, error = %e, "region read failed, treating as transparent");
            return None;
        }
    };

    for dy in 0..height as usize {
        for dx in 0..width as usize {
            if is_solid(alpha_a.get(dx, dy)) && is_solid(alpha_b.get(dx, dy)) {
                return Some((left + dx as i32, top + dy as i32));
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// CollisionPair / CollisionReport
// ---------------------------------------------------------------------------

/// Two entities whose sprites touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    /// Lower id of the pair.
    pub first: EntityId,
    /// Higher id of the pair.
    pub second: EntityId,
    /// Screen pixel where the overlap was found.
    pub contact: (i32, i32),
}

/// Result of one collision pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Collision boxes refreshed by the sync pass.
    pub synced: usize,
    /// Pairs whose boxes overlapped and went to the narrow phase.
    pub broad_phase_hits: usize,
    /// Pairs that collided at pixel level, in test order.
    pub collisions: Vec<CollisionPair>,
    /// Entities despawned, ascending.
    pub destroyed: Vec<EntityId>,
}

impl CollisionReport {
    /// Whether the pair `(a, b)` collided, in either order.
    pub fn collided(&self, a: EntityId, b: EntityId) -> bool {
        self.collisions
            .iter()
            .any(|p| (p.first == a && p.second == b) || (p.first == b && p.second == a))
    }
}

// ---------------------------------------------------------------------------
// CollisionSystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Collider {
    entity: EntityId,
    aabb: Aabb,
    texture: TextureHandle,
}

/// Per-frame collision detection and destruction.
#[derive(Debug, Default)]
pub struct CollisionSystem {
    commands: CommandBuffer,
}

impl CollisionSystem {
    /// Create the system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a pass over every id the world has allocated.
    pub fn update(&mut self, world: &mut World, oracle: &dyn PixelOracle) -> CollisionReport {
        let bound = world.max_entity_id();
        self.update_bounded(world, oracle, bound)
    }

    /// Run a pass over ids `1..=max_entity`.
    pub fn update_bounded(
        &mut self,
        world: &mut World,
        oracle: &dyn PixelOracle,
        max_entity: u32,
    ) -> CollisionReport {
        let mut report = CollisionReport {
            synced: sync_collision_boxes(world, max_entity),
            ..Default::default()
        };

        let colliders: Vec<Collider> = EntityId::range_to(max_entity)
            .filter_map(|entity| {
                let collision = world.get_component::<CollisionComponent>(entity)?;
                let render = world.get_component::<RenderComponent>(entity)?;
                Some(Collider {
                    entity,
                    aabb: collision.aabb,
                    texture: render.texture,
                })
            })
            .collect();

        // First pair that condemned each entity; keys form the destruction set.
        let mut condemned: BTreeMap<EntityId, (EntityId, EntityId)> = BTreeMap::new();

        for (i, a) in colliders.iter().enumerate() {
            for b in &colliders[i + 1..] {
                if !a.aabb.overlaps(&b.aabb) {
                    continue;
                }
                report.broad_phase_hits += 1;

                let Some(contact) = pixel_collision(
                    oracle,
                    a.texture,
                    a.aabb.to_rect(),
                    b.texture,
                    b.aabb.to_rect(),
                ) else {
                    trace!(first = %a.entity, second = %b.entity, "boxes overlap, pixels do not");
                    continue;
                };

                trace!(first = %a.entity, second = %b.entity, ?contact, "pixel collision");
                report.collisions.push(CollisionPair {
                    first: a.entity,
                    second: b.entity,
                    contact,
                });
                condemned.entry(a.entity).or_insert((a.entity, b.entity));
                condemned.entry(b.entity).or_insert((a.entity, b.entity));
            }
        }

        for (entity, (first, second)) in condemned {
            self.commands.despawn(
                entity,
                SystemId::COLLISION,
                CausalReason::CollisionResponse(first, second),
            );
        }
        for cmd in self.commands.apply(world) {
            if cmd.applied_successfully {
                report.destroyed.push(cmd.target);
            }
        }

        debug!(
            colliders = colliders.len(),
            broad_phase_hits = report.broad_phase_hits,
            collisions = report.collisions.len(),
            destroyed = report.destroyed.len(),
            "collision pass complete"
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
