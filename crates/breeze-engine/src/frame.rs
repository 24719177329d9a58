//! Frame driver.
//!
//! The [`FrameLoop`] owns the [`World`] and runs the core once per frame:
//!
//! 1. The [`TransformSystem`] integrates positions and applies boundary
//!    rules; out-of-bounds entities are despawned at the end of its pass.
//! 2. The [`CollisionSystem`] syncs boxes, tests pairs and despawns every
//!    colliding entity at the end of its pass.
//! 3. Optionally, render rectangles follow their transforms, standing in for
//!    the presentation layer that normally does this while drawing.
//! 4. The frame counter advances, diagnostics are recorded, and observers are
//!    told how many entities collisions destroyed.
//!
//! # Example
//!
//! ```
//! use breeze_engine::prelude::*;
//!
//! let mut world = World::new();
//! register_components(&mut world);
//!
//! let mut canvas = SoftwareCanvas::new();
//! let texture = canvas.create_texture(8, 8, Rgba::WHITE);
//! for x in [10, 14] {
//!     SpriteBundle {
//!         transform: Some(TransformComponent::new(Vector2::new(x as f32, 10.0), Vector2::ZERO)),
//!         render: RenderComponent { dst_rect: ScreenRect::new(x, 10, 8, 8), texture },
//!         constrained: Some(true),
//!     }
//!     .spawn(&mut world)
//!     .unwrap();
//! }
//!
//! let mut frames = FrameLoop::new(world, FrameConfig::default()).unwrap();
//! let report = frames.frame(16, &canvas, &FixedViewport::new(320, 240));
//!
//! assert_eq!(report.collision.destroyed.len(), 2);
//! assert_eq!(frames.world().entity_count(), 0);
//! assert_eq!(frames.frame_count(), 1);
//! ```

use std::time::{Duration, Instant};

use breeze_ecs::world::World;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collision::{CollisionReport, CollisionSystem};
use crate::components::{RenderComponent, TransformComponent};
use crate::oracle::{PixelOracle, Viewport};
use crate::transform::{TransformReport, TransformSystem};
use crate::EngineError;

// ---------------------------------------------------------------------------
// FrameConfig
// ---------------------------------------------------------------------------

/// Configuration for the frame driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Upper bound on entity ids the collision pass enumerates.
    pub max_entity: u32,
    /// Frame time in milliseconds used by [`FrameLoop::run_frames`].
    pub fixed_delta_ms: u32,
    /// Move each render rectangle to its transform position after a frame.
    pub follow_transforms: bool,
}

impl Default for FrameConfig {
    /// 1000 entities, 16 ms frames (about 60 Hz), render rectangles follow
    /// transforms.
    fn default() -> Self {
        Self {
            max_entity: 1000,
            fixed_delta_ms: 16,
            follow_transforms: true,
        }
    }
}

impl FrameConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: FrameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the driver cannot run.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_entity == 0 {
            return Err(EngineError::InvalidConfig(
                "max_entity must be positive".to_owned(),
            ));
        }
        if self.fixed_delta_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "fixed_delta_ms must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FrameDiagnostics / FrameReport
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last frame.
#[derive(Debug, Clone, Default)]
pub struct FrameDiagnostics {
    /// Wall-clock time of the integrator pass.
    pub transform_time: Duration,
    /// Wall-clock time of the collision pass.
    pub collision_time: Duration,
    /// Total time for the frame.
    pub total_time: Duration,
}

/// Everything that happened in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Index of the frame, starting at 1.
    pub frame: u64,
    /// Integrator outcome.
    pub transform: TransformReport,
    /// Collision outcome.
    pub collision: CollisionReport,
}

impl FrameReport {
    /// Entities destroyed by either subsystem.
    pub fn destroyed_count(&self) -> usize {
        self.transform.destroyed.len() + self.collision.destroyed.len()
    }
}

/// Callback receiving the number of entities collisions destroyed in a frame.
pub type DestructionObserver = Box<dyn FnMut(u32)>;

// ---------------------------------------------------------------------------
// FrameLoop
// ---------------------------------------------------------------------------

/// Runs the integrator and the collision engine once per frame.
pub struct FrameLoop {
    world: World,
    transform: TransformSystem,
    collision: CollisionSystem,
    config: FrameConfig,
    frame_counter: u64,
    last_diagnostics: FrameDiagnostics,
    observers: Vec<DestructionObserver>,
}

impl FrameLoop {
    /// Create a driver around `world`. The engine components must already be
    /// registered on it.
    pub fn new(world: World, config: FrameConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            world,
            transform: TransformSystem::new(),
            collision: CollisionSystem::new(),
            config,
            frame_counter: 0,
            last_diagnostics: FrameDiagnostics::default(),
            observers: Vec::new(),
        })
    }

    /// Register a callback notified after every frame in which collisions
    /// destroyed at least one entity.
    pub fn register_observer(&mut self, observer: impl FnMut(u32) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Run one frame.
    pub fn frame(
        &mut self,
        delta_ms: u32,
        oracle: &dyn PixelOracle,
        viewport: &dyn Viewport,
    ) -> FrameReport {
        let frame_start = Instant::now();

        let transform = self.transform.update(&mut self.world, viewport, delta_ms);
        let transform_time = frame_start.elapsed();

        let collision_start = Instant::now();
        let bound = self.config.max_entity.min(self.world.max_entity_id());
        let collision = self
            .collision
            .update_bounded(&mut self.world, oracle, bound);
        let collision_time = collision_start.elapsed();

        if self.config.follow_transforms {
            follow_transforms(&mut self.world);
        }

        self.frame_counter += 1;
        self.last_diagnostics = FrameDiagnostics {
            transform_time,
            collision_time,
            total_time: frame_start.elapsed(),
        };

        let collided = collision.destroyed.len() as u32;
        if collided > 0 {
            for observer in &mut self.observers {
                observer(collided);
            }
        }

        debug!(
            frame = self.frame_counter,
            alive = self.world.entity_count(),
            culled = transform.destroyed.len(),
            collided,
            "frame complete"
        );

        FrameReport {
            frame: self.frame_counter,
            transform,
            collision,
        }
    }

    /// Run `count` frames of [`FrameConfig::fixed_delta_ms`] each.
    ///
    /// Returns the total number of destroyed entities.
    pub fn run_frames(
        &mut self,
        count: u64,
        oracle: &dyn PixelOracle,
        viewport: &dyn Viewport,
    ) -> u64 {
        let delta = self.config.fixed_delta_ms;
        (0..count)
            .map(|_| self.frame(delta, oracle, viewport).destroyed_count() as u64)
            .sum()
    }

    // -- accessors ----------------------------------------------------------

    /// Number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_counter
    }

    /// Read-only access to the world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for setup between frames.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The driver configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Diagnostics from the last frame.
    pub fn last_diagnostics(&self) -> &FrameDiagnostics {
        &self.last_diagnostics
    }
}

/// Move each render rectangle to its entity's transform position (truncated).
pub fn follow_transforms(world: &mut World) {
    for entity in world.entities_with::<TransformComponent>() {
        let Some(position) = world
            .get_component::<TransformComponent>(entity)
            .map(|t| t.position)
        else {
            continue;
        };
        if let Some(render) = world.get_component_mut::<RenderComponent>(entity) {
            render.dst_rect.x = position.x as i32;
            render.dst_rect.y = position.y as i32;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
