//! Breeze Engine -- per-frame physics integration and pixel-accurate collision.
//!
//! This crate builds on [`breeze_ecs`] to provide the two per-frame passes of
//! a small 2D game engine:
//!
//! - [`transform::TransformSystem`] advances positions and enforces play-field
//!   boundaries (bounce, clamp, destroy) for constrained entities.
//! - [`collision::CollisionSystem`] syncs collision boxes from render
//!   rectangles, culls pairs with an AABB test, confirms them against sprite
//!   alpha through a [`oracle::PixelOracle`], and destroys every colliding
//!   entity.
//!
//! [`frame::FrameLoop`] runs both in order. Rendering, input and windowing
//! stay outside; the core only sees them through the [`oracle::PixelOracle`]
//! and [`oracle::Viewport`] traits.
//!
//! # Quick Start
//!
//! ```
//! use breeze_engine::prelude::*;
//!
//! let mut world = World::new();
//! register_components(&mut world);
//!
//! let mut canvas = SoftwareCanvas::new();
//! let ball = canvas.create_texture(10, 10, Rgba::WHITE);
//! let e = SpriteBundle {
//!     transform: Some(TransformComponent::new(Vector2::new(-5.0, 10.0), Vector2::new(-3.0, 0.0))),
//!     render: RenderComponent { dst_rect: ScreenRect::new(0, 10, 10, 10), texture: ball },
//!     constrained: Some(true),
//! }
//! .spawn(&mut world)
//! .unwrap();
//!
//! let mut integrator = TransformSystem::new();
//! integrator.update(&mut world, &FixedViewport::new(100, 100), 0);
//!
//! let t = world.get_component::<TransformComponent>(e).unwrap();
//! assert_eq!(t.position.x, 0.0);
//! assert_eq!(t.velocity.x, 3.0);
//! ```

#![deny(unsafe_code)]

pub mod aabb;
pub mod canvas;
pub mod collision;
pub mod components;
pub mod frame;
pub mod oracle;
pub mod transform;

/// Re-export the ECS crate for convenience.
pub use breeze_ecs;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by engine setup. Per-frame updates never fail.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A configuration value is out of range.
    #[error("invalid frame configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed.
    #[error("failed to parse frame configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// The entity store rejected an operation.
    #[error(transparent)]
    Ecs(#[from] breeze_ecs::EcsError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use breeze_ecs::prelude::*;

    pub use crate::aabb::Aabb;
    pub use crate::canvas::{decode_rgba8888, encode_rgba8888, Rgba, SoftwareCanvas};
    pub use crate::collision::{
        pixel_collision, sync_collision_boxes, CollisionPair, CollisionReport, CollisionSystem,
    };
    pub use crate::components::{
        register_components, CollisionComponent, RenderComponent, ScreenRect, SpriteBundle,
        TextureHandle, TransformComponent, Vector2,
    };
    pub use crate::frame::{
        follow_transforms, DestructionObserver, FrameConfig, FrameDiagnostics, FrameLoop,
        FrameReport,
    };
    pub use crate::oracle::{
        is_solid, AlphaRegion, FixedViewport, OracleError, PixelOracle, TextureSize, Viewport,
        SOLID_ALPHA_THRESHOLD,
    };
    pub use crate::transform::{
        apply_boundaries, BoundaryOutcome, TransformReport, TransformSystem, BOUNCE_LINE_RATIO,
        TIME_SCALE,
    };
    pub use crate::EngineError;
}
