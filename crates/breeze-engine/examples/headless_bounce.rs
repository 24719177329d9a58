//! Headless demo -- balls bounce around a field and shatter a row of bricks.
//!
//! Run with:
//!   RUST_LOG=breeze_engine=debug cargo run --example headless_bounce -p breeze-engine
//!
//! An optional first argument is a JSON frame configuration, e.g.
//! `'{ "max_entity": 64, "fixed_delta_ms": 8 }'`.

use std::cell::Cell;
use std::rc::Rc;

use breeze_engine::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FIELD_WIDTH: u32 = 320;
const FIELD_HEIGHT: u32 = 240;
const FRAMES: u64 = 600;

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

struct Scene {
    balls: Vec<EntityId>,
    bricks: Vec<EntityId>,
}

fn round_ball(canvas: &mut SoftwareCanvas, diameter: u32) -> TextureHandle {
    let r = diameter as f32 / 2.0;
    let alpha: Vec<u8> = (0..diameter * diameter)
        .map(|i| {
            let (x, y) = ((i % diameter) as f32 + 0.5, (i / diameter) as f32 + 0.5);
            if (x - r).powi(2) + (y - r).powi(2) <= r * r {
                255
            } else {
                0
            }
        })
        .collect();
    canvas.create_from_alpha(diameter, diameter, &alpha)
}

fn build_scene(world: &mut World, canvas: &mut SoftwareCanvas) -> anyhow::Result<Scene> {
    let ball_tex = round_ball(canvas, 10);
    let brick_tex = canvas.create_texture(28, 10, Rgba::new(200, 80, 40, 255));

    let mut bricks = Vec::new();
    for i in 0..10 {
        let x = 4 + i * 32;
        let brick = SpriteBundle {
            transform: None,
            render: RenderComponent {
                dst_rect: ScreenRect::new(x, 20, 28, 10),
                texture: brick_tex,
            },
            constrained: Some(false),
        }
        .spawn(world)?;
        bricks.push(brick);
    }

    let mut balls = Vec::new();
    for (x, y, vx, vy) in [
        (40.0, 120.0, 14.0, -18.0),
        (150.0, 150.0, -11.0, -20.0),
        (260.0, 100.0, 9.0, -16.0),
    ] {
        let ball = SpriteBundle {
            transform: Some(TransformComponent::new(
                Vector2::new(x, y),
                Vector2::new(vx, vy),
            )),
            render: RenderComponent {
                dst_rect: ScreenRect::new(x as i32, y as i32, 10, 10),
                texture: ball_tex,
            },
            constrained: Some(true),
        }
        .spawn(world)?;
        balls.push(ball);
    }

    Ok(Scene { balls, bricks })
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("headless_bounce=info".parse()?),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(json) => FrameConfig::from_json(&json)?,
        None => FrameConfig::default(),
    };

    let mut world = World::new();
    register_components(&mut world);
    let mut canvas = SoftwareCanvas::new();
    let scene = build_scene(&mut world, &mut canvas)?;
    info!(
        balls = scene.balls.len(),
        bricks = scene.bricks.len(),
        ?config,
        "scene ready"
    );

    let score = Rc::new(Cell::new(0u32));
    let mut frames = FrameLoop::new(world, config)?;
    let sink = Rc::clone(&score);
    frames.register_observer(move |destroyed| sink.set(sink.get() + destroyed));

    let viewport = FixedViewport::new(FIELD_WIDTH, FIELD_HEIGHT);
    for _ in 0..FRAMES {
        let delta = frames.config().fixed_delta_ms;
        let report = frames.frame(delta, &canvas, &viewport);
        for pair in &report.collision.collisions {
            info!(frame = report.frame, first = %pair.first, second = %pair.second, contact = ?pair.contact, "collision");
        }
        for culled in &report.transform.destroyed {
            info!(frame = report.frame, entity = %culled, "left the field");
        }
        if frames.world().entity_count() == 0 {
            break;
        }
    }

    let bricks_left = scene
        .bricks
        .iter()
        .filter(|&&b| frames.world().is_alive(b))
        .count();
    info!(
        frames = frames.frame_count(),
        score = score.get(),
        bricks_left,
        alive = frames.world().entity_count(),
        "done"
    );
    Ok(())
}
