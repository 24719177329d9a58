//! Frame driver ordering, observers and determinism.

use std::cell::RefCell;
use std::rc::Rc;

use breeze_engine::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

const FIELD: FixedViewport = FixedViewport::new(320, 240);

fn setup_world() -> World {
    let mut world = World::new();
    register_components(&mut world);
    world
}

fn sprite(
    world: &mut World,
    texture: TextureHandle,
    position: (f32, f32),
    velocity: (f32, f32),
    size: i32,
) -> EntityId {
    SpriteBundle {
        transform: Some(TransformComponent::new(
            Vector2::new(position.0, position.1),
            Vector2::new(velocity.0, velocity.1),
        )),
        render: RenderComponent {
            dst_rect: ScreenRect::new(position.0 as i32, position.1 as i32, size, size),
            texture,
        },
        constrained: Some(true),
    }
    .spawn(world)
    .unwrap()
}

#[test]
fn culled_entities_never_reach_the_collision_pass() {
    let mut canvas = SoftwareCanvas::new();
    let tex = canvas.create_texture(10, 10, Rgba::WHITE);
    let mut world = setup_world();
    // Render rect still overlaps `b`, but the transform is far off-field.
    let a = sprite(&mut world, tex, (-50.0, 10.0), (0.0, 0.0), 10);
    world.get_component_mut::<RenderComponent>(a).unwrap().dst_rect = ScreenRect::new(2, 10, 10, 10);
    let b = sprite(&mut world, tex, (0.0, 10.0), (0.0, 0.0), 10);

    let mut frames = FrameLoop::new(world, FrameConfig::default()).unwrap();
    let report = frames.frame(16, &canvas, &FIELD);

    assert_eq!(report.transform.destroyed, vec![a]);
    assert!(report.collision.collisions.is_empty());
    assert!(frames.world().is_alive(b));
}

#[test]
fn approaching_sprites_collide_and_notify_observers() {
    let mut canvas = SoftwareCanvas::new();
    let tex = canvas.create_texture(8, 8, Rgba::WHITE);
    let mut world = setup_world();
    let left = sprite(&mut world, tex, (40.0, 20.0), (20.0, 0.0), 8);
    let right = sprite(&mut world, tex, (80.0, 20.0), (-20.0, 0.0), 8);
    let bystander = sprite(&mut world, tex, (200.0, 20.0), (0.0, 0.0), 8);

    let counts = Rc::new(RefCell::new(Vec::new()));
    let mut frames = FrameLoop::new(world, FrameConfig::default()).unwrap();
    let sink = Rc::clone(&counts);
    frames.register_observer(move |n| sink.borrow_mut().push(n));

    let mut hit_frame = None;
    for _ in 0..30 {
        let report = frames.frame(16, &canvas, &FIELD);
        if !report.collision.destroyed.is_empty() {
            assert!(report.collision.collided(left, right));
            hit_frame = Some(report.frame);
            break;
        }
    }

    assert!(hit_frame.is_some());
    assert_eq!(*counts.borrow(), vec![2]);
    assert!(!frames.world().is_alive(left));
    assert!(!frames.world().is_alive(right));
    assert!(frames.world().is_alive(bystander));
}

#[test]
fn every_observer_is_called() {
    let mut canvas = SoftwareCanvas::new();
    let tex = canvas.create_texture(8, 8, Rgba::WHITE);
    let mut world = setup_world();
    sprite(&mut world, tex, (10.0, 10.0), (0.0, 0.0), 8);
    sprite(&mut world, tex, (12.0, 12.0), (0.0, 0.0), 8);

    let total = Rc::new(RefCell::new(0u32));
    let mut frames = FrameLoop::new(world, FrameConfig::default()).unwrap();
    for _ in 0..3 {
        let sink = Rc::clone(&total);
        frames.register_observer(move |n| *sink.borrow_mut() += n);
    }

    frames.frame(16, &canvas, &FIELD);
    assert_eq!(*total.borrow(), 6);
}

#[test]
fn max_entity_bounds_the_collision_pass() {
    let mut canvas = SoftwareCanvas::new();
    let tex = canvas.create_texture(8, 8, Rgba::WHITE);
    let mut world = setup_world();
    let a = sprite(&mut world, tex, (10.0, 10.0), (0.0, 0.0), 8);
    let b = sprite(&mut world, tex, (12.0, 12.0), (0.0, 0.0), 8);

    let config = FrameConfig {
        max_entity: 1,
        ..Default::default()
    };
    let mut frames = FrameLoop::new(world, config).unwrap();
    let report = frames.frame(16, &canvas, &FIELD);

    assert_eq!(report.collision.synced, 1);
    assert!(frames.world().is_alive(a));
    assert!(frames.world().is_alive(b));
}

#[test]
fn render_rects_follow_transforms_when_enabled() {
    let canvas = SoftwareCanvas::new();
    let mut world = setup_world();
    let e = sprite(&mut world, TextureHandle(9), (10.0, 10.0), (50.0, 0.0), 4);

    let mut frames = FrameLoop::new(world, FrameConfig::default()).unwrap();
    frames.frame(100, &canvas, &FIELD);
    let rect = frames.world().get_component::<RenderComponent>(e).unwrap().dst_rect;
    assert_eq!((rect.x, rect.y), (60, 10));

    let mut world = setup_world();
    let e = sprite(&mut world, TextureHandle(9), (10.0, 10.0), (50.0, 0.0), 4);
    let config = FrameConfig {
        follow_transforms: false,
        ..Default::default()
    };
    let mut frames = FrameLoop::new(world, config).unwrap();
    frames.frame(100, &canvas, &FIELD);
    let rect = frames.world().get_component::<RenderComponent>(e).unwrap().dst_rect;
    assert_eq!((rect.x, rect.y), (10, 10));
}

#[test]
fn run_frames_uses_fixed_delta() {
    let canvas = SoftwareCanvas::new();
    let mut world = setup_world();
    let e = sprite(&mut world, TextureHandle(1), (0.0, 0.0), (10.0, 0.0), 4);

    let config = FrameConfig::from_json(r#"{ "fixed_delta_ms": 10 }"#).unwrap();
    let mut frames = FrameLoop::new(world, config).unwrap();
    frames.run_frames(5, &canvas, &FIELD);

    let x = frames
        .world()
        .get_component::<TransformComponent>(e)
        .unwrap()
        .position
        .x;
    assert!((x - 5.0).abs() < 1e-4);
    assert_eq!(frames.frame_count(), 5);
}

// -- determinism ------------------------------------------------------------

fn random_scene(seed: u64) -> (World, SoftwareCanvas) {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut canvas = SoftwareCanvas::new();
    let square = canvas.create_texture(8, 8, Rgba::WHITE);
    let ring = canvas.create_texture(12, 12, Rgba::WHITE);
    canvas
        .fill_rect(ring, ScreenRect::new(3, 3, 6, 6), Rgba::TRANSPARENT)
        .unwrap();

    let mut world = setup_world();
    for _ in 0..48 {
        let texture = if rng.gen_bool(0.5) { square } else { ring };
        let size = canvas.texture_size(texture).unwrap().width as i32;
        let position = (rng.gen_range(0.0..300.0f32), rng.gen_range(0.0..60.0f32));
        let velocity = (rng.gen_range(-30.0..30.0f32), rng.gen_range(-30.0..30.0f32));
        sprite(&mut world, texture, position, velocity, size);
    }
    (world, canvas)
}

fn world_hash(world: &World) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for entity in world.entities_with::<TransformComponent>() {
        let Some(t) = world.get_component::<TransformComponent>(entity) else {
            continue;
        };
        hasher.update(&entity.to_raw().to_le_bytes());
        for v in [t.position.x, t.position.y, t.velocity.x, t.velocity.y] {
            hasher.update(&v.to_bits().to_le_bytes());
        }
    }
    hasher.finalize()
}

fn run_scene(seed: u64, frames: u64) -> (blake3::Hash, u64) {
    let (world, canvas) = random_scene(seed);
    let mut driver = FrameLoop::new(world, FrameConfig::default()).unwrap();
    let destroyed = driver.run_frames(frames, &canvas, &FIELD);
    (world_hash(driver.world()), destroyed)
}

#[test]
fn identical_scenes_produce_identical_worlds() {
    let (hash_a, destroyed_a) = run_scene(0xB4EE2E, 120);
    let (hash_b, destroyed_b) = run_scene(0xB4EE2E, 120);
    assert_eq!(hash_a, hash_b);
    assert_eq!(destroyed_a, destroyed_b);
}

#[test]
fn different_seeds_diverge() {
    let (hash_a, _) = run_scene(1, 30);
    let (hash_b, _) = run_scene(2, 30);
    assert_ne!(hash_a, hash_b);
}
