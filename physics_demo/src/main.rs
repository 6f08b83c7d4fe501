//! Headless Physics Demo
//!
//! Drops a pile of boxes and balls onto a floor and reports what happened:
//! - Boxes and balls scattered above a static floor
//! - A bouncy spring ball using penalty contacts
//! - A pickup trigger that deactivates itself when touched
//! - A rope hanging from a fixed anchor
//!
//! Usage: `physics_demo [config.toml|config.ron]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_physics::foundation::logging;
use rust_physics::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

// Scene layout
const FLOOR_HALF_SIZE: f32 = 30.0;
const NUM_BOXES: usize = 20;
const NUM_BALLS: usize = 20;
const DROP_HEIGHT: f32 = 12.0;
const SPREAD: f32 = 8.0;

// Timing
const FRAME_DT: f32 = 1.0 / 60.0;
const SIMULATED_SECONDS: f32 = 10.0;

struct DemoScene {
    world: World,
    physics: PhysicsSystem,
    pickup: Entity,
    pickup_touches: Rc<Cell<u32>>,
}

impl DemoScene {
    fn new(config: PhysicsConfig) -> Self {
        let physics = PhysicsSystem::new(config);
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(7);

        world.add_object(
            GameObject::new("floor")
                .at(Vec3::new(0.0, -1.0, 0.0))
                .with_volume(CollisionVolume::aabb(Vec3::new(FLOOR_HALF_SIZE, 1.0, FLOOR_HALF_SIZE)))
                .with_physics(PhysicsObject::new_static())
                .with_layers(CollisionLayers::ENVIRONMENT | CollisionLayers::DEFAULT),
        );

        for i in 0..NUM_BOXES {
            let half = Vec3::repeat(rng.gen_range(0.3..0.8));
            let volume = CollisionVolume::obb(half);
            let mut body = physics.create_physics_object(rng.gen_range(0.5..2.0));
            body.init_volume_inertia(&volume);
            let rotation = Quat::from_axis_angle(&Vec3::y_axis(), rng.gen_range(0.0..std::f32::consts::PI));
            let position = Vec3::new(
                rng.gen_range(-SPREAD..SPREAD),
                rng.gen_range(2.0..DROP_HEIGHT),
                rng.gen_range(-SPREAD..SPREAD),
            );
            world.add_object(
                GameObject::new(format!("box {i}"))
                    .with_transform(Transform::from_position_rotation(position, rotation))
                    .with_volume(volume)
                    .with_physics(body),
            );
        }

        for i in 0..NUM_BALLS {
            let volume = CollisionVolume::sphere(rng.gen_range(0.25..0.6));
            let mut body = physics.create_physics_object(1.0).with_material(0.6, 0.4);
            body.init_volume_inertia(&volume);
            world.add_object(
                GameObject::new(format!("ball {i}"))
                    .at(Vec3::new(
                        rng.gen_range(-SPREAD..SPREAD),
                        rng.gen_range(2.0..DROP_HEIGHT),
                        rng.gen_range(-SPREAD..SPREAD),
                    ))
                    .with_volume(volume)
                    .with_physics(body),
            );
        }

        let spring_volume = CollisionVolume::sphere(0.75);
        let mut spring_body = physics.create_physics_object(1.0).with_stiffness(400.0);
        spring_body.init_volume_inertia(&spring_volume);
        world.add_object(
            GameObject::new("spring ball")
                .at(Vec3::new(SPREAD + 4.0, 6.0, 0.0))
                .with_volume(spring_volume)
                .with_physics(spring_body)
                .as_spring(),
        );

        let pickup = world.add_object(
            GameObject::new("pickup")
                .at(Vec3::new(0.0, 0.75, 0.0))
                .with_volume(CollisionVolume::sphere(1.5))
                .as_trigger(),
        );
        let pickup_touches = Rc::new(Cell::new(0));
        let touches = Rc::clone(&pickup_touches);
        world.set_handler(
            pickup,
            Box::new(move |event: &CollisionEvent| {
                if event.kind == CollisionEventKind::Trigger {
                    touches.set(touches.get() + 1);
                    log::info!("pickup collected by {}", event.other);
                    HandlerResponse::Deactivate
                } else {
                    HandlerResponse::Continue
                }
            }),
        );

        let anchor = world.add_object(
            GameObject::new("rope anchor")
                .at(Vec3::new(-SPREAD - 4.0, 8.0, 0.0))
                .with_physics(PhysicsObject::new_static()),
        );
        let weight_volume = CollisionVolume::capsule(0.6, 0.3);
        let mut weight_body = physics.create_physics_object(1.0);
        weight_body.init_volume_inertia(&weight_volume);
        let weight = world.add_object(
            GameObject::new("rope weight")
                .at(Vec3::new(-SPREAD - 1.0, 8.0, 0.0))
                .with_volume(weight_volume)
                .with_physics(weight_body),
        );
        world.add_constraint(Box::new(PositionOrientationConstraint::new(anchor, weight, 3.0)));

        log::info!("scene ready with {} objects", world.object_count());
        Self {
            world,
            physics,
            pickup,
            pickup_touches,
        }
    }

    fn run(&mut self) {
        let mut stopwatch = Stopwatch::start_new();
        let mut begins = 0_usize;
        let mut ends = 0_usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frames = (SIMULATED_SECONDS / FRAME_DT).round() as u32;

        for frame in 0..frames {
            self.physics.update(&mut self.world, FRAME_DT);
            for event in self.world.drain_events() {
                match event.kind {
                    CollisionEventKind::Begin => begins += 1,
                    CollisionEventKind::End => ends += 1,
                    CollisionEventKind::Trigger => {}
                }
            }
            if frame % 60 == 0 {
                log::debug!(
                    "t = {:.1}s: {} contacts, {} asleep, {} Hz",
                    f64::from(frame) * f64::from(FRAME_DT),
                    self.physics.collision_count(),
                    self.asleep_count(),
                    self.physics.simulation_hz()
                );
            }
        }
        stopwatch.stop();

        println!("Simulated {SIMULATED_SECONDS:.1}s in {:.1} ms", stopwatch.elapsed_secs() * 1000.0);
        println!("  collision begins: {begins}, ends: {ends}");
        println!("  live contacts:    {}", self.physics.collision_count());
        println!("  asleep:           {} / {}", self.asleep_count(), self.world.object_count());
        println!("  simulation rate:  {} Hz", self.physics.simulation_hz());
        println!(
            "  pickup:           {} ({} touches)",
            if self.world.object(self.pickup).is_some() { "present" } else { "collected" },
            self.pickup_touches.get()
        );

        let down = Ray::new(Vec3::new(0.0, 50.0, 0.0), -Vec3::y());
        match self.physics.raycast(&self.world, &down, true) {
            Some(hit) => {
                let name = hit
                    .entity
                    .and_then(|e| self.world.object(e))
                    .map_or("?", GameObject::name);
                println!("  ray from above hits '{name}' at y = {:.2}", hit.point.y);
            }
            None => println!("  ray from above hits nothing"),
        }
    }

    fn asleep_count(&self) -> usize {
        self.world.objects().iter().filter(|o| o.is_asleep()).count()
    }
}

fn load_config() -> Result<PhysicsConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading physics config from {path}");
            PhysicsConfig::load_validated(&path)
        }
        None => Ok(PhysicsConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");

    println!("=== Physics Demo ===");
    println!("Dropping {NUM_BOXES} boxes and {NUM_BALLS} balls for {SIMULATED_SECONDS:.0} simulated seconds");
    println!();

    let config = load_config()?;
    let mut scene = DemoScene::new(config);
    scene.run();
    Ok(())
}
