//! Physics system
//!
//! Advances a [`World`] in fixed steps. Each step:
//! 1. Integrates forces into velocities
//! 2. Builds candidate pairs in the broadphase
//! 3. Runs the narrow phase and resolves each contact as it is found
//! 4. Relaxes constraints over several sub-steps
//! 5. Integrates velocities into positions
//!
//! Once per update, after the steps, sleep states are refreshed, forces are
//! cleared and the contact set is aged, which is when collision events fire.

use std::collections::BTreeSet;

use crate::config::{BroadphaseConfig, PhysicsConfig};
use crate::ecs::{pair_mut, Entity, GameObject, World};
use crate::foundation::math::Vec3;
use crate::foundation::time::Stopwatch;
use crate::physics::collision::{
    object_intersection, ray_intersection, CollisionInfo, CollisionPair, Ray, RayCollision,
};
use crate::physics::collision_system::CollisionTracker;
use crate::physics::physics_object::PhysicsObject;
use crate::physics::resolution::{resolve_impulse, resolve_penalty};
use crate::physics::step_rate::{RateChange, StepRate};
use crate::spatial::{AllPairs, BroadphaseEntry, QuadTree, QuadTreeConfig, SpatialQuery};

/// Broadphase matching the configuration: the quad-tree, or every pair
fn make_broadphase(config: &BroadphaseConfig) -> Box<dyn SpatialQuery> {
    if config.enabled {
        Box::new(QuadTree::new(QuadTreeConfig::from(config)))
    } else {
        Box::new(AllPairs::new())
    }
}

/// Fixed-step rigid body simulation over a [`World`]
#[derive(Debug)]
pub struct PhysicsSystem {
    config: PhysicsConfig,
    rate: StepRate,
    accumulator: f32,
    broadphase: Box<dyn SpatialQuery>,
    candidate_pairs: BTreeSet<CollisionPair>,
    collisions: CollisionTracker,
    step_timer: Stopwatch,
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsSystem {
    /// Create a system running at the configured ideal rate
    pub fn new(config: PhysicsConfig) -> Self {
        log::debug!(
            "physics system at {} Hz (floor {} Hz), broadphase {}",
            config.ideal_hz,
            config.min_hz,
            if config.broadphase.enabled { "quad-tree" } else { "all pairs" }
        );
        Self {
            rate: StepRate::new(config.ideal_hz, config.min_hz),
            broadphase: make_broadphase(&config.broadphase),
            config,
            accumulator: 0.0,
            candidate_pairs: BTreeSet::new(),
            collisions: CollisionTracker::new(),
            step_timer: Stopwatch::new(),
        }
    }

    /// Current configuration
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Replace the configuration; the rate returns to the new ideal
    pub fn set_config(&mut self, config: PhysicsConfig) {
        self.rate = StepRate::new(config.ideal_hz, config.min_hz);
        self.broadphase = make_broadphase(&config.broadphase);
        self.config = config;
    }

    /// Set the gravity vector
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    /// Turn gravity on or off without forgetting the vector
    pub fn set_apply_gravity(&mut self, apply: bool) {
        self.config.apply_gravity = apply;
    }

    /// Turn sleeping on or off
    pub fn set_sleep_enabled(&mut self, enabled: bool) {
        self.config.sleep_enabled = enabled;
    }

    /// Switch between the quad-tree and testing every pair
    pub fn set_broadphase_enabled(&mut self, enabled: bool) {
        if self.config.broadphase.enabled != enabled {
            self.config.broadphase.enabled = enabled;
            self.broadphase = make_broadphase(&self.config.broadphase);
            log::debug!("broadphase {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    /// Steps per simulated second right now
    pub const fn simulation_hz(&self) -> u32 {
        self.rate.hz()
    }

    /// Simulated seconds per step right now
    pub fn fixed_dt(&self) -> f32 {
        self.rate.fixed_dt()
    }

    /// A body carrying the configured damping
    pub fn create_physics_object(&self, inverse_mass: f32) -> PhysicsObject {
        PhysicsObject::new(inverse_mass)
            .with_damping(self.config.linear_damping, self.config.angular_damping)
    }

    /// Live contacts in pair order
    pub fn collisions(&self) -> impl Iterator<Item = &CollisionInfo> {
        self.collisions.iter()
    }

    /// Live contact between two objects, in either order
    pub fn collision(&self, a: Entity, b: Entity) -> Option<&CollisionInfo> {
        self.collisions.get(a, b)
    }

    /// Number of live contacts
    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }

    /// Candidate pairs produced by the last step's broadphase
    pub const fn candidate_pairs(&self) -> &BTreeSet<CollisionPair> {
        &self.candidate_pairs
    }

    /// Drop all contacts and pending time without raising events
    pub fn clear(&mut self) {
        self.collisions.clear();
        self.candidate_pairs.clear();
        self.broadphase.clear();
        self.accumulator = 0.0;
        self.rate.reset();
    }

    /// Advance the world by `dt` seconds of real time
    ///
    /// Runs as many fixed steps as the accumulated time allows; any
    /// remainder carries over to the next call.
    #[allow(clippy::cast_precision_loss)]
    pub fn update(&mut self, world: &mut World, dt: f32) {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("ignoring physics update with dt = {dt}");
            return;
        }
        self.accumulator += dt;

        let fixed_dt = self.rate.fixed_dt();
        let mut steps = 0_u32;
        self.step_timer.restart();
        while self.accumulator >= fixed_dt {
            self.step(world, fixed_dt);
            self.accumulator -= fixed_dt;
            steps += 1;
        }
        self.step_timer.stop();

        if steps > 0 {
            let step_cost = self.step_timer.elapsed_secs() / steps as f32;
            log::trace!("{steps} physics steps, {:.3} ms each", step_cost * 1000.0);
            self.adapt_rate(step_cost);
        }

        if self.config.sleep_enabled {
            self.update_sleep(world);
        }
        Self::clear_forces(world);
        self.collisions.update(world);
    }

    /// Feed one step's wall-clock cost to the rate controller
    pub fn adapt_rate(&mut self, step_cost: f32) -> RateChange {
        let change = self.rate.adapt(step_cost);
        match change {
            RateChange::Lowered(hz) => {
                log::debug!("physics step took {:.2} ms, lowering rate to {hz} Hz", step_cost * 1000.0);
            }
            RateChange::Raised(hz) => log::debug!("physics rate raised to {hz} Hz"),
            RateChange::AtFloor => log::warn!(
                "physics step took {:.2} ms but the rate is already at its {} Hz floor",
                step_cost * 1000.0,
                self.rate.min_hz()
            ),
            RateChange::Steady => {}
        }
        change
    }

    /// Closest (or first found) object hit by `ray`
    ///
    /// Candidates come from a quad-tree built for this query when the
    /// broadphase is enabled, so objects outside its region are not found.
    pub fn raycast(&self, world: &World, ray: &Ray, closest_only: bool) -> Option<RayCollision> {
        let mut query = make_broadphase(&self.config.broadphase);
        for object in world.objects().iter().filter(|o| o.is_active()) {
            if let Some(entry) = BroadphaseEntry::from_object(object) {
                query.insert(entry);
            }
        }

        let mut closest: Option<RayCollision> = None;
        for entity in query.query_ray(ray) {
            let Some(hit) = world.object(entity).and_then(|o| ray_intersection(ray, o)) else {
                continue;
            };
            if !closest_only {
                return Some(hit);
            }
            if closest.map_or(true, |best| hit.distance < best.distance) {
                closest = Some(hit);
            }
        }
        closest
    }

    fn step(&mut self, world: &mut World, dt: f32) {
        self.integrate_accelerations(world, dt);
        self.broad_phase(world);
        self.narrow_phase(world, dt);

        let iterations = self.config.constraint_iterations.max(1);
        #[allow(clippy::cast_precision_loss)]
        let constraint_dt = dt / iterations as f32;
        let (objects, constraints) = world.split_constraints_mut();
        for _ in 0..iterations {
            for constraint in constraints.iter_mut() {
                constraint.update_constraint(objects, constraint_dt);
            }
        }

        self.integrate_velocities(world, dt);
    }

    fn integrate_accelerations(&self, world: &mut World, dt: f32) {
        let gravity = if self.config.apply_gravity {
            self.config.gravity
        } else {
            Vec3::zeros()
        };
        for object in world.objects_mut() {
            if !object.is_active() || object.is_asleep() {
                continue;
            }
            let (transform, Some(body)) = object.split_physics_mut() else {
                continue;
            };
            if body.is_static() {
                continue;
            }
            body.update_inertia_tensor(&transform.rotation);
            body.integrate_acceleration(gravity, dt);
        }
    }

    fn broad_phase(&mut self, world: &World) {
        self.broadphase.clear();
        self.candidate_pairs.clear();
        for object in world.objects().iter().filter(|o| o.is_active()) {
            let Some(entry) = BroadphaseEntry::from_object(object) else {
                continue;
            };
            if !self.broadphase.insert(entry) {
                log::trace!("{} is outside the broadphase region", object.entity());
            }
        }
        self.broadphase.collect_pairs(&mut self.candidate_pairs);
        log::trace!(
            "{} broadphase entries, {} candidate pairs",
            self.broadphase.entry_count(),
            self.candidate_pairs.len()
        );
    }

    fn narrow_phase(&mut self, world: &mut World, dt: f32) {
        let frames = self.config.num_collision_frames;
        let restitution_threshold = self.config.restitution_threshold;
        let sleep_epsilon = self.config.sleep_epsilon;
        let objects = world.objects_mut();

        for pair in &self.candidate_pairs {
            let Some((a, b)) = pair_mut(objects, pair.entity_a, pair.entity_b) else {
                continue;
            };
            if !a.is_active() || !b.is_active() {
                continue;
            }
            let Some(info) = object_intersection(a, b) else {
                continue;
            };

            if !a.is_trigger() && !b.is_trigger() {
                wake_on_contact(a, b, sleep_epsilon);
                wake_on_contact(b, a, sleep_epsilon);
                if a.is_spring() || b.is_spring() {
                    resolve_penalty(a, b, &info.point, dt);
                } else {
                    resolve_impulse(a, b, &info.point, restitution_threshold);
                }
            }
            self.collisions.refresh(info, frames);
        }
    }

    fn integrate_velocities(&self, world: &mut World, dt: f32) {
        for object in world.objects_mut() {
            if !object.is_active() || object.is_asleep() {
                continue;
            }
            let (transform, Some(body)) = object.split_physics_mut() else {
                continue;
            };
            body.integrate_velocity(&mut transform.position, &mut transform.rotation, dt);
        }
    }

    fn update_sleep(&self, world: &mut World) {
        let epsilon = self.config.sleep_epsilon;
        for object in world.objects_mut() {
            if !object.is_active() {
                continue;
            }
            let motion = match object.physics_mut() {
                Some(body) => {
                    body.update_weighted_average_motion();
                    body.weighted_average_motion()
                }
                None => continue,
            };

            if motion < epsilon {
                if !object.is_asleep() {
                    log::trace!("{} fell asleep", object.entity());
                }
                object.set_asleep(true);
            } else if motion > epsilon * 10.0 {
                if object.is_asleep() {
                    log::trace!("{} woke up", object.entity());
                }
                object.wake(epsilon);
            }
        }
    }

    fn clear_forces(world: &mut World) {
        for body in world.objects_mut().iter_mut().filter_map(|o| o.physics_mut()) {
            body.clear_forces();
        }
    }
}

/// A moving dynamic body touching a sleeping dynamic one wakes it
fn wake_on_contact(sleeper: &mut GameObject, other: &GameObject, sleep_epsilon: f32) {
    let is_dynamic = |object: &GameObject| object.physics().is_some_and(|body| !body.is_static());
    if sleeper.is_asleep() && is_dynamic(sleeper) && !other.is_asleep() && is_dynamic(other) {
        log::trace!("{} woken by {}", sleeper.entity(), other.entity());
        sleeper.wake(sleep_epsilon);
    }
}
