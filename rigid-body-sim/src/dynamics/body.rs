// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Rigid body state and per-body dynamics

use crate::dynamics::{Inertia, Mass};
use crate::error::ConfigError;
use crate::geometry::{cross, cross_scalar, is_finite, Shape, Vec2, WorldShape};
use crate::integration::{semi_implicit_euler, MotionState};

/// Restitution given to bodies that do not set one explicitly
pub const DEFAULT_RESTITUTION: f64 = 0.5;

/// A rigid body moving in the plane
///
/// Bodies carry their pose, velocities, mass properties, a restitution
/// coefficient, a collision shape, and the force/torque accumulators for the
/// current sub-step. Mass and inertia are stored as inverses too; a body with
/// zero inverse mass is immovable and is never pushed by forces, impulses or
/// positional correction.
///
/// # Examples
///
/// ```
/// use rigid_body_sim::dynamics::RigidBody2D;
/// use rigid_body_sim::geometry::Vec2;
///
/// let mut ball = RigidBody2D::circle(1.0, 0.5)
///     .unwrap()
///     .with_position(Vec2::new(0.0, 10.0))
///     .with_restitution(0.5);
///
/// ball.apply_force(Vec2::new(0.0, -9.8));
/// ball.integrate(0.1);
/// assert!(ball.linear_velocity().y < 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody2D {
    shape: Shape,
    mass: Mass,
    inertia: Inertia,
    restitution: f64,
    state: MotionState,
    force: Vec2,
    torque: f64,
}

impl RigidBody2D {
    /// Create a body with explicit mass properties
    ///
    /// Most callers want [`circle`](Self::circle), [`rectangle`](Self::rectangle)
    /// or [`polygon`](Self::polygon), which derive the inertia from the shape.
    pub fn new(shape: Shape, mass: Mass, inertia: Inertia) -> Result<Self, ConfigError> {
        shape.validate()?;
        Ok(RigidBody2D {
            shape,
            mass,
            inertia,
            restitution: DEFAULT_RESTITUTION,
            state: MotionState {
                position: Vec2::zeros(),
                orientation: 0.0,
                linear_velocity: Vec2::zeros(),
                angular_velocity: 0.0,
            },
            force: Vec2::zeros(),
            torque: 0.0,
        })
    }

    /// Create a body whose inertia follows from its shape and mass
    ///
    /// A mass of zero produces an immovable body.
    pub fn with_shape(shape: Shape, mass: f64) -> Result<Self, ConfigError> {
        let mass = Mass::new(mass)?;
        let inertia = if mass.is_immovable() {
            Inertia::immovable()
        } else {
            Inertia::new(mass.value() * shape.unit_inertia())?
        };
        RigidBody2D::new(shape, mass, inertia)
    }

    /// Solid disc of the given mass and radius
    pub fn circle(mass: f64, radius: f64) -> Result<Self, ConfigError> {
        RigidBody2D::with_shape(Shape::circle(radius)?, mass)
    }

    /// Solid rectangle of the given mass and extents
    pub fn rectangle(mass: f64, width: f64, height: f64) -> Result<Self, ConfigError> {
        RigidBody2D::with_shape(Shape::rectangle(width, height)?, mass)
    }

    /// Solid polygon of the given mass; see [`Shape::polygon`]
    pub fn polygon(mass: f64, vertices: Vec<Vec2>) -> Result<Self, ConfigError> {
        RigidBody2D::with_shape(Shape::polygon(vertices)?, mass)
    }

    /// Immovable body with the given shape
    pub fn fixed(shape: Shape) -> Result<Self, ConfigError> {
        RigidBody2D::new(shape, Mass::immovable(), Inertia::immovable())
    }

    /// Set the initial position of the centre of mass
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.state.position = position;
        self
    }

    /// Set the initial orientation in radians
    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.state.orientation = orientation;
        self
    }

    /// Set the initial linear velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.state.linear_velocity = velocity;
        self
    }

    /// Set the initial angular velocity in radians per second
    pub fn with_angular_velocity(mut self, angular_velocity: f64) -> Self {
        self.state.angular_velocity = angular_velocity;
        self
    }

    /// Set the restitution coefficient, expected in `[0, 1]`
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    /// Check the configuration of a body before it enters a world
    ///
    /// `index` only labels the error.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        self.shape.validate()?;
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::InvalidRestitution(self.restitution));
        }
        let checks: [(&'static str, bool); 4] = [
            ("position", is_finite(&self.state.position)),
            ("orientation", self.state.orientation.is_finite()),
            ("velocity", is_finite(&self.state.linear_velocity)),
            ("angular velocity", self.state.angular_velocity.is_finite()),
        ];
        match checks.into_iter().find(|&(_, ok)| !ok) {
            Some((field, _)) => Err(ConfigError::NonFiniteBody { body: index, field }),
            None => Ok(()),
        }
    }

    /// Collision shape in body coordinates
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Mass component
    pub fn mass(&self) -> Mass {
        self.mass
    }

    /// Moment of inertia component
    pub fn inertia(&self) -> Inertia {
        self.inertia
    }

    /// Restitution coefficient
    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    /// Check if this body ignores forces and impulses
    pub fn is_immovable(&self) -> bool {
        self.mass.is_immovable()
    }

    /// Centre of mass position
    pub fn position(&self) -> Vec2 {
        self.state.position
    }

    /// Orientation in radians
    pub fn orientation(&self) -> f64 {
        self.state.orientation
    }

    /// Linear velocity of the centre of mass
    pub fn linear_velocity(&self) -> Vec2 {
        self.state.linear_velocity
    }

    /// Angular velocity in radians per second
    pub fn angular_velocity(&self) -> f64 {
        self.state.angular_velocity
    }

    /// Force accumulated for the current sub-step
    pub fn accumulated_force(&self) -> Vec2 {
        self.force
    }

    /// Torque accumulated for the current sub-step
    pub fn accumulated_torque(&self) -> f64 {
        self.torque
    }

    /// Pose and velocities as one value
    pub fn motion_state(&self) -> MotionState {
        self.state
    }

    pub(crate) fn restore(&mut self, state: MotionState) {
        self.state = state;
    }

    /// Add a force through the centre of mass
    ///
    /// Only the accumulator changes; velocities are updated by
    /// [`integrate`](Self::integrate).
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Add a force applied at a world-space point, producing torque `r × F`
    pub fn apply_force_at_point(&mut self, force: Vec2, point: Vec2) {
        self.force += force;
        self.torque += cross(&(point - self.state.position), &force);
    }

    /// Add a pure torque
    pub fn apply_torque(&mut self, torque: f64) {
        self.torque += torque;
    }

    /// Reset the force and torque accumulators
    pub fn clear_accumulators(&mut self) {
        self.force = Vec2::zeros();
        self.torque = 0.0;
    }

    /// Advance the body by `dt` using the accumulated force and torque
    ///
    /// Velocity is updated first, then the pose with the new velocity. The
    /// accumulators are cleared afterwards. Immovable bodies keep their
    /// velocity and simply drift along it.
    pub fn integrate(&mut self, dt: f64) {
        let linear = self.force * self.mass.inverse();
        let angular = self.torque * self.inertia.inverse();
        semi_implicit_euler(&mut self.state, linear, angular, dt);
        self.clear_accumulators();
    }

    /// Velocity of the material point currently at `point`
    pub fn velocity_at(&self, point: &Vec2) -> Vec2 {
        let r = point - self.state.position;
        self.state.linear_velocity + cross_scalar(self.state.angular_velocity, &r)
    }

    /// Velocity change at `point` that integrating the current accumulators
    /// over `dt` would produce
    pub fn velocity_change_at(&self, point: &Vec2, dt: f64) -> Vec2 {
        let r = point - self.state.position;
        let angular = self.torque * self.inertia.inverse() * dt;
        self.force * self.mass.inverse() * dt + cross_scalar(angular, &r)
    }

    /// Apply an instantaneous impulse at a world-space point
    pub fn apply_impulse(&mut self, impulse: Vec2, point: &Vec2) {
        let r = point - self.state.position;
        self.state.linear_velocity += impulse * self.mass.inverse();
        self.state.angular_velocity += cross(&r, &impulse) * self.inertia.inverse();
    }

    /// Effective inverse mass seen by an impulse along `normal` at `point`
    pub fn inverse_mass_along(&self, normal: &Vec2, point: &Vec2) -> f64 {
        let rn = cross(&(point - self.state.position), normal);
        self.mass.inverse() + rn * rn * self.inertia.inverse()
    }

    /// Move the body without touching its velocity; no-op when immovable
    pub fn translate(&mut self, offset: Vec2) {
        if !self.is_immovable() {
            self.state.position += offset;
        }
    }

    /// Shape transformed to the current pose
    pub fn world_shape(&self) -> WorldShape {
        self.shape.to_world(&self.state.position, self.state.orientation)
    }

    /// Linear plus rotational kinetic energy; zero for immovable bodies
    pub fn kinetic_energy(&self) -> f64 {
        if self.is_immovable() {
            return 0.0;
        }
        let v = self.state.linear_velocity;
        let w = self.state.angular_velocity;
        0.5 * self.mass.value() * v.norm_squared() + 0.5 * self.inertia.value() * w * w
    }

    /// Check if every state and accumulator field is finite
    pub fn is_valid(&self) -> bool {
        self.state.is_valid() && is_finite(&self.force) && self.torque.is_finite()
    }
}
