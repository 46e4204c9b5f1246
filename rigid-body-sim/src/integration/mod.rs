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
//! Numerical integration
//!
//! Bodies are advanced with semi-implicit (symplectic) Euler:
//!
//! ```text
//! v(t + dt) = v(t) + a(t)*dt
//! x(t + dt) = x(t) + v(t + dt)*dt
//! ```
//!
//! Updating velocity first and then moving with the *new* velocity keeps the
//! scheme stable under the repeated short sub-steps produced by collision
//! bisection, where explicit Euler would slowly pump energy into resting
//! contacts.
//!
//! # Timestep Guidelines
//!
//! - Frame deltas around 1/60 s work well; the world subdivides as needed
//! - Deltas above one second are accepted but logged, since a single step
//!   then spans many bounces

use crate::dynamics::RigidBody2D;
use crate::error::SimulationError;
use crate::geometry::Vec2;
use log::warn;

/// Deltas above this many seconds are logged as suspicious
pub const LARGE_TIMESTEP: f64 = 1.0;

/// Pose and velocity of a body, without its force accumulators
///
/// This is the part of a body that integration changes; the world saves it
/// before each tentative sub-step so the step can be rolled back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    /// Centre of mass position
    pub position: Vec2,
    /// Orientation in radians, counter-clockwise
    pub orientation: f64,
    /// Linear velocity of the centre of mass
    pub linear_velocity: Vec2,
    /// Angular velocity in radians per second
    pub angular_velocity: f64,
}

impl MotionState {
    /// Check if all fields are finite (not NaN or infinite)
    pub fn is_valid(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.orientation.is_finite()
            && self.linear_velocity.x.is_finite()
            && self.linear_velocity.y.is_finite()
            && self.angular_velocity.is_finite()
    }
}

/// Advance a motion state by `dt` with semi-implicit Euler
#[inline]
pub fn semi_implicit_euler(
    state: &mut MotionState,
    linear_acceleration: Vec2,
    angular_acceleration: f64,
    dt: f64,
) {
    state.linear_velocity += linear_acceleration * dt;
    state.angular_velocity += angular_acceleration * dt;
    state.position += state.linear_velocity * dt;
    state.orientation += state.angular_velocity * dt;
}

/// Reject negative and non-finite frame deltas before they reach the integrator
pub fn validate_timestep(dt: f64) -> Result<(), SimulationError> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(SimulationError::InvalidTimeStep(dt));
    }
    if dt > LARGE_TIMESTEP {
        warn!("Timestep {dt} is large; a single frame will span many sub-steps");
    }
    Ok(())
}

/// Total kinetic energy (linear and rotational) of a set of bodies
pub fn total_kinetic_energy<'a, I>(bodies: I) -> f64
where
    I: IntoIterator<Item = &'a RigidBody2D>,
{
    bodies.into_iter().map(RigidBody2D::kinetic_energy).sum()
}
