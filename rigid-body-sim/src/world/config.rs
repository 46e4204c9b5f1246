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
//! World configuration

use crate::error::ConfigError;
use crate::geometry::{is_finite, Vec2};

/// Tunable parameters of the stepping loop
///
/// The defaults suit metre-scale bodies stepped at display frame rates.
///
/// # Examples
///
/// ```
/// use rigid_body_sim::world::WorldConfig;
/// use rigid_body_sim::geometry::Vec2;
///
/// let config = WorldConfig::default()
///     .with_gravity(Vec2::new(0.0, -1.62))
///     .with_penetration_tolerance(5e-4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Uniform gravitational acceleration in m/s²
    pub gravity: Vec2,
    /// Overlap allowed before a configuration counts as penetrating, in metres
    pub penetration_tolerance: f64,
    /// Bisection floor in seconds; below it penetration is corrected positionally
    pub min_sub_step: f64,
    /// Floor, in m/s, for the closing speed treated as resting contact
    ///
    /// A contact closing no faster than gravity can push it over one
    /// sub-step gets no bounce; this raises that cutoff to a fixed speed.
    pub resting_speed_threshold: f64,
    /// Normal velocities must be below `-approach_epsilon` to count as closing
    pub approach_epsilon: f64,
    /// Fraction of the tolerance left as gap after positional correction
    pub correction_slop: f64,
    /// Positional correction passes before giving up
    pub max_correction_passes: usize,
    /// Overlaps up to this multiple of the tolerance are pushed out in place
    /// instead of bisected; `1.0` always bisects
    pub shallow_overlap_ratio: f64,
    /// Sequential impulse passes over the contact set
    pub solver_iterations: usize,
    /// Sub-step attempts allowed per `simulate` call
    pub max_sub_step_attempts: usize,
    /// Upper bound on the total force applied to one body, in Newtons
    pub max_force_magnitude: f64,
    /// Whether circle bodies collide with each other
    pub body_collisions: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            gravity: Vec2::new(0.0, -9.8),
            penetration_tolerance: 1e-3,
            min_sub_step: 1e-6,
            resting_speed_threshold: 0.0,
            approach_epsilon: 1e-9,
            correction_slop: 0.5,
            max_correction_passes: 32,
            shallow_overlap_ratio: 1.5,
            solver_iterations: 8,
            max_sub_step_attempts: 10_000,
            max_force_magnitude: 1e10,
            body_collisions: true,
        }
    }
}

impl WorldConfig {
    /// Set the gravitational acceleration
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the penetration tolerance
    pub fn with_penetration_tolerance(mut self, tolerance: f64) -> Self {
        self.penetration_tolerance = tolerance;
        self
    }

    /// Set the bisection floor
    pub fn with_min_sub_step(mut self, min_sub_step: f64) -> Self {
        self.min_sub_step = min_sub_step;
        self
    }

    /// Set the closing speed below which contacts do not bounce
    pub fn with_resting_speed_threshold(mut self, threshold: f64) -> Self {
        self.resting_speed_threshold = threshold;
        self
    }

    /// Set the multiple of the tolerance corrected without bisecting
    pub fn with_shallow_overlap_ratio(mut self, ratio: f64) -> Self {
        self.shallow_overlap_ratio = ratio;
        self
    }

    /// Set the number of impulse solver passes
    pub fn with_solver_iterations(mut self, iterations: usize) -> Self {
        self.solver_iterations = iterations;
        self
    }

    /// Set the upper bound on the total force per body
    pub fn with_max_force_magnitude(mut self, magnitude: f64) -> Self {
        self.max_force_magnitude = magnitude;
        self
    }

    /// Depth below which an overlap is corrected without bisecting
    pub fn shallow_overlap(&self) -> f64 {
        self.shallow_overlap_ratio * self.penetration_tolerance
    }

    /// Enable or disable body–body contacts
    pub fn with_body_collisions(mut self, enabled: bool) -> Self {
        self.body_collisions = enabled;
        self
    }

    /// Set the sub-step attempt budget per `simulate` call
    pub fn with_max_sub_step_attempts(mut self, attempts: usize) -> Self {
        self.max_sub_step_attempts = attempts;
        self
    }

    /// Check every setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(name: &'static str, reason: &str) -> ConfigError {
            ConfigError::InvalidSetting {
                name,
                reason: reason.to_string(),
            }
        }
        let positive = |v: f64| v > 0.0 && v.is_finite();

        if !is_finite(&self.gravity) {
            return Err(invalid("gravity", "must be finite"));
        }
        if !positive(self.penetration_tolerance) {
            return Err(invalid("penetration_tolerance", "must be positive and finite"));
        }
        if !positive(self.min_sub_step) {
            return Err(invalid("min_sub_step", "must be positive and finite"));
        }
        if !(self.resting_speed_threshold >= 0.0 && self.resting_speed_threshold.is_finite()) {
            return Err(invalid("resting_speed_threshold", "must be non-negative and finite"));
        }
        if !(self.approach_epsilon >= 0.0 && self.approach_epsilon.is_finite()) {
            return Err(invalid("approach_epsilon", "must be non-negative and finite"));
        }
        if !(0.0..1.0).contains(&self.correction_slop) {
            return Err(invalid("correction_slop", "must lie in [0, 1)"));
        }
        if self.max_correction_passes == 0 {
            return Err(invalid("max_correction_passes", "must be at least 1"));
        }
        if !(self.shallow_overlap_ratio >= 1.0 && self.shallow_overlap_ratio.is_finite()) {
            return Err(invalid("shallow_overlap_ratio", "must be finite and at least 1"));
        }
        if self.solver_iterations == 0 {
            return Err(invalid("solver_iterations", "must be at least 1"));
        }
        if self.max_sub_step_attempts == 0 {
            return Err(invalid("max_sub_step_attempts", "must be at least 1"));
        }
        if !positive(self.max_force_magnitude) {
            return Err(invalid("max_force_magnitude", "must be positive and finite"));
        }
        Ok(())
    }
}
