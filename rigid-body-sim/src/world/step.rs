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
//! The per-frame stepping state machine
//!
//! [`World::simulate`] splits a frame into sub-steps. Each attempt computes
//! forces, holds resting contacts against them, integrates a candidate
//! interval and classifies the result:
//!
//! - clear: the candidate is committed
//! - colliding: restitution impulses are applied, then the candidate is committed
//! - penetrating but shallow: bodies are pushed out positionally and the
//!   candidate is committed
//! - penetrating: the candidate is halved and retried, or, once halving
//!   would fall below `min_sub_step`, bodies are pushed out positionally
//!
//! The loop runs until the whole frame has been committed. Bodies at rest
//! are held in place before integration, so a resting pile costs one
//! attempt per frame rather than a bisection search.

use super::{CollisionState, World};
use crate::error::SimulationError;
use crate::integration::{validate_timestep, MotionState};
use log::{debug, error, trace, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Body count above which the force and integration passes go parallel
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 256;

/// Summary of one [`World::simulate`] call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Committed sub-steps
    pub sub_steps: usize,
    /// Candidate intervals halved after overshooting into penetration
    pub bisections: usize,
    /// Restitution impulses applied
    pub collisions_resolved: usize,
    /// Positional displacements, for shallow overlaps or at the bisection floor
    pub positional_corrections: usize,
    /// Resting contacts held against the applied forces, summed over sub-steps
    pub resting_contacts: usize,
    /// Sum of committed sub-step lengths in seconds
    pub time_advanced: f64,
}

impl World {
    /// Advance the simulation by `dt` seconds
    ///
    /// On success no movable body penetrates a wall or another body by more
    /// than [`WorldConfig::penetration_tolerance`](super::WorldConfig). On
    /// failure every body is put back to its state at the start of the call.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidTimeStep`] if `dt` is negative or not finite
    /// - [`SimulationError::UnresolvedPenetration`] if positional correction
    ///   cannot separate a body
    /// - [`SimulationError::NonFiniteState`] if a body state becomes NaN or infinite
    /// - [`SimulationError::IterationLimit`] if the frame needs more than
    ///   `max_sub_step_attempts` attempts
    pub fn simulate(&mut self, dt: f64) -> Result<StepReport, SimulationError> {
        validate_timestep(dt)?;
        if dt == 0.0 {
            return Ok(StepReport::default());
        }

        let mut initial = Vec::with_capacity(self.bodies.len());
        self.save_states(&mut initial);

        match self.advance(dt) {
            Ok(report) => {
                debug!(
                    "Advanced {:.4}s in {} sub-steps ({} bisections, {} impulses, {} corrections, {} resting)",
                    report.time_advanced,
                    report.sub_steps,
                    report.bisections,
                    report.collisions_resolved,
                    report.positional_corrections,
                    report.resting_contacts
                );
                Ok(report)
            }
            Err(err) => {
                self.restore_states(&initial);
                error!("Simulation step of {dt}s failed, state restored: {err}");
                Err(err)
            }
        }
    }

    fn advance(&mut self, dt: f64) -> Result<StepReport, SimulationError> {
        let mut report = StepReport::default();
        let mut saved = Vec::with_capacity(self.bodies.len());
        let mut remaining = dt;
        let mut candidate = dt;
        let mut attempts = 0;

        while remaining > 0.0 {
            if attempts >= self.config.max_sub_step_attempts {
                return Err(SimulationError::IterationLimit {
                    attempts,
                    remaining,
                });
            }
            attempts += 1;

            self.save_states(&mut saved);
            self.compute_forces();
            let held = self.hold_resting_contacts(candidate);
            self.integrate(candidate);

            match self.check_for_collisions() {
                CollisionState::Clear => {
                    trace!("Sub-step {candidate:.3e}s clear");
                }
                CollisionState::Colliding => {
                    let resolved = self.resolve_collisions(candidate);
                    trace!("Sub-step {candidate:.3e}s colliding, {resolved} impulses");
                    report.collisions_resolved += resolved;
                }
                CollisionState::Penetrating if candidate / 2.0 >= self.config.min_sub_step => {
                    match self.correct_shallow_overlap() {
                        Some(moved) => {
                            trace!("Sub-step {candidate:.3e}s overlapping slightly, {moved} corrections");
                            report.positional_corrections += moved;
                            report.collisions_resolved += self.resolve_collisions(candidate);
                        }
                        None => {
                            trace!("Sub-step {candidate:.3e}s penetrating, halving");
                            self.restore_states(&saved);
                            candidate /= 2.0;
                            report.bisections += 1;
                            continue;
                        }
                    }
                }
                CollisionState::Penetrating => {
                    warn!(
                        "Sub-step {:.3e}s still penetrating at the bisection floor; correcting positions",
                        candidate
                    );
                    report.positional_corrections += self.correct_penetrations()?;
                    report.collisions_resolved += self.resolve_collisions(candidate);
                }
            }

            self.check_finite()?;
            remaining -= candidate;
            report.time_advanced += candidate;
            report.sub_steps += 1;
            report.resting_contacts += held;
            candidate = remaining;
        }

        Ok(report)
    }

    /// Push bodies out of an overlap no deeper than the shallow limit
    ///
    /// Returns `None`, possibly after moving bodies, when the overlap is
    /// too deep or correction cannot separate it; the caller then restores
    /// the sub-step and bisects.
    fn correct_shallow_overlap(&mut self) -> Option<usize> {
        if self.max_penetration() > self.config.shallow_overlap() {
            return None;
        }
        match self.correct_penetrations() {
            Ok(moved) => Some(moved),
            Err(err) => {
                trace!("Shallow correction failed, bisecting instead: {err}");
                None
            }
        }
    }

    /// Rebuild every body's force and torque accumulators
    pub(crate) fn compute_forces(&mut self) {
        #[cfg(feature = "parallel")]
        if self.bodies.len() >= PARALLEL_THRESHOLD {
            self.compute_forces_parallel();
            return;
        }

        self.compute_forces_sequential();
    }

    fn compute_forces_sequential(&mut self) {
        let forces = &self.forces;
        for (index, body) in self.bodies.iter_mut().enumerate() {
            forces.accumulate(index, body);
        }
    }

    #[cfg(feature = "parallel")]
    fn compute_forces_parallel(&mut self) {
        let forces = &self.forces;
        self.bodies
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, body)| forces.accumulate(index, body));
    }

    /// Integrate every body by `dt` with the current accumulators
    pub(crate) fn integrate(&mut self, dt: f64) {
        #[cfg(feature = "parallel")]
        if self.bodies.len() >= PARALLEL_THRESHOLD {
            self.bodies.par_iter_mut().for_each(|body| body.integrate(dt));
            return;
        }

        for body in &mut self.bodies {
            body.integrate(dt);
        }
    }

    fn save_states(&self, states: &mut Vec<MotionState>) {
        states.clear();
        states.extend(self.bodies.iter().map(|body| body.motion_state()));
    }

    fn restore_states(&mut self, states: &[MotionState]) {
        for (body, state) in self.bodies.iter_mut().zip(states) {
            body.restore(*state);
        }
    }

    fn check_finite(&self) -> Result<(), SimulationError> {
        match self.bodies.iter().position(|body| !body.is_valid()) {
            Some(body) => Err(SimulationError::NonFiniteState { body }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::RigidBody2D;
    use crate::geometry::{Vec2, Wall};
    use crate::world::WorldConfig;
    use approx::assert_abs_diff_eq;

    fn falling_ball(height: f64) -> RigidBody2D {
        RigidBody2D::circle(1.0, 0.5)
            .unwrap()
            .with_position(Vec2::new(0.0, height))
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut world = World::new(vec![Wall::floor(0.0)], vec![falling_ball(5.0)]).unwrap();
        let report = world.simulate(0.0).unwrap();
        assert_eq!(report, StepReport::default());
        assert_eq!(world.bodies()[0].position(), Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_invalid_dt_leaves_state_untouched() {
        let mut world = World::new(vec![Wall::floor(0.0)], vec![falling_ball(5.0)]).unwrap();
        for dt in [-0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                world.simulate(dt),
                Err(SimulationError::InvalidTimeStep(_))
            ));
        }
        assert_eq!(world.bodies()[0].position(), Vec2::new(0.0, 5.0));
    }

    #[test]
    fn test_free_fall_is_a_single_sub_step() {
        let mut world = World::new(vec![Wall::floor(0.0)], vec![falling_ball(5.0)]).unwrap();
        let dt = 1.0 / 60.0;
        let report = world.simulate(dt).unwrap();

        assert_eq!(report.sub_steps, 1);
        assert_eq!(report.bisections, 0);
        assert_eq!(report.time_advanced, dt);
        let body = &world.bodies()[0];
        assert_abs_diff_eq!(body.linear_velocity().y, -9.8 * dt, epsilon = 1e-12);
        assert_abs_diff_eq!(body.position().y, 5.0 - 9.8 * dt * dt, epsilon = 1e-12);
    }

    #[test]
    fn test_impact_bisects_and_bounces() {
        let ball = falling_ball(0.6).with_velocity(Vec2::new(0.0, -10.0));
        let mut world = World::new(vec![Wall::floor(0.0)], vec![ball]).unwrap();
        let dt = 1.0 / 60.0;
        let report = world.simulate(dt).unwrap();

        assert!(report.bisections > 0);
        assert!(report.collisions_resolved >= 1);
        assert_abs_diff_eq!(report.time_advanced, dt, epsilon = 1e-12);
        assert!(world.bodies()[0].linear_velocity().y > 0.0);
        assert!(world.max_penetration() <= world.config().penetration_tolerance);
    }

    #[test]
    fn test_resting_body_needs_one_attempt_per_frame() {
        let mut world = World::new(vec![Wall::floor(0.0)], vec![falling_ball(0.5)]).unwrap();
        for dt in [1.0 / 60.0, 0.25, 1.0] {
            let report = world.simulate(dt).unwrap();
            assert_eq!(report.sub_steps, 1);
            assert_eq!(report.bisections, 0);
            assert_eq!(report.resting_contacts, 1);
        }
        let body = &world.bodies()[0];
        assert_abs_diff_eq!(body.position().y, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(body.linear_velocity().y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shallow_overlap_is_corrected_without_bisection() {
        let config = WorldConfig::default().with_gravity(Vec2::zeros());
        let ball = falling_ball(0.4992).with_velocity(Vec2::new(0.0, -0.03));
        let mut world = World::with_config(vec![Wall::floor(0.0)], vec![ball], config).unwrap();
        let report = world.simulate(1.0 / 60.0).unwrap();

        assert_eq!(report.bisections, 0);
        assert_eq!(report.sub_steps, 1);
        assert_eq!(report.positional_corrections, 1);
        assert_eq!(report.collisions_resolved, 1);
        let body = &world.bodies()[0];
        assert_abs_diff_eq!(body.linear_velocity().y, 0.015, epsilon = 1e-12);
        assert!(world.max_penetration() <= world.config().penetration_tolerance);
    }

    #[test]
    fn test_initial_overlap_is_corrected() {
        let config = WorldConfig::default().with_gravity(Vec2::zeros());
        let mut world =
            World::with_config(vec![Wall::floor(0.0)], vec![falling_ball(0.4)], config).unwrap();
        let report = world.simulate(1.0 / 60.0).unwrap();

        assert!(report.positional_corrections >= 1);
        assert!(world.max_penetration() <= world.config().penetration_tolerance);
    }

    #[test]
    fn test_iteration_limit_restores_state() {
        let config = WorldConfig::default().with_max_sub_step_attempts(2);
        let ball = falling_ball(0.6).with_velocity(Vec2::new(0.0, -10.0));
        let mut world = World::with_config(vec![Wall::floor(0.0)], vec![ball], config).unwrap();

        let result = world.simulate(1.0 / 60.0);
        assert!(matches!(
            result,
            Err(SimulationError::IterationLimit { attempts: 2, .. })
        ));
        assert_eq!(world.bodies()[0].position(), Vec2::new(0.0, 0.6));
        assert_eq!(world.bodies()[0].linear_velocity(), Vec2::new(0.0, -10.0));
    }

    #[test]
    fn test_non_finite_state_is_fatal() {
        let mut world = World::new(vec![], vec![falling_ball(5.0)]).unwrap();
        let result = world.simulate(1e300);
        assert!(matches!(
            result,
            Err(SimulationError::NonFiniteState { body: 0 })
        ));
        assert_eq!(world.bodies()[0].position(), Vec2::new(0.0, 5.0));
        assert_eq!(world.bodies()[0].linear_velocity(), Vec2::zeros());
    }

    #[test]
    fn test_bodies_in_parallel_path_match_sequential_result() {
        let bodies: Vec<_> = (0..300)
            .map(|i| falling_ball(2.0 + i as f64))
            .collect();
        let mut world = World::new(vec![Wall::floor(0.0)], bodies.clone()).unwrap();
        world.simulate(1.0 / 60.0).unwrap();

        let mut single = World::new(vec![Wall::floor(0.0)], vec![bodies[0].clone()]).unwrap();
        single.simulate(1.0 / 60.0).unwrap();
        assert_eq!(world.bodies()[0].motion_state(), single.bodies()[0].motion_state());
    }
}
